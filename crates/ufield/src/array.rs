//! Data arrays and access policies.
//!
//! A [`DataArray`] is a flat, row-major sequence of stored values plus an
//! [`AccessPolicy`] that converts a stored value into the value handed to the
//! interpolator. The policy is a plain value chosen at construction:
//!
//! - [`AsIs`] exposes the stored value unchanged (distributions stay
//!   distributions, so they are interpolated before sampling).
//! - [`Sampled`] draws from the stored distribution on every access (samples
//!   are interpolated).
//!
//! Storage is an `Arc<[S]>`, so arrays with different policies can read the
//! same values without copying them.

use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::distribution::Sample;
use crate::error::GridError;

/// Read-only indexed access to the values of a field.
pub trait AbstractDataArray<T>: Send + Sync {
    /// Number of values.
    fn len(&self) -> usize;

    /// Whether the array is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, converted by the array's access policy.
    ///
    /// # Errors
    /// [`GridError::IndexOutOfRange`] if `index >= len()`.
    fn get_item(&self, index: usize) -> Result<T, GridError>;
}

/// Conversion applied to a stored value on access.
pub trait AccessPolicy<S>: Send + Sync {
    /// Value handed out for a stored `S`.
    type Output;

    /// Convert one stored value.
    fn apply(&self, stored: &S) -> Self::Output;
}

/// Hand out stored values unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsIs;

impl<S: Clone> AccessPolicy<S> for AsIs {
    type Output = S;

    fn apply(&self, stored: &S) -> S {
        stored.clone()
    }
}

/// Hand out one draw from each stored distribution.
///
/// The generator sits behind a mutex so concurrent readers share one
/// reproducible stream; the order of draws across threads is unspecified.
#[derive(Debug)]
pub struct Sampled {
    rng: Mutex<ChaCha8Rng>,
    seed: Option<u64>,
}

impl Sampled {
    /// Sampling with a deterministic seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            seed: Some(seed),
        }
    }

    /// Sampling seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
            seed: None,
        }
    }

    /// Seed this policy was created with, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self.rng.get_mut().unwrap_or_else(PoisonError::into_inner) =
            ChaCha8Rng::seed_from_u64(seed);
        self.seed = Some(seed);
    }
}

impl<S: Sample> AccessPolicy<S> for Sampled {
    type Output = S::Output;

    fn apply(&self, stored: &S) -> S::Output {
        // A panic while sampling leaves the generator intact
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        stored.sample(&mut *rng)
    }
}

/// Flat value storage with an access policy.
#[derive(Debug)]
pub struct DataArray<S, P> {
    storage: Arc<[S]>,
    policy: P,
}

/// Array exposing stored values unchanged.
pub type GeneralDataArray<S> = DataArray<S, AsIs>;

/// Array exposing draws from stored distributions.
pub type SampledDataArray<S> = DataArray<S, Sampled>;

impl<S, P> DataArray<S, P> {
    /// Wrap shared `storage` with `policy`.
    pub fn new(storage: Arc<[S]>, policy: P) -> Self {
        Self { storage, policy }
    }

    /// Take ownership of `values` and wrap them with `policy`.
    pub fn from_vec(values: Vec<S>, policy: P) -> Self {
        Self::new(values.into(), policy)
    }

    /// Shared backing storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<[S]> {
        &self.storage
    }

    /// The access policy.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// A new array over the same storage with another policy.
    #[must_use]
    pub fn with_policy<Q>(&self, policy: Q) -> DataArray<S, Q> {
        DataArray {
            storage: Arc::clone(&self.storage),
            policy,
        }
    }
}

impl<S, P> AbstractDataArray<P::Output> for DataArray<S, P>
where
    S: Send + Sync,
    P: AccessPolicy<S>,
{
    fn len(&self) -> usize {
        self.storage.len()
    }

    fn get_item(&self, index: usize) -> Result<P::Output, GridError> {
        self.storage
            .get(index)
            .map(|stored| self.policy.apply(stored))
            .ok_or_else(|| GridError::out_of_range(index, self.storage.len()))
    }
}
