//! Distribution value types.
//!
//! A distribution-valued field stores one distribution per grid vertex.
//! Distributions are immutable `Copy` values; drawing from them goes through
//! the [`Sample`] trait with a caller-supplied generator so that sampling is
//! reproducible from a seed.

use std::f64::consts::PI;
use std::fmt;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DistributionError;

/// Draw a value from a distribution.
pub trait Sample {
    /// Type of a single draw.
    type Output;

    /// Draw one value, advancing `rng`.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Output;
}

/// Draw from the standard normal distribution (Box-Muller).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen();
    let u2: f64 = rng.gen();
    // Avoid log(0)
    let u1 = if u1 == 0.0 { f64::MIN_POSITIVE } else { u1 };
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Univariate normal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gaussian {
    mean: f32,
    std: f32,
}

impl Gaussian {
    /// Create a Gaussian with finite parameters and a non-negative deviation.
    ///
    /// # Errors
    /// [`DistributionError::NonFinite`] if either parameter is infinite or NaN,
    /// [`DistributionError::NegativeStd`] if `std` is negative.
    pub fn try_new(mean: f32, std: f32) -> Result<Self, DistributionError> {
        if !mean.is_finite() || !std.is_finite() {
            return Err(DistributionError::NonFinite { mean, std });
        }
        if std < 0.0 {
            return Err(DistributionError::NegativeStd(std));
        }
        Ok(Self { mean, std })
    }

    /// Unvalidated constructor for arithmetic on already valid values.
    #[must_use]
    pub(crate) fn from_raw_parts(mean: f32, std: f32) -> Self {
        Self { mean, std }
    }

    /// Create a Gaussian.
    ///
    /// # Panics
    /// Panics if a parameter is non-finite or `std` is negative.
    #[must_use]
    pub fn new(mean: f32, std: f32) -> Self {
        match Self::try_new(mean, std) {
            Ok(g) => g,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a Gaussian from its mean and variance.
    ///
    /// # Errors
    /// As [`Gaussian::try_new`], with `variance` checked in place of `std`.
    pub fn from_mean_variance(mean: f32, variance: f32) -> Result<Self, DistributionError> {
        if variance < 0.0 {
            return Err(DistributionError::NegativeStd(variance));
        }
        Self::try_new(mean, variance.sqrt())
    }

    /// Mean.
    #[must_use]
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Standard deviation.
    #[must_use]
    pub fn std(&self) -> f32 {
        self.std
    }

    /// Variance (σ²).
    #[must_use]
    pub fn variance(&self) -> f32 {
        self.std * self.std
    }

    /// Probability density at `x`.
    ///
    /// A zero-width Gaussian is a point mass: infinite density at the mean,
    /// zero elsewhere.
    #[must_use]
    pub fn pdf(&self, x: f32) -> f32 {
        if self.std == 0.0 {
            return if x == self.mean { f32::INFINITY } else { 0.0 };
        }
        let z = f64::from((x - self.mean) / self.std);
        let norm = f64::from(self.std) * (2.0 * PI).sqrt();
        #[allow(clippy::cast_possible_truncation)]
        let density = ((-0.5 * z * z).exp() / norm) as f32;
        density
    }
}

impl Sample for Gaussian {
    type Output = f32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let z = standard_normal(rng);
        #[allow(clippy::cast_possible_truncation)]
        let value = (f64::from(self.mean) + z * f64::from(self.std)) as f32;
        value
    }
}

impl fmt::Display for Gaussian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.mean, self.std)
    }
}

/// Three independent Gaussians, one per vector component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GaussianVec3 {
    /// Per-axis distributions (x, y, z)
    pub components: [Gaussian; 3],
}

impl GaussianVec3 {
    /// Create from per-axis distributions.
    #[must_use]
    pub fn new(x: Gaussian, y: Gaussian, z: Gaussian) -> Self {
        Self {
            components: [x, y, z],
        }
    }

    /// Create from per-axis means and standard deviations.
    ///
    /// # Errors
    /// Returns [`DistributionError::NegativeStd`] if any component of `std` is negative.
    pub fn try_from_moments(mean: Vec3, std: Vec3) -> Result<Self, DistributionError> {
        Ok(Self::new(
            Gaussian::try_new(mean.x, std.x)?,
            Gaussian::try_new(mean.y, std.y)?,
            Gaussian::try_new(mean.z, std.z)?,
        ))
    }

    /// Per-axis means.
    #[must_use]
    pub fn mean(&self) -> Vec3 {
        Vec3::from_array(self.components.map(|g| g.mean()))
    }

    /// Per-axis standard deviations.
    #[must_use]
    pub fn std(&self) -> Vec3 {
        Vec3::from_array(self.components.map(|g| g.std()))
    }
}

impl Sample for GaussianVec3 {
    type Output = Vec3;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        Vec3::new(
            self.components[0].sample(rng),
            self.components[1].sample(rng),
            self.components[2].sample(rng),
        )
    }
}

impl fmt::Display for GaussianVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = &self.components;
        write!(f, "({x}, {y}, {z})")
    }
}
