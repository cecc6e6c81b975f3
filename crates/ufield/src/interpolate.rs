//! Weighted combination of cell vertex values.
//!
//! [`interpolate`] works for any [`Interpolant`]: plain numbers, vectors and
//! distributions. For [`Gaussian`] the two operations follow the combination
//! law for independent normals, so interpolating eight vertex distributions
//! with weights `w_i` yields mean `Σ w_i·m_i` and variance `Σ w_i²·s_i²`.

use glam::Vec3;

use crate::distribution::{Gaussian, GaussianVec3};

/// Arithmetic needed to interpolate values of a type.
pub trait Interpolant: Sized {
    /// Additive identity.
    fn zero() -> Self;

    /// Multiply by a real weight.
    #[must_use]
    fn scaled(&self, weight: f32) -> Self;

    /// Sum two partial results.
    #[must_use]
    fn accumulate(self, other: Self) -> Self;
}

impl Interpolant for f32 {
    fn zero() -> Self {
        0.0
    }

    fn scaled(&self, weight: f32) -> Self {
        self * weight
    }

    fn accumulate(self, other: Self) -> Self {
        self + other
    }
}

impl Interpolant for f64 {
    fn zero() -> Self {
        0.0
    }

    fn scaled(&self, weight: f32) -> Self {
        self * f64::from(weight)
    }

    fn accumulate(self, other: Self) -> Self {
        self + other
    }
}

impl Interpolant for Vec3 {
    fn zero() -> Self {
        Vec3::ZERO
    }

    fn scaled(&self, weight: f32) -> Self {
        *self * weight
    }

    fn accumulate(self, other: Self) -> Self {
        self + other
    }
}

impl Interpolant for Gaussian {
    fn zero() -> Self {
        Gaussian::default()
    }

    // w·X for X ~ N(m, s²) is N(w·m, w²·s²); a zero weight drops the term
    // even when s overflowed to infinity
    fn scaled(&self, weight: f32) -> Self {
        if weight == 0.0 {
            return Gaussian::zero();
        }
        Gaussian::from_raw_parts(self.mean() * weight, self.std() * weight.abs())
    }

    // X + Y for independent normals: means and variances add
    fn accumulate(self, other: Self) -> Self {
        let variance = self.variance() + other.variance();
        Gaussian::from_raw_parts(self.mean() + other.mean(), variance.sqrt())
    }
}

impl Interpolant for GaussianVec3 {
    fn zero() -> Self {
        GaussianVec3::default()
    }

    fn scaled(&self, weight: f32) -> Self {
        GaussianVec3 {
            components: self.components.map(|g| g.scaled(weight)),
        }
    }

    fn accumulate(self, other: Self) -> Self {
        let [x, y, z] = self.components;
        let [ox, oy, oz] = other.components;
        GaussianVec3::new(x.accumulate(ox), y.accumulate(oy), z.accumulate(oz))
    }
}

/// Combine `values` with `weights`.
///
/// # Panics
/// Panics if `weights` and `values` differ in length.
#[must_use]
pub fn interpolate<T: Interpolant>(weights: &[f32], values: &[T]) -> T {
    assert_eq!(
        weights.len(),
        values.len(),
        "interpolate: one weight per value"
    );
    weights
        .iter()
        .zip(values)
        .fold(T::zero(), |acc, (&w, v)| acc.accumulate(v.scaled(w)))
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1).
#[must_use]
pub fn lerp<T: Interpolant>(a: &T, b: &T, t: f32) -> T {
    a.scaled(1.0 - t).accumulate(b.scaled(t))
}

/// Trilinear weights for local coordinates `(u, v, w)`.
///
/// Corner `i` takes `u` if bit 0 is set (else `1 - u`), `v` for bit 1 and
/// `w` for bit 2.
#[must_use]
pub fn trilinear_weights(local: Vec3) -> [f32; 8] {
    let (u, v, w) = (local.x, local.y, local.z);
    std::array::from_fn(|i| {
        let fx = if i & 1 == 0 { 1.0 - u } else { u };
        let fy = if i & 2 == 0 { 1.0 - v } else { v };
        let fz = if i & 4 == 0 { 1.0 - w } else { w };
        fx * fy * fz
    })
}

/// Trilinear interpolation of eight corner values at local coordinates.
#[must_use]
pub fn trilerp<T: Interpolant>(corners: &[T; 8], local: Vec3) -> T {
    interpolate(&trilinear_weights(local), corners)
}
