//! Raw array files.
//!
//! A raw file is a flat sequence of little-endian IEEE-754 `f32` values in the
//! grid's vertex order. Reads either return exactly the requested number of
//! values or fail; a partially filled array is never handed out.

use std::fs;
use std::path::Path;

use glam::Vec3;

use crate::distribution::{Gaussian, GaussianVec3};
use crate::error::LoadError;

const VALUE_BYTES: usize = std::mem::size_of::<f32>();

/// Read the first `len` values of a raw `f32` file.
///
/// Trailing bytes past `len` values are ignored.
///
/// # Errors
/// [`LoadError::Io`] if the file cannot be read, [`LoadError::ShortRead`] if it
/// holds fewer than `len` values.
pub fn read_raw(path: &Path, len: usize) -> Result<Vec<f32>, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let found = bytes.len() / VALUE_BYTES;
    if found < len {
        return Err(LoadError::ShortRead {
            path: path.to_path_buf(),
            expected: len,
            found,
        });
    }

    Ok(bytes
        .chunks_exact(VALUE_BYTES)
        .take(len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Write values as a raw little-endian `f32` file.
///
/// # Errors
/// [`LoadError::Io`] if the file cannot be written.
pub fn write_raw(path: &Path, values: &[f32]) -> Result<(), LoadError> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    fs::write(path, bytes).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Pair a mean file and a standard-deviation file into `len` Gaussians.
///
/// # Errors
/// Any read error, or [`LoadError::Distribution`] for a negative or
/// non-finite parameter.
pub fn load_gaussian_raw_array(
    mean_file: &Path,
    std_file: &Path,
    len: usize,
) -> Result<Vec<Gaussian>, LoadError> {
    let means = read_raw(mean_file, len)?;
    let stds = read_raw(std_file, len)?;
    means
        .into_iter()
        .zip(stds)
        .map(|(m, s)| Gaussian::try_new(m, s).map_err(LoadError::from))
        .collect()
}

/// Pair interleaved xyz mean/std files into `len` vector Gaussians.
///
/// Each file holds `3 * len` values, x, y, z per vertex.
///
/// # Errors
/// Any read error, [`LoadError::Distribution`] for an invalid deviation, or
/// [`LoadError::Configuration`] if `3 * len` overflows.
pub fn load_vec3_gaussian_raw_array(
    mean_file: &Path,
    std_file: &Path,
    len: usize,
) -> Result<Vec<GaussianVec3>, LoadError> {
    let values = len
        .checked_mul(3)
        .ok_or_else(|| LoadError::config(format!("{len} vector values overflow the file size")))?;
    let means = read_raw(mean_file, values)?;
    let stds = read_raw(std_file, values)?;
    means
        .chunks_exact(3)
        .zip(stds.chunks_exact(3))
        .map(|(m, s)| {
            GaussianVec3::try_from_moments(Vec3::from_slice(m), Vec3::from_slice(s))
                .map_err(LoadError::from)
        })
        .collect()
}
