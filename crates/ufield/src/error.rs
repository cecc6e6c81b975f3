//! Error types.
//!
//! Geometry and query failures are [`GridError`] values returned from
//! `phys_to_cell`/`at_phys`; callers check them before using a result.
//! Loading failures are [`LoadError`] and abort dataset construction.

use std::path::PathBuf;

use glam::Vec3;
use thiserror::Error;

/// Geometry and lookup failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Position lies outside the padded bounding box.
    #[error("position {position} is outside the grid bounds")]
    OutOfBounds {
        /// Queried physical position
        position: Vec3,
    },
    /// Vertex, cell or array index outside its valid range.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Number of valid entries
        len: usize,
    },
    /// A grid needs at least two vertices along every axis.
    #[error("grid dimensions {dimensions:?} must be at least 2 on every axis")]
    InvalidDimensions {
        /// Requested vertex counts
        dimensions: [usize; 3],
    },
    /// Bounds are empty, inverted, or the real box is not inside the padded box.
    #[error("invalid grid bounds: {0}")]
    InvalidBounds(String),
    /// Array length does not match the grid's vertex count.
    #[error("array holds {found} values but the grid has {expected} vertices")]
    SizeMismatch {
        /// Vertex count of the grid
        expected: usize,
        /// Length of the array
        found: usize,
    },
}

impl GridError {
    /// Shorthand for an out-of-range index.
    #[must_use]
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

/// Invalid distribution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DistributionError {
    /// Standard deviation must be non-negative (and not NaN).
    #[error("standard deviation must be >= 0, got {0}")]
    NegativeStd(f32),
    /// Mean or standard deviation is infinite or NaN.
    #[error("distribution parameters must be finite, got mean {mean}, std {std}")]
    NonFinite {
        /// Requested mean
        mean: f32,
        /// Requested standard deviation
        std: f32,
    },
}

/// Failures while loading a dataset from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be opened or read.
    #[error("error reading {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Raw array file ended before the expected number of elements.
    #[error("short read on {}: expected {expected} values, found {found}", path.display())]
    ShortRead {
        /// File being read
        path: PathBuf,
        /// Number of values requested
        expected: usize,
        /// Number of complete values present
        found: usize,
    },
    /// Descriptor is syntactically malformed.
    #[error("descriptor parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
    /// Unsupported or missing grid type, data type, tuple count or policy.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Grid construction rejected the descriptor's geometry.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Raw arrays contained an invalid distribution.
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

impl LoadError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
