//! Loading datasets from disk.
//!
//! - [`descriptor`] - INFO/JSON dataset descriptors
//! - [`raw`] - flat little-endian `f32` array files
//! - [`loader`] - descriptor to [`Dataset`](crate::Dataset)

pub mod descriptor;
pub mod loader;
pub mod raw;

pub use descriptor::{DatasetDescriptor, InfoTree, ItemPolicy};
pub use loader::{
    load_dataset, load_gaussian_dataset, load_gaussian_sampling_dataset,
    load_regular_gaussian_grid, LoadedDataset,
};
pub use raw::{load_gaussian_raw_array, load_vec3_gaussian_raw_array, read_raw, write_raw};
