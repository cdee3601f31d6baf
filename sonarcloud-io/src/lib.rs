//! I/O operations for sonar point clouds
//!
//! This crate reads raw sonar sample files into [`RawPoint`]s and exports
//! segmented visible sets as OBJ vertices carrying their region label.
//!
//! [`RawPoint`]: sonarcloud_core::RawPoint

pub mod raw;
pub mod obj;
pub mod error;

#[cfg(test)]
mod tests;

pub use error::*;
pub use raw::{parse_raw_samples, read_raw_samples, write_raw_samples, SAMPLE_BYTES};
pub use obj::{write_region_obj, write_region_vertices};
