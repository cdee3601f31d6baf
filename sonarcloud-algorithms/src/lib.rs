//! # Sonarcloud Algorithms
//!
//! Algorithms operating on a sonar point cloud session.
//!
//! This crate provides amplitude heatmap derivation, density-based region
//! segmentation, in-place compaction with location index maintenance, sonar
//! clip filtering, the contract for external smoothing filters, and the
//! [`PointCloudState`] facade tying them together.

pub mod nearest_neighbor;
pub mod heatmap;
pub mod segmentation;
pub mod compaction;
pub mod filtering;
pub mod smoothing;
pub mod engine;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use heatmap::*;
pub use segmentation::*;
pub use compaction::*;
pub use filtering::*;
pub use smoothing::*;
pub use engine::*;
