//! Core data structures and traits for sonarcloud
//!
//! This crate provides the data model of a sonar point cloud session: raw
//! samples, the visible point set with its parallel attribute arrays, the
//! quantized location index, bounding metrics, and the traits through which
//! the engine consumes spatial indexes and color gradients.

pub mod point;
pub mod point_cloud;
pub mod location_index;
pub mod traits;
pub mod gradient;
pub mod config;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use location_index::*;
pub use traits::*;
pub use gradient::*;
pub use config::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::Point3;
