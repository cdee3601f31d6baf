//! Engine configuration
//!
//! Operator-facing parameters are expressed relative to the current visible
//! set (percent of the bounding box size, percent of the point count) and
//! resolved into absolute values right before an operation runs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point_cloud::BoundingMetrics;

/// Box and transducer exclusion zone used by the sonar clip filter.
///
/// A point is dropped when `z <= min_depth`, `z >= max_depth`,
/// `|x| >= half_width`, `|y| >= half_width` or `|x| + |y| <= transducer_radius`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipBounds {
    pub min_depth: f32,
    pub max_depth: f32,
    pub half_width: f32,
    pub transducer_radius: f32,
}

impl Default for ClipBounds {
    fn default() -> Self {
        Self {
            min_depth: 20.0,
            max_depth: 46.3,
            half_width: 14.0,
            transducer_radius: 2.0,
        }
    }
}

impl ClipBounds {
    /// `true` if the point lies inside the kept region
    pub fn keeps(&self, x: f32, y: f32, z: f32) -> bool {
        !(z <= self.min_depth
            || z >= self.max_depth
            || x.abs() >= self.half_width
            || y.abs() >= self.half_width
            || x.abs() + y.abs() <= self.transducer_radius)
    }
}

/// Tunable parameters of a point cloud session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of the peak amplitude a sample needs to become visible
    pub amplitude_threshold: f32,
    /// Segmentation radius as a percentage of the bounding box size
    pub neighbor_radius_percent: f32,
    /// Largest discarded component as a percentage of the visible count
    pub isolation_threshold_percent: f32,
    /// Decimal places kept by the location index keys
    pub location_precision: u32,
    /// Precompute neighbor lists on the rayon pool during segmentation
    pub parallel_segmentation: bool,
    pub clip: ClipBounds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            amplitude_threshold: 0.1,
            neighbor_radius_percent: 6.0,
            isolation_threshold_percent: 2.5,
            location_precision: 0,
            parallel_segmentation: false,
            clip: ClipBounds::default(),
        }
    }
}

impl EngineConfig {
    /// Reject values no operation can run with
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.amplitude_threshold)?;
        if !self.neighbor_radius_percent.is_finite() || self.neighbor_radius_percent < 0.0 {
            return Err(Error::InvalidData(format!(
                "neighbor_radius_percent must be a non-negative number, got {}",
                self.neighbor_radius_percent
            )));
        }
        if !self.isolation_threshold_percent.is_finite() || self.isolation_threshold_percent < 0.0 {
            return Err(Error::InvalidData(format!(
                "isolation_threshold_percent must be a non-negative number, got {}",
                self.isolation_threshold_percent
            )));
        }
        Ok(())
    }

    /// Absolute neighbor radius for the current bounding box
    pub fn segmentation_radius(&self, metrics: &BoundingMetrics) -> f32 {
        self.neighbor_radius_percent / 100.0 * metrics.size
    }

    /// Absolute component size at or below which a component is noise
    pub fn size_threshold(&self, visible_count: usize) -> usize {
        (self.isolation_threshold_percent / 100.0 * visible_count as f32).floor() as usize
    }
}

/// Initial smoothing radius suggested for a freshly loaded set
pub fn default_smoothing_radius(metrics: &BoundingMetrics, visible_count: usize) -> f32 {
    if visible_count == 0 {
        return 0.0;
    }
    metrics.size * (20.0 / visible_count as f32).sqrt()
}

/// Check that an amplitude threshold is a fraction in `[0, 1]`
pub fn validate_threshold(threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidData(format!(
            "amplitude threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}
