//! Contract for external smoothing filters
//!
//! Edge-preserving smoothing (bilateral filtering over an octree, for
//! instance) lives outside this crate. The engine hands such a filter the
//! visible arrays plus a partition layout sized from the filter radius, and
//! re-absorbs whatever arrays come back.

use sonarcloud_core::{Color, Drawable, Error, Point3f, Result};

/// Bounding cube handed to a hierarchical partition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionLayout {
    /// Minimum corner of the cube
    pub origin: [f64; 3],
    /// Edge length of the cube
    pub size: f64,
    /// Subdivision depth; `None` when no radius was given
    pub depth: Option<u32>,
}

impl PartitionLayout {
    /// Compute the cube enclosing `points` for a filter of the given radius.
    ///
    /// The loose box is 1.1 times the largest extent. With a positive
    /// radius the edge is grown to `2^depth * 2 * radius`, the smallest
    /// power-of-two multiple of `2 * radius` covering the loose box, so the
    /// leaf cells are exactly `2 * radius` wide. The box stays centered on
    /// the points.
    ///
    /// `depth` counts subdivisions down to `2 * radius` cells. An octree
    /// that wants cells of `radius` instead needs `depth + 1` levels over
    /// the same `size`.
    pub fn for_radius(points: &[Point3f], radius: f64) -> Self {
        let (min, max) = points.bounding_box();
        let extent = max - min;
        let loose = 1.1 * (extent.x.max(extent.y).max(extent.z) as f64);

        let (size, margin, depth) = if radius > 0.0 {
            let cell = 2.0 * radius;
            let depth = if loose > cell { (loose / cell).log2().ceil() as u32 } else { 0 };
            let adapted = 2f64.powi(depth as i32) * cell;
            (adapted, 0.5 * (adapted - loose), Some(depth))
        } else {
            (loose, 0.05 * loose, None)
        };

        Self {
            origin: [
                min.x as f64 - margin,
                min.y as f64 - margin,
                min.z as f64 - margin,
            ],
            size,
            depth,
        }
    }

    /// Edge length of the deepest cells, if a depth was set
    pub fn leaf_size(&self) -> Option<f64> {
        self.depth.map(|d| self.size / 2f64.powi(d as i32))
    }
}

/// Parameters forwarded to a smoothing filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub radius: f64,
    pub normal_radius: f64,
    pub iterations: u32,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            radius: 0.1,
            normal_radius: 0.1,
            iterations: 1,
        }
    }
}

/// Borrowed view of the visible arrays
#[derive(Debug, Clone, Copy)]
pub struct SmoothingInput<'a> {
    pub positions: &'a [Point3f],
    pub colors: &'a [Color],
    pub amplitudes: &'a [f32],
}

/// Replacement arrays produced by a filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothedPoints {
    pub positions: Vec<Point3f>,
    pub colors: Vec<Color>,
    pub amplitudes: Vec<f32>,
}

impl SmoothedPoints {
    /// Reject outputs whose arrays disagree in length or that carry
    /// non-finite positions
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        if self.colors.len() != n || self.amplitudes.len() != n {
            return Err(Error::InvalidData(format!(
                "smoothing filter returned {} positions, {} colors and {} amplitudes",
                n,
                self.colors.len(),
                self.amplitudes.len()
            )));
        }
        if let Some(i) = self.positions.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(Error::InvalidData(format!(
                "smoothing filter returned a non-finite position at index {}",
                i
            )));
        }
        Ok(())
    }
}

/// An external filter that replaces the visible arrays
pub trait SmoothingFilter {
    fn filter(
        &self,
        input: SmoothingInput<'_>,
        params: &SmoothingParams,
        layout: &PartitionLayout,
    ) -> Result<SmoothedPoints>;
}
