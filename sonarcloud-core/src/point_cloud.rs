//! Visible point set and its derived metrics

use serde::{Deserialize, Serialize};

use crate::point::*;
use crate::traits::Drawable;

/// Center and extent of the visible set.
///
/// Used to scale operator-facing radii; never used for indexing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingMetrics {
    pub center: Point3f,
    /// Largest of the three axis extents
    pub size: f32,
}

impl BoundingMetrics {
    pub fn from_points(points: &[Point3f]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let (min, max) = points.bounding_box();
        let extent = max - min;
        Self {
            center: points.center(),
            size: extent.x.max(extent.y).max(extent.z),
        }
    }
}

impl Default for BoundingMetrics {
    fn default() -> Self {
        Self {
            center: Point3f::origin(),
            size: 0.0,
        }
    }
}

/// The working subset of points as parallel arrays.
///
/// Index `i` in every array refers to the same logical point and all five
/// arrays always have the same length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisibleSet {
    pub positions: Vec<Point3f>,
    pub colors: Vec<Color>,
    pub amplitudes: Vec<f32>,
    pub visible: Vec<bool>,
    pub regions: Vec<i32>,
}

impl VisibleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            amplitudes: Vec::with_capacity(capacity),
            visible: Vec::with_capacity(capacity),
            regions: Vec::with_capacity(capacity),
        }
    }

    /// Build a fully visible set with every point in [`DEFAULT_REGION`].
    ///
    /// # Panics
    /// If the three input arrays differ in length.
    pub fn from_parts(positions: Vec<Point3f>, colors: Vec<Color>, amplitudes: Vec<f32>) -> Self {
        assert!(
            positions.len() == colors.len() && positions.len() == amplitudes.len(),
            "visible set arrays must have equal length"
        );
        let n = positions.len();
        Self {
            positions,
            colors,
            amplitudes,
            visible: vec![true; n],
            regions: vec![DEFAULT_REGION; n],
        }
    }

    /// Append a visible point
    pub fn push(&mut self, position: Point3f, color: Color, amplitude: f32) {
        self.positions.push(position);
        self.colors.push(color);
        self.amplitudes.push(amplitude);
        self.visible.push(true);
        self.regions.push(DEFAULT_REGION);
    }

    pub fn len(&self) -> usize {
        self.debug_check_lengths();
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.amplitudes.clear();
        self.visible.clear();
        self.regions.clear();
    }

    /// Number of points currently flagged visible
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }

    pub fn metrics(&self) -> BoundingMetrics {
        BoundingMetrics::from_points(&self.positions)
    }

    /// `true` when all parallel arrays have the same length
    pub fn lengths_consistent(&self) -> bool {
        let n = self.positions.len();
        self.colors.len() == n
            && self.amplitudes.len() == n
            && self.visible.len() == n
            && self.regions.len() == n
    }

    /// Fail loudly in debug builds if the parallel arrays diverged
    #[inline]
    pub fn debug_check_lengths(&self) {
        debug_assert!(
            self.lengths_consistent(),
            "visible set arrays out of sync: positions={} colors={} amplitudes={} visible={} regions={}",
            self.positions.len(),
            self.colors.len(),
            self.amplitudes.len(),
            self.visible.len(),
            self.regions.len(),
        );
    }
}
