//! Core traits for sonarcloud

use crate::point::{Color, Point3f};

/// Fixed-radius neighbor search over a point set fixed at construction.
///
/// Building the structure is the constructor of the implementing type and
/// disposal is `Drop`. Implementations must be read-only once built.
pub trait RadiusSearch {
    /// Find all indexed points within `radius` (inclusive) of `query`.
    ///
    /// Results are `(index, distance)` pairs in unspecified order. A point
    /// equal to `query` that is part of the index is always included.
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;

    /// Number of points in the index
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scalar-to-RGB mapping used to color equalized amplitudes
pub trait ColorGradient {
    /// Color for `value` in `[0, 1]`; every component is in `[0, 1]`.
    fn color_at(&self, value: f32) -> Color;
}

/// Trait for objects with an axis-aligned extent
pub trait Drawable {
    /// Get the bounding box of the object as `(min, max)`
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

impl Drawable for [Point3f] {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self[0];
        let mut max = self[0];

        for p in self {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }
}
