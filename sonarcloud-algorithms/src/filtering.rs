//! Visibility filters
//!
//! Filters only clear visibility flags; dropping the flagged points is left
//! to [`crate::compaction::compact`].

use sonarcloud_core::{ClipBounds, Point3f, VisibleSet};

/// Clear the visible flag of every point for which `keep` returns `false`.
///
/// Returns the number of points newly flagged invisible.
pub fn flag_points<F>(set: &mut VisibleSet, mut keep: F) -> usize
where
    F: FnMut(&Point3f) -> bool,
{
    let mut flagged = 0;
    for (p, visible) in set.positions.iter().zip(set.visible.iter_mut()) {
        if *visible && !keep(p) {
            *visible = false;
            flagged += 1;
        }
    }
    flagged
}

/// Sonar clip filter
///
/// Flags the points outside the sensor's useful volume: too shallow, too
/// deep, outside the lateral box, or inside the diamond around the
/// transducer axis where the ringing artifacts sit.
///
/// # Example
/// ```rust
/// use sonarcloud_core::{ClipBounds, Point3f, VisibleSet};
/// use sonarcloud_algorithms::clip_sonar_noise;
///
/// let mut set = VisibleSet::new();
/// set.push(Point3f::new(5.0, 5.0, 30.0), [1.0, 0.0, 0.0], 0.8);
/// set.push(Point3f::new(0.5, 0.5, 30.0), [1.0, 0.0, 0.0], 0.9);
///
/// let flagged = clip_sonar_noise(&mut set, &ClipBounds::default());
/// assert_eq!(flagged, 1);
/// assert_eq!(set.visible, vec![true, false]);
/// ```
pub fn clip_sonar_noise(set: &mut VisibleSet, bounds: &ClipBounds) -> usize {
    flag_points(set, |p| bounds.keeps(p.x, p.y, p.z))
}
