//! In-place removal of points flagged invisible

use std::collections::HashSet;

use log::debug;
use sonarcloud_core::{BoundingMetrics, LocationIndex, QuantizedKey, VisibleSet};

/// Drop every invisible point from `set`, keeping survivors in order.
///
/// Single forward pass: each visible point moves to the next free slot,
/// which is never ahead of the slot being read, so no survivor is clobbered
/// before it is copied. The location index entry of each dropped point is
/// removed; buckets shared with a survivor are then refilled from the
/// survivors in order, so a lookup never returns the amplitude of a point
/// that is gone. `metrics` is recomputed over the retained points even when
/// nothing was dropped.
///
/// Returns the number of retained points.
pub fn compact(set: &mut VisibleSet, locations: &mut LocationIndex, metrics: &mut BoundingMetrics) -> usize {
    set.debug_check_lengths();

    let old_count = set.positions.len();
    let mut removed: HashSet<QuantizedKey> = HashSet::new();
    let mut write = 0usize;

    for read in 0..old_count {
        if set.visible[read] {
            if write != read {
                set.positions[write] = set.positions[read];
                set.colors[write] = set.colors[read];
                set.amplitudes[write] = set.amplitudes[read];
                set.regions[write] = set.regions[read];
                set.visible[write] = true;
            }
            write += 1;
        } else {
            let key = locations.key_of(&set.positions[read]);
            locations.remove_key(&key);
            removed.insert(key);
        }
    }

    set.positions.truncate(write);
    set.colors.truncate(write);
    set.amplitudes.truncate(write);
    set.visible.truncate(write);
    set.regions.truncate(write);

    if !removed.is_empty() {
        for (p, &amplitude) in set.positions.iter().zip(&set.amplitudes) {
            if removed.contains(&locations.key_of(p)) {
                locations.insert(p, amplitude);
            }
        }
    }

    *metrics = BoundingMetrics::from_points(&set.positions);
    set.debug_check_lengths();

    debug!(
        "compaction: kept {} of {} points, cleared {} location buckets",
        write,
        old_count,
        removed.len()
    );
    write
}
