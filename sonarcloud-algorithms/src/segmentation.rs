//! Density-based region growing
//!
//! Components are the connected pieces of the implicit graph in which two
//! points are adjacent when they lie within `radius` of each other. Each
//! component is discovered by breadth-first expansion from the lowest-index
//! unvisited point, re-querying the radius index from every dequeued point.
//! Components no larger than the size threshold are labeled noise.

use std::collections::VecDeque;

use log::{info, trace};
use rayon::prelude::*;
use sonarcloud_core::{Error, Point3f, RadiusSearch, Result, NOISE_REGION};

/// Labels produced by a segmentation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationOutcome {
    /// Region id per point, or [`NOISE_REGION`]
    pub labels: Vec<i32>,
    /// `false` for every point of a discarded component
    pub visible: Vec<bool>,
    /// Number of regions that survived; ids are `0..region_count`
    pub region_count: usize,
    /// Number of points labeled noise
    pub discarded: usize,
}

impl SegmentationOutcome {
    /// Member indices of each surviving region, in region id order
    pub fn regions(&self) -> Vec<Vec<usize>> {
        let mut regions = vec![Vec::new(); self.region_count];
        for (idx, &label) in self.labels.iter().enumerate() {
            if label >= 0 {
                regions[label as usize].push(idx);
            }
        }
        regions
    }
}

fn validate(points: &[Point3f], indexed: usize, radius: f32) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(Error::InvalidData(format!(
            "radius must be a non-negative number, got {}",
            radius
        )));
    }
    if indexed != points.len() {
        return Err(Error::InvalidData(format!(
            "spatial index holds {} points but {} were given",
            indexed,
            points.len()
        )));
    }
    Ok(())
}

/// Flood-fill components over `n` points.
///
/// `neighbors(i, out)` must append every point adjacent to `i` to `out`.
/// Seeds are taken in index order and region ids are assigned serially, so
/// numbering is deterministic for a given input order.
fn grow_regions<F>(n: usize, mut neighbors: F, size_threshold: usize) -> SegmentationOutcome
where
    F: FnMut(usize, &mut Vec<usize>),
{
    let mut labels = vec![NOISE_REGION; n];
    let mut visible = vec![true; n];
    let mut visited = vec![false; n];
    let mut region_count = 0usize;
    let mut discarded = 0usize;

    let mut frontier = VecDeque::new();
    let mut members = Vec::new();
    let mut found = Vec::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        frontier.push_back(seed);
        members.clear();

        while let Some(current) = frontier.pop_front() {
            members.push(current);
            found.clear();
            neighbors(current, &mut found);
            for &idx in &found {
                if !visited[idx] {
                    visited[idx] = true;
                    frontier.push_back(idx);
                }
            }
        }

        trace!("component from seed {} has {} points", seed, members.len());

        if members.len() <= size_threshold {
            for &idx in &members {
                visible[idx] = false;
                labels[idx] = NOISE_REGION;
            }
            discarded += members.len();
        } else {
            for &idx in &members {
                labels[idx] = region_count as i32;
            }
            region_count += 1;
        }
    }

    SegmentationOutcome {
        labels,
        visible,
        region_count,
        discarded,
    }
}

/// Segment `points` into radius-connected regions.
///
/// # Arguments
/// * `points` - Positions, in the same order they were indexed
/// * `index` - Radius index built over exactly `points`
/// * `radius` - Adjacency radius (inclusive)
/// * `size_threshold` - Components with at most this many points are noise
///
/// # Returns
/// * `Result<SegmentationOutcome>` - Labels and visibility per point
pub fn segment_regions<S>(
    points: &[Point3f],
    index: &S,
    radius: f32,
    size_threshold: usize,
) -> Result<SegmentationOutcome>
where
    S: RadiusSearch + ?Sized,
{
    validate(points, index.len(), radius)?;

    let outcome = grow_regions(
        points.len(),
        |i, out| {
            out.extend(
                index
                    .find_radius_neighbors(&points[i], radius)
                    .into_iter()
                    .map(|(idx, _)| idx),
            )
        },
        size_threshold,
    );

    info!(
        "segmentation: {} points, radius {:.4}, threshold {} -> {} regions, {} discarded",
        points.len(),
        radius,
        size_threshold,
        outcome.region_count,
        outcome.discarded
    );
    Ok(outcome)
}

/// Parallel variant of [`segment_regions`].
///
/// Neighbor lists for every point are computed on the rayon pool first; the
/// flood fill and region numbering then run on the calling thread, so the
/// outcome is identical to the serial version.
pub fn segment_regions_parallel<S>(
    points: &[Point3f],
    index: &S,
    radius: f32,
    size_threshold: usize,
) -> Result<SegmentationOutcome>
where
    S: RadiusSearch + Sync + ?Sized,
{
    validate(points, index.len(), radius)?;

    let adjacency: Vec<Vec<usize>> = points
        .par_iter()
        .map(|p| {
            index
                .find_radius_neighbors(p, radius)
                .into_iter()
                .map(|(idx, _)| idx)
                .collect()
        })
        .collect();

    let outcome = grow_regions(
        points.len(),
        |i, out| out.extend_from_slice(&adjacency[i]),
        size_threshold,
    );

    info!(
        "parallel segmentation: {} points, radius {:.4}, threshold {} -> {} regions, {} discarded",
        points.len(),
        radius,
        size_threshold,
        outcome.region_count,
        outcome.discarded
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearest_neighbor::{BruteForceSearch, RTreeIndex};

    /// Two clusters: four points around the origin and two points far away
    fn two_clusters() -> Vec<Point3f> {
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(100.0, 0.0, 0.0),
            Point3f::new(0.5, 0.0, 0.0),
            Point3f::new(0.5, 0.5, 0.0),
            Point3f::new(100.5, 0.0, 0.0),
            Point3f::new(0.0, 0.5, 0.0),
        ]
    }

    #[test]
    fn test_small_cluster_is_discarded() {
        let points = two_clusters();
        let index = RTreeIndex::new(&points);
        let outcome = segment_regions(&points, &index, 0.6, 3).unwrap();

        assert_eq!(outcome.region_count, 1);
        assert_eq!(outcome.discarded, 2);
        assert_eq!(outcome.labels, vec![0, -1, 0, 0, -1, 0]);
        assert_eq!(outcome.visible, vec![true, false, true, true, false, true]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let points = two_clusters();
        let index = RTreeIndex::new(&points);
        let outcome = segment_regions(&points, &index, 0.6, 4).unwrap();

        assert_eq!(outcome.region_count, 0);
        assert_eq!(outcome.discarded, 6);
        assert!(outcome.visible.iter().all(|v| !v));
    }

    #[test]
    fn test_chains_connect_through_intermediate_points() {
        // Consecutive points are 1.0 apart; ends are 4.0 apart
        let points: Vec<Point3f> = (0..5).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect();
        let index = RTreeIndex::new(&points);
        let outcome = segment_regions(&points, &index, 1.0, 0).unwrap();

        assert_eq!(outcome.region_count, 1);
        assert_eq!(outcome.regions(), vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn test_isolated_points_form_singleton_components() {
        let points: Vec<Point3f> = (0..4).map(|i| Point3f::new(i as f32 * 10.0, 0.0, 0.0)).collect();
        let index = BruteForceSearch::new(&points);

        let kept = segment_regions(&points, &index, 1.0, 0).unwrap();
        assert_eq!(kept.region_count, 4);
        assert_eq!(kept.labels, vec![0, 1, 2, 3]);

        let dropped = segment_regions(&points, &index, 1.0, 1).unwrap();
        assert_eq!(dropped.region_count, 0);
        assert_eq!(dropped.discarded, 4);
    }

    #[test]
    fn test_region_ids_follow_seed_order() {
        let points = vec![
            Point3f::new(50.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(50.2, 0.0, 0.0),
            Point3f::new(0.2, 0.0, 0.0),
        ];
        let index = RTreeIndex::new(&points);
        let outcome = segment_regions(&points, &index, 0.5, 1).unwrap();

        assert_eq!(outcome.labels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let mut points = Vec::new();
        for c in 0..5 {
            let base = c as f32 * 20.0;
            for i in 0..(c * 3 + 1) {
                points.push(Point3f::new(base + (i % 4) as f32 * 0.3, (i / 4) as f32 * 0.3, 0.0));
            }
        }
        let index = RTreeIndex::new(&points);

        let serial = segment_regions(&points, &index, 0.35, 4).unwrap();
        let parallel = segment_regions_parallel(&points, &index, 0.35, 4).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_empty_input() {
        let index = RTreeIndex::new(&[]);
        let outcome = segment_regions(&[], &index, 1.0, 3).unwrap();

        assert_eq!(outcome.region_count, 0);
        assert!(outcome.labels.is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        let points = two_clusters();
        let index = RTreeIndex::new(&points);
        assert!(segment_regions(&points, &index, -1.0, 3).is_err());
        assert!(segment_regions(&points, &index, f32::NAN, 3).is_err());
        assert!(segment_regions(&points[..3], &index, 1.0, 3).is_err());
    }
}
