//! Fixed-radius neighbor search implementations

use rstar::primitives::GeomWithData;
use rstar::RTree;
use sonarcloud_core::{Point3f, RadiusSearch};

/// A point with its index in the source slice
type IndexedPoint = GeomWithData<[f32; 3], usize>;

#[inline]
fn squared_distance(a: &Point3f, b: &[f32; 3]) -> f32 {
    let dx = a.x - b[0];
    let dy = a.y - b[1];
    let dz = a.z - b[2];
    dx * dx + dy * dy + dz * dz
}

/// R*-tree over a fixed point set.
///
/// Bulk-loaded once; queries are read-only so the index can be shared
/// across threads during a segmentation run.
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl RTreeIndex {
    pub fn new(points: &[Point3f]) -> Self {
        let items: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(idx, p)| GeomWithData::new([p.x, p.y, p.z], idx))
            .collect();

        Self {
            tree: RTree::bulk_load(items),
        }
    }
}

impl RadiusSearch for RTreeIndex {
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if radius < 0.0 {
            return Vec::new();
        }
        self.tree
            .locate_within_distance([query.x, query.y, query.z], radius * radius)
            .map(|item| (item.data, squared_distance(query, item.geom()).sqrt()))
            .collect()
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}

/// Simple brute force neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl RadiusSearch for BruteForceSearch {
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if radius < 0.0 {
            return Vec::new();
        }
        let radius_squared = radius * radius;
        self.points
            .iter()
            .enumerate()
            .filter_map(|(idx, point)| {
                let distance_squared = squared_distance(query, &[point.x, point.y, point.z]);

                if distance_squared <= radius_squared {
                    Some((idx, distance_squared.sqrt()))
                } else {
                    None
                }
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
