//! Nearest-point search over a fixed set of identified points.

use geo::Point;
use gridtopo_core::models::FeatureId;
use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree};

/// Indexed point; the payload is its insertion slot
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Result of a nearest-point query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit<'a> {
    /// Position of the hit in the slice the index was built from
    pub slot: usize,
    pub id: &'a FeatureId,
    /// Euclidean distance in CRS units
    pub distance: f64,
}

/// Immutable R-tree over points keyed by feature id.
///
/// Equidistant candidates are resolved by the lexically smallest id, then by
/// insertion order, so results never depend on the tree's internal layout.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
    ids: Vec<FeatureId>,
}

impl PointIndex {
    /// Bulk-load an index from `(id, point)` pairs
    pub fn new<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (FeatureId, Point)>,
    {
        let mut ids = Vec::new();
        let mut entries = Vec::new();
        for (slot, (id, point)) in points.into_iter().enumerate() {
            ids.push(id);
            entries.push(GeomWithData::new([point.x(), point.y()], slot));
        }

        Self { tree: RTree::bulk_load(entries), ids }
    }

    /// Find the closest indexed point
    pub fn nearest(&self, point: Point) -> Option<NearestHit<'_>> {
        let query = [point.x(), point.y()];
        let mut candidates =
            self.tree.nearest_neighbor_iter(&query).map(|entry| (entry, entry.distance_2(&query)));

        let (first, best_d2) = candidates.next()?;
        let mut best = first.data;

        for (entry, d2) in candidates {
            if d2 > best_d2 {
                break;
            }
            if (&self.ids[entry.data], entry.data) < (&self.ids[best], best) {
                best = entry.data;
            }
        }

        Some(NearestHit { slot: best, id: &self.ids[best], distance: best_d2.sqrt() })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
