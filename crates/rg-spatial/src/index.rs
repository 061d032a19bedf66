//! Nearest-vertex spatial index.
//!
//! An R-tree (via `rstar`) over the finalized graph's vertex coordinates.
//! The tree is a balanced hierarchical partition of the plane, so a nearest
//! query descends O(log N) levels and prunes every subtree whose bounding
//! box is farther away than the best candidate found so far.
//!
//! Distances are squared planar distances in `(lat, lon)` space, the same
//! metric the graph uses for edge weights.
//!
//! The index is built once from a [`RoadGraph`] and never updated; a new
//! graph needs a new index.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use rg_core::{Coord, VertexId};

use crate::graph::RoadGraph;
use crate::{SpatialError, SpatialResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a `[lat, lon]` point with its vertex.
#[derive(Clone, Debug)]
struct VertexEntry {
    point: [f64; 2], // [lat, lon]
    id:    VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d_lat = self.point[0] - point[0];
        let d_lon = self.point[1] - point[1];
        d_lat * d_lat + d_lon * d_lon
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Answers "which vertex is closest to this coordinate" in sub-linear time.
///
/// Results are deterministic: among vertices at exactly the same distance,
/// the smallest [`VertexId`] wins.
pub struct SpatialIndex {
    tree: RTree<VertexEntry>,
}

impl SpatialIndex {
    /// Bulk-load the index from every vertex of `graph`.
    ///
    /// Time complexity: O(N log N).  Bulk loading packs the tree better than
    /// N single inserts.
    pub fn build(graph: &RoadGraph) -> Self {
        let entries: Vec<VertexEntry> = graph
            .positions()
            .map(|(id, pos)| VertexEntry { point: [pos.lat, pos.lon], id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Id of the vertex nearest to `(lon, lat)`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyIndex`] if the graph has no vertices,
    /// [`SpatialError::InvalidCoordinate`] for NaN or infinite input.
    pub fn nearest(&self, lon: f64, lat: f64) -> SpatialResult<VertexId> {
        self.nearest_entry(lon, lat).map(|e| e.id)
    }

    /// Up to `k` vertex ids nearest to `(lon, lat)`, ascending by distance
    /// and then by id.
    pub fn k_nearest(&self, lon: f64, lat: f64, k: usize) -> SpatialResult<Vec<VertexId>> {
        let query = query_point(lon, lat)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        // Keep pulling past the k-th entry while distances still tie with it,
        // otherwise a larger id could displace a smaller one at the cut.
        let mut hits: Vec<(f64, VertexId)> = Vec::with_capacity(k + 1);
        for (entry, d2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            if hits.len() >= k && d2 > hits[hits.len() - 1].0 {
                break;
            }
            hits.push((d2, entry.id));
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.truncate(k);
        Ok(hits.into_iter().map(|(_, id)| id).collect())
    }

    fn nearest_entry(&self, lon: f64, lat: f64) -> SpatialResult<&VertexEntry> {
        let query = query_point(lon, lat)?;
        let mut iter = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (mut best, best_d2) = iter.next().ok_or(SpatialError::EmptyIndex)?;

        // The iterator yields in ascending distance; only exact ties remain.
        for (entry, d2) in iter {
            if d2 > best_d2 {
                break;
            }
            if entry.id < best.id {
                best = entry;
            }
        }
        Ok(best)
    }
}

fn query_point(lon: f64, lat: f64) -> SpatialResult<[f64; 2]> {
    if !Coord::new(lat, lon).is_finite() {
        return Err(SpatialError::InvalidCoordinate { lat, lon });
    }
    Ok([lat, lon])
}
