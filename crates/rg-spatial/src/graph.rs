//! Road graph representation and builder.
//!
//! # Lifecycle
//!
//! [`GraphBuilder`] is the mutable ingestion phase: vertices and ways are
//! added in any order, then [`GraphBuilder::finalize`] consumes the builder,
//! prunes isolated vertices, and produces an immutable [`RoadGraph`].  A
//! graph that was never finalized cannot be queried because the query
//! methods only exist on `RoadGraph`.
//!
//! # Data layout
//!
//! Surviving vertices are renumbered to dense [`VertexIdx`] values in
//! ascending [`VertexId`] order.  Adjacency uses **Compressed Sparse Row
//! (CSR)** format over directed half-edges; every undirected segment is
//! stored once in each direction.  Vertex `v`'s neighbours are
//!
//! ```text
//! edge_to[ out_start[v] .. out_start[v+1] ]
//! ```
//!
//! sorted by target index.  Edge weights are never stored: they are the
//! planar distance between the two endpoint coordinates, recomputed on
//! demand, so they cannot drift from the coordinates.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use rg_core::{Coord, EdgeIdx, VertexId, VertexIdx, WayId};

use crate::record::{VertexRecord, Way};
use crate::{SpatialError, SpatialResult};

// ── BuildReport ───────────────────────────────────────────────────────────────

/// Counters collected while building a graph.  Retained on the finished
/// [`RoadGraph`] and logged once at the end of the build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Vertex records accepted (including overwrites of an existing id).
    pub vertices_ingested: usize,
    /// Way records accepted.
    pub ways_ingested: usize,
    /// Records of either kind skipped as structurally invalid.
    pub malformed_records: usize,
    /// Way segments skipped because an endpoint id was unknown.
    pub unknown_references: usize,
    /// Vertex records whose id had already been added (last write wins).
    pub duplicate_vertices: usize,
    /// Way segments joining a vertex to itself; carry no routing value.
    pub self_loops: usize,
    /// Vertices removed by `finalize` for having no incident edge.
    pub pruned_vertices: usize,
    /// Vertices in the finished graph.
    pub vertex_count: usize,
    /// Undirected edges in the finished graph.
    pub edge_count: usize,
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`finalize`](Self::finalize).
///
/// # Example
///
/// ```
/// use rg_spatial::{GraphBuilder, Way};
///
/// let mut b = GraphBuilder::new();
/// b.add_vertex(1, 37.870, -122.260);
/// b.add_vertex(2, 37.871, -122.260);
/// b.add_vertex(3, 37.900, -122.300); // never on a way
/// b.add_way(Way::new(10, [1, 2]).with_name("Telegraph Avenue"));
/// let graph = b.finalize()?;
/// assert_eq!(graph.vertex_count(), 2); // vertex 3 pruned
/// assert_eq!(graph.edge_count(), 1);
/// # Ok::<(), rg_spatial::SpatialError>(())
/// ```
pub struct GraphBuilder {
    vertices: FxHashMap<VertexId, Coord>,
    /// Undirected segments normalised to `(min, max)`; may contain duplicates
    /// until `finalize`.
    segments: Vec<(VertexId, VertexId)>,
    ways:     Vec<Way>,
    report:   BuildReport,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            vertices: FxHashMap::default(),
            segments: Vec::new(),
            ways:     Vec::new(),
            report:   BuildReport::default(),
        }
    }

    /// Insert a vertex.  A repeated id overwrites the earlier coordinates.
    pub fn add_vertex(&mut self, id: u64, lat: f64, lon: f64) {
        self.add_vertex_record(VertexRecord::new(id, lat, lon));
    }

    /// Insert a vertex from an ingestion record.
    ///
    /// A record with a NaN or infinite coordinate is skipped and counted as
    /// malformed; ways naming it then see an unknown reference.
    pub fn add_vertex_record(&mut self, record: VertexRecord) {
        if !record.pos.is_finite() {
            let err = SpatialError::NonFiniteVertex {
                id:  record.id,
                lat: record.pos.lat,
                lon: record.pos.lon,
            };
            warn!(%err, "skipping record");
            self.report.malformed_records += 1;
            return;
        }
        if let Some(previous) = self.vertices.insert(record.id, record.pos) {
            self.report.duplicate_vertices += 1;
            if previous != record.pos {
                debug!(id = %record.id, old = %previous, new = %record.pos, "vertex coordinates overwritten");
            }
        }
        self.report.vertices_ingested += 1;
    }

    /// Add every consecutive vertex pair of `way` as a symmetric edge.
    ///
    /// A pair naming a vertex that has not been added yet is skipped and
    /// counted as an unknown reference; the rest of the way is still used.
    /// Returns the number of segments accepted.
    pub fn add_way(&mut self, way: Way) -> usize {
        self.report.ways_ingested += 1;
        let mut accepted = 0;

        for (a, b) in way.segments() {
            if a == b {
                self.report.self_loops += 1;
                continue;
            }
            if let Some(missing) = [a, b].into_iter().find(|v| !self.vertices.contains_key(v)) {
                let err = SpatialError::UnknownVertexReference { way: way.id, vertex: missing };
                debug!(%err, "skipping way segment");
                self.report.unknown_references += 1;
                continue;
            }
            self.segments.push((a.min(b), a.max(b)));
            accepted += 1;
        }

        if accepted > 0 {
            self.ways.push(way);
        }
        accepted
    }

    /// Feed one vertex record from an ingestion source.
    ///
    /// Recoverable ingestion errors are logged and counted; anything else
    /// (e.g. the source's reader failing) is returned.
    pub fn ingest_vertex(&mut self, record: SpatialResult<VertexRecord>) -> SpatialResult<()> {
        match record {
            Ok(record) => self.add_vertex_record(record),
            Err(err) => self.skip_record(err)?,
        }
        Ok(())
    }

    /// Feed one way record from an ingestion source.
    pub fn ingest_way(&mut self, record: SpatialResult<Way>) -> SpatialResult<()> {
        match record {
            Ok(way) => {
                self.add_way(way);
            }
            Err(err) => self.skip_record(err)?,
        }
        Ok(())
    }

    fn skip_record(&mut self, err: SpatialError) -> SpatialResult<()> {
        if !err.is_recoverable_ingest() {
            return Err(err);
        }
        warn!(%err, "skipping record");
        self.report.malformed_records += 1;
        Ok(())
    }

    /// Vertices accepted so far, including ones no way has used yet.
    pub fn vertex_count(&self) -> usize { self.vertices.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Removes every vertex without an incident edge.  The remaining graph
    /// has no isolated vertex but may still consist of several components.
    ///
    /// Time complexity: O(E log E) for the segment and half-edge sorts plus
    /// O(V log V) for vertex renumbering.
    ///
    /// # Errors
    ///
    /// [`SpatialError::GraphTooLarge`] if the vertices or half-edges do not
    /// fit the `u32` index space.
    pub fn finalize(self) -> SpatialResult<RoadGraph> {
        let GraphBuilder { vertices, mut segments, ways, mut report } = self;

        // Ways sharing a stretch of road produce the same segment twice.
        segments.sort_unstable();
        segments.dedup();

        // Surviving vertices, renumbered densely in ascending id order.
        let mut ids: Vec<VertexId> = segments.iter().flat_map(|&(a, b)| [a, b]).collect();
        ids.sort_unstable();
        ids.dedup();

        let (vertex_total, half_edge_total) = (ids.len(), segments.len() * 2);
        let too_large = || SpatialError::GraphTooLarge {
            vertices:   vertex_total,
            half_edges: half_edge_total,
        };
        if u32::try_from(half_edge_total).is_err() {
            return Err(too_large());
        }

        let mut index_of: FxHashMap<VertexId, VertexIdx> = FxHashMap::default();
        index_of.reserve(ids.len());
        let mut coords: Vec<Coord> = Vec::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            let idx = VertexIdx::try_from(i).map_err(|_| too_large())?;
            index_of.insert(id, idx);
            // Segments are only accepted between known vertices.
            coords.push(vertices[&id]);
        }

        // Directed half-edges, sorted by (source, target) for CSR.
        let mut half_edges: Vec<(VertexIdx, VertexIdx)> = Vec::with_capacity(segments.len() * 2);
        for &(a, b) in &segments {
            let (ia, ib) = (index_of[&a], index_of[&b]);
            half_edges.push((ia, ib));
            half_edges.push((ib, ia));
        }
        half_edges.sort_unstable();

        let vertex_count = ids.len();
        let mut out_start = vec![0u32; vertex_count + 1];
        for &(from, _) in &half_edges {
            out_start[from.index() + 1] += 1;
        }
        for i in 1..=vertex_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[vertex_count] as usize, half_edges.len());
        let edge_to: Vec<VertexIdx> = half_edges.into_iter().map(|(_, to)| to).collect();

        // Retained ways, one per id (last record wins), sorted for lookup.
        let mut ways = ways;
        ways.reverse();
        let mut seen: FxHashSet<WayId> = FxHashSet::default();
        ways.retain(|w| seen.insert(w.id));
        ways.sort_unstable_by_key(|w| w.id);

        report.pruned_vertices = vertices.len() - vertex_count;
        report.vertex_count = vertex_count;
        report.edge_count = segments.len();

        info!(
            vertices = report.vertex_count,
            edges = report.edge_count,
            pruned = report.pruned_vertices,
            malformed = report.malformed_records,
            unknown_references = report.unknown_references,
            "road graph finalized"
        );

        Ok(RoadGraph { ids, coords, index_of, out_start, edge_to, ways, report })
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a finalized graph from two ingestion streams.
///
/// All vertex records are applied first, then all way records, so a way may
/// appear anywhere in its stream.  Malformed records and unknown references
/// are skipped and counted in [`RoadGraph::build_report`].
///
/// # Errors
///
/// Only non-recoverable source errors (I/O failure of the underlying reader)
/// abort the build.
pub fn build_graph<V, W>(vertices: V, ways: W) -> SpatialResult<RoadGraph>
where
    V: IntoIterator<Item = SpatialResult<VertexRecord>>,
    W: IntoIterator<Item = SpatialResult<Way>>,
{
    let mut builder = GraphBuilder::new();
    for record in vertices {
        builder.ingest_vertex(record)?;
    }
    for record in ways {
        builder.ingest_way(record)?;
    }
    builder.finalize()
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Immutable undirected road graph in CSR form.
///
/// `RoadGraph` is `Send + Sync` and holds no interior mutability, so any
/// number of threads may query it concurrently.
pub struct RoadGraph {
    /// Map id of each vertex.  Indexed by `VertexIdx`; strictly ascending.
    ids: Vec<VertexId>,
    /// Coordinates of each vertex.  Indexed by `VertexIdx`.
    coords: Vec<Coord>,
    index_of: FxHashMap<VertexId, VertexIdx>,

    /// CSR row pointer.  Half-edges of vertex `v` are at EdgeIdx
    /// `out_start[v] .. out_start[v+1]`.  Length = `vertex_count + 1`.
    out_start: Vec<u32>,
    /// Target vertex of each half-edge.
    edge_to: Vec<VertexIdx>,

    /// Ways that contributed at least one edge, sorted by id.
    ways: Vec<Way>,
    report: BuildReport,
}

impl RoadGraph {
    /// A graph with no vertices or edges.
    pub fn empty() -> Self {
        Self {
            ids:       Vec::new(),
            coords:    Vec::new(),
            index_of:  FxHashMap::default(),
            out_start: vec![0],
            edge_to:   Vec::new(),
            ways:      Vec::new(),
            report:    BuildReport::default(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_to.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }

    // ── Id-level queries ──────────────────────────────────────────────────

    pub fn contains(&self, id: VertexId) -> bool {
        self.index_of.contains_key(&id)
    }

    /// All vertex ids in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.ids.iter().copied()
    }

    /// Every vertex with its coordinates, ascending by id.
    pub fn positions(&self) -> impl Iterator<Item = (VertexId, Coord)> + '_ {
        self.ids.iter().copied().zip(self.coords.iter().copied())
    }

    /// Coordinates of vertex `id`.
    pub fn coordinates(&self, id: VertexId) -> SpatialResult<Coord> {
        self.require(id).map(|v| self.coords[v.index()])
    }

    /// `(neighbour, weight)` pairs of vertex `id`, sorted by neighbour id.
    pub fn neighbors(
        &self,
        id: VertexId,
    ) -> SpatialResult<impl Iterator<Item = (VertexId, f64)> + '_> {
        let v = self.require(id)?;
        Ok(self.out_edges(v).map(move |e| {
            let to = self.edge_target(e);
            (self.ids[to.index()], self.weight(v, to))
        }))
    }

    /// Number of distinct neighbours of vertex `id`.
    pub fn degree(&self, id: VertexId) -> SpatialResult<usize> {
        self.require(id).map(|v| self.out_degree(v))
    }

    /// Planar distance between two vertices' coordinates.  Symmetric, and
    /// zero for `a == b`.  The vertices need not be adjacent.
    pub fn distance(&self, a: VertexId, b: VertexId) -> SpatialResult<f64> {
        let (ia, ib) = (self.require(a)?, self.require(b)?);
        Ok(self.weight(ia, ib))
    }

    /// A retained way by id.
    pub fn way(&self, id: WayId) -> Option<&Way> {
        self.ways
            .binary_search_by_key(&id, |w| w.id)
            .ok()
            .map(|i| &self.ways[i])
    }

    /// Retained ways in ascending id order.
    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    fn require(&self, id: VertexId) -> SpatialResult<VertexIdx> {
        self.idx_of(id).ok_or(SpatialError::UnknownVertex(id))
    }

    // ── Index-level access (search hot path) ──────────────────────────────

    #[inline]
    pub fn idx_of(&self, id: VertexId) -> Option<VertexIdx> {
        self.index_of.get(&id).copied()
    }

    #[inline]
    pub fn id_at(&self, v: VertexIdx) -> VertexId {
        self.ids[v.index()]
    }

    #[inline]
    pub fn pos_at(&self, v: VertexIdx) -> Coord {
        self.coords[v.index()]
    }

    /// Iterator over the half-edges leaving `v`.  A contiguous index range,
    /// no heap allocation.
    #[inline]
    pub fn out_edges(&self, v: VertexIdx) -> impl Iterator<Item = EdgeIdx> + use<> {
        let start = self.out_start[v.index()];
        let end   = self.out_start[v.index() + 1];
        (start..end).map(EdgeIdx)
    }

    #[inline]
    pub fn out_degree(&self, v: VertexIdx) -> usize {
        (self.out_start[v.index() + 1] - self.out_start[v.index()]) as usize
    }

    #[inline]
    pub fn edge_target(&self, e: EdgeIdx) -> VertexIdx {
        self.edge_to[e.index()]
    }

    /// Planar distance between two vertices by index; the weight of the
    /// edge between them when they are adjacent.
    #[inline]
    pub fn weight(&self, a: VertexIdx, b: VertexIdx) -> f64 {
        self.coords[a.index()].planar_distance(self.coords[b.index()])
    }
}
