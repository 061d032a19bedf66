//! Routing trait and best-first shortest-path search.
//!
//! # Algorithm
//!
//! [`AStarRouter`] runs A* over the CSR graph.  The frontier is ordered by
//! `f = g + h`, where `g` is the accumulated edge weight from the start and
//! `h` is the planar distance to the destination.  Every edge weight is
//! itself a planar distance, so by the triangle inequality `h` never
//! overestimates and never drops by more than an edge's weight: it is
//! admissible and consistent.  A vertex is therefore final the first time it
//! is popped, and each vertex is settled at most once.
//!
//! Frontier ties are broken by smaller `g`, then by smaller vertex id, so the
//! returned path is deterministic.
//!
//! [`DijkstraRouter`] is the same search with `h = 0`.
//!
//! # Per-query state
//!
//! Each query allocates its own `best_g`, predecessor, and settled arrays;
//! routers hold only configuration, so one router can serve any number of
//! threads against the same immutable graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use rg_core::{RouterConfig, VertexId, VertexIdx};

use crate::graph::RoadGraph;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the vertices to visit in order, from the
/// start vertex to the destination vertex inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub vertices: Vec<VertexId>,
    /// Sum of edge weights along `vertices`, in coordinate units.
    pub total_weight: f64,
    /// Vertices settled by the search that produced this route.
    pub settled: usize,
}

impl Route {
    /// Zero-length route that starts and ends at `at`.
    pub fn trivial(at: VertexId) -> Self {
        Self { vertices: vec![at], total_weight: 0.0, settled: 0 }
    }

    /// `true` if the start and destination are the same vertex.
    pub fn is_trivial(&self) -> bool {
        self.vertices.len() <= 1
    }

    pub fn start(&self) -> Option<VertexId> {
        self.vertices.first().copied()
    }

    pub fn destination(&self) -> Option<VertexId> {
        self.vertices.last().copied()
    }

    /// Great-circle length of the route in metres.
    pub fn length_m(&self, graph: &RoadGraph) -> SpatialResult<f64> {
        let mut total = 0.0;
        for pair in self.vertices.windows(2) {
            total += graph.coordinates(pair[0])?.distance_m(graph.coordinates(pair[1])?);
        }
        Ok(total)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single router can be shared
/// across Rayon workers answering queries in parallel.
pub trait Router: Send + Sync {
    /// Compute a route from vertex `from` to vertex `to`.
    ///
    /// `from == to` yields a one-vertex route.  Vertices in different
    /// components yield [`SpatialError::NoRouteFound`].
    fn route(&self, graph: &RoadGraph, from: VertexId, to: VertexId) -> SpatialResult<Route>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// A* with a straight-line heuristic.
#[derive(Clone, Debug, Default)]
pub struct AStarRouter {
    config: RouterConfig,
}

impl AStarRouter {
    /// # Errors
    ///
    /// Returns the config's validation error if it cannot be honoured.
    pub fn new(config: RouterConfig) -> SpatialResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

impl Router for AStarRouter {
    fn route(&self, graph: &RoadGraph, from: VertexId, to: VertexId) -> SpatialResult<Route> {
        let (from, to) = resolve(graph, from, to)?;
        best_first(
            graph,
            from,
            to,
            self.config.heuristic_weight,
            self.config.max_settled_vertices,
        )
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Uninformed uniform-cost search: A* with `h = 0` and no settle bound.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, from: VertexId, to: VertexId) -> SpatialResult<Route> {
        let (from, to) = resolve(graph, from, to)?;
        best_first(graph, from, to, 0.0, None)
    }
}

// ── Search internals ──────────────────────────────────────────────────────────

fn resolve(graph: &RoadGraph, from: VertexId, to: VertexId) -> SpatialResult<(VertexIdx, VertexIdx)> {
    let f = graph.idx_of(from).ok_or(SpatialError::UnknownVertex(from))?;
    let t = graph.idx_of(to).ok_or(SpatialError::UnknownVertex(to))?;
    Ok((f, t))
}

/// Frontier entry.  `Ord` is reversed so `BinaryHeap` (a max-heap) pops the
/// smallest `f`, then smallest `g`, then smallest index.  Indices follow id
/// order, so the last key is the smallest vertex id.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    f: f64,
    g: f64,
    v: VertexIdx,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| other.v.cmp(&self.v))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

pub(crate) fn best_first(
    graph: &RoadGraph,
    from: VertexIdx,
    to: VertexIdx,
    heuristic_weight: f64,
    max_settled: Option<usize>,
) -> SpatialResult<Route> {
    best_first_observed(graph, from, to, heuristic_weight, max_settled, |_| {})
}

/// [`best_first`] that reports every settled vertex to `on_settle`, in
/// settle order.
pub(crate) fn best_first_observed(
    graph: &RoadGraph,
    from: VertexIdx,
    to: VertexIdx,
    heuristic_weight: f64,
    max_settled: Option<usize>,
    mut on_settle: impl FnMut(VertexIdx),
) -> SpatialResult<Route> {
    if from == to {
        return Ok(Route::trivial(graph.id_at(from)));
    }

    let goal = graph.pos_at(to);
    let h = |v: VertexIdx| heuristic_weight * graph.pos_at(v).planar_distance(goal);

    let n = graph.vertex_count();
    // best_g[v] = cheapest known cost from `from` to v.
    let mut best_g  = vec![f64::INFINITY; n];
    // prev[v] = vertex that reached v on that cheapest path.
    let mut prev    = vec![VertexIdx::INVALID; n];
    let mut settled = vec![false; n];
    let mut settled_count = 0usize;

    best_g[from.index()] = 0.0;
    let mut heap: BinaryHeap<Frontier> = BinaryHeap::new();
    heap.push(Frontier { f: h(from), g: 0.0, v: from });

    while let Some(Frontier { g, v, .. }) = heap.pop() {
        // Stale entry: v was settled or improved after this push.
        if settled[v.index()] || g > best_g[v.index()] {
            continue;
        }
        settled[v.index()] = true;
        settled_count += 1;
        on_settle(v);

        if v == to {
            let route = reconstruct(graph, &prev, to, g, settled_count);
            debug!(
                from = %graph.id_at(from),
                to = %graph.id_at(to),
                hops = route.vertices.len() - 1,
                weight = route.total_weight,
                settled = settled_count,
                "route found"
            );
            return Ok(route);
        }

        if let Some(limit) = max_settled {
            if settled_count >= limit {
                debug!(settled = settled_count, limit, "search limit reached");
                return Err(SpatialError::SearchLimitExceeded { settled: settled_count });
            }
        }

        for edge in graph.out_edges(v) {
            let w = graph.edge_target(edge);
            if settled[w.index()] {
                continue;
            }
            let new_g = g + graph.weight(v, w);
            if new_g < best_g[w.index()] {
                best_g[w.index()] = new_g;
                prev[w.index()] = v;
                heap.push(Frontier { f: new_g + h(w), g: new_g, v: w });
            }
        }
    }

    debug!(settled = settled_count, "frontier exhausted");
    Err(SpatialError::NoRouteFound { from: graph.id_at(from), to: graph.id_at(to) })
}

fn reconstruct(
    graph: &RoadGraph,
    prev: &[VertexIdx],
    to: VertexIdx,
    total_weight: f64,
    settled: usize,
) -> Route {
    let mut vertices = vec![graph.id_at(to)];
    let mut cur = to;
    while prev[cur.index()] != VertexIdx::INVALID {
        cur = prev[cur.index()];
        vertices.push(graph.id_at(cur));
    }
    vertices.reverse();
    Route { vertices, total_weight, settled }
}
