//! Query facade over a finalized graph and its spatial index.
//!
//! [`RoutingEngine`] owns the three pieces downstream collaborators need (a
//! routing HTTP layer, a tile renderer drawing the returned path) and exposes
//! them through coordinate-based entry points.  It is immutable after
//! construction; wrap it in an `Arc` to share it across threads.

use tracing::info;

use rg_core::{Coord, RouterConfig, VertexId};

use crate::graph::{RoadGraph, build_graph};
use crate::index::SpatialIndex;
use crate::record::{VertexRecord, Way};
use crate::router::{AStarRouter, Route, Router};
use crate::SpatialResult;

/// One coordinate-to-coordinate route request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouteQuery {
    pub start_lon: f64,
    pub start_lat: f64,
    pub dest_lon:  f64,
    pub dest_lat:  f64,
}

impl RouteQuery {
    pub fn new(start_lon: f64, start_lat: f64, dest_lon: f64, dest_lat: f64) -> Self {
        Self { start_lon, start_lat, dest_lon, dest_lat }
    }
}

/// Graph + spatial index + router, built once and queried many times.
pub struct RoutingEngine {
    graph:  RoadGraph,
    index:  SpatialIndex,
    router: AStarRouter,
}

impl RoutingEngine {
    /// Index `graph` and attach a router configured by `config`.
    pub fn new(graph: RoadGraph, config: RouterConfig) -> SpatialResult<Self> {
        let router = AStarRouter::new(config)?;
        let index = SpatialIndex::build(&graph);
        info!(vertices = index.len(), "spatial index built");
        Ok(Self { graph, index, router })
    }

    /// Run the whole pipeline: ingest both streams, finalize, index.
    pub fn build<V, W>(vertices: V, ways: W, config: RouterConfig) -> SpatialResult<Self>
    where
        V: IntoIterator<Item = SpatialResult<VertexRecord>>,
        W: IntoIterator<Item = SpatialResult<Way>>,
    {
        Self::new(build_graph(vertices, ways)?, config)
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn config(&self) -> &RouterConfig {
        self.router.config()
    }

    /// Id of the graph vertex closest to `(lon, lat)`.
    pub fn nearest_vertex(&self, lon: f64, lat: f64) -> SpatialResult<VertexId> {
        self.index.nearest(lon, lat)
    }

    /// Shortest route between the vertices nearest to the two coordinates.
    ///
    /// If both coordinates snap to the same vertex the route has one vertex
    /// and zero weight.  Coordinates in disconnected parts of the network
    /// yield [`SpatialError::NoRouteFound`](crate::SpatialError::NoRouteFound).
    pub fn route(
        &self,
        start_lon: f64,
        start_lat: f64,
        dest_lon: f64,
        dest_lat: f64,
    ) -> SpatialResult<Route> {
        let from = self.index.nearest(start_lon, start_lat)?;
        let to = self.index.nearest(dest_lon, dest_lat)?;
        self.router.route(&self.graph, from, to)
    }

    /// Coordinates of a vertex, e.g. one returned in a [`Route`].
    pub fn vertex_coordinates(&self, id: VertexId) -> SpatialResult<Coord> {
        self.graph.coordinates(id)
    }

    /// Answer several queries; results are in input order.
    ///
    /// With the `parallel` feature the queries run on Rayon's pool.
    pub fn route_many(&self, queries: &[RouteQuery]) -> Vec<SpatialResult<Route>> {
        let run = |q: &RouteQuery| self.route(q.start_lon, q.start_lat, q.dest_lon, q.dest_lat);

        #[cfg(not(feature = "parallel"))]
        {
            queries.iter().map(run).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            queries.par_iter().map(run).collect()
        }
    }
}
