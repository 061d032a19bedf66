//! `rg-spatial` — road graph, nearest-vertex index, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`record`]  | `VertexRecord`, `Way`, CSV ingestion adapter                |
//! | [`graph`]   | `GraphBuilder`, `RoadGraph` (CSR), `build_graph`            |
//! | [`index`]   | `SpatialIndex` (R-tree nearest vertex)                      |
//! | [`router`]  | `Router` trait, `Route`, `AStarRouter`, `DijkstraRouter`    |
//! | [`engine`]  | `RoutingEngine` query facade, `RouteQuery`                  |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Pipeline
//!
//! ```text
//! records ──► GraphBuilder ──finalize──► RoadGraph ──► SpatialIndex
//!                                            │              │
//!                                            └──► Router ◄──┘
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | `RoutingEngine::route_many` runs on Rayon.                |
//! | `serde`    | Derives `Serialize` on records and core types.            |

pub mod engine;
pub mod error;
pub mod graph;
pub mod index;
pub mod record;
pub mod router;


pub use engine::{RouteQuery, RoutingEngine};
pub use error::{SpatialError, SpatialResult};
pub use graph::{BuildReport, GraphBuilder, RoadGraph, build_graph};
pub use index::SpatialIndex;
pub use record::{
    VertexRecord, Way, WayRecord, WayTags, open_vertex_csv, open_way_csv, read_vertex_csv,
    read_way_csv,
};
pub use router::{AStarRouter, DijkstraRouter, Route, Router};
