//! `rg-core` — foundational types for the `roadgraph` routing core.
//!
//! This crate is a dependency of every other `rg-*` crate.  It has no `rg-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `VertexId`, `WayId` (map ids), `VertexIdx`, `EdgeIdx` |
//! | [`geo`]     | `Coord`, planar and haversine distance                |
//! | [`config`]  | `RouterConfig`                                        |
//! | [`error`]   | `RgError`, `RgResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::RouterConfig;
pub use error::{RgError, RgResult};
pub use geo::Coord;
pub use ids::{EdgeIdx, VertexId, VertexIdx, WayId};
