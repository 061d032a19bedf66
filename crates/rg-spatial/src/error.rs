//! Spatial-subsystem error type.
//!
//! Ingestion variants (`MalformedRecord`, `NonFiniteVertex`,
//! `UnknownVertexReference`) are recovered locally by the builder: logged,
//! counted, and skipped.  The remaining variants surface to callers of a finalized graph.

use thiserror::Error;

use rg_core::{RgError, VertexId, WayId};

/// Errors produced by `rg-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("vertex {id} has non-finite coordinate ({lat}, {lon})")]
    NonFiniteVertex { id: VertexId, lat: f64, lon: f64 },

    #[error("{way} references unknown vertex {vertex}")]
    UnknownVertexReference { way: WayId, vertex: VertexId },

    #[error("vertex {0} not found in graph")]
    UnknownVertex(VertexId),

    #[error("query coordinate ({lat}, {lon}) is not finite")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("graph too large: {vertices} vertices, {half_edges} half-edges exceed u32 indexing")]
    GraphTooLarge { vertices: usize, half_edges: usize },

    #[error("spatial index is empty")]
    EmptyIndex,

    #[error("no route from {from} to {to}")]
    NoRouteFound { from: VertexId, to: VertexId },

    #[error("search settled {settled} vertices without reaching the destination")]
    SearchLimitExceeded { settled: usize },

    #[error(transparent)]
    Core(#[from] RgError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SpatialError {
    /// `true` for errors that the build pipeline skips instead of aborting.
    pub fn is_recoverable_ingest(&self) -> bool {
        matches!(
            self,
            SpatialError::MalformedRecord { .. }
                | SpatialError::NonFiniteVertex { .. }
                | SpatialError::UnknownVertexReference { .. }
        )
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
