//! Router configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and handed to the routing engine at construction.

use crate::{RgError, RgResult};

/// Tuning knobs for shortest-path queries.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Upper bound on vertices settled by a single query.  `None` searches
    /// until the frontier is exhausted.  Queries that hit the bound fail with
    /// a search-limit error rather than returning a partial path.
    pub max_settled_vertices: Option<usize>,

    /// Multiplier applied to the straight-line heuristic.  1.0 keeps routes
    /// optimal; larger values settle fewer vertices but may return longer
    /// routes; 0.0 degrades to plain Dijkstra.
    pub heuristic_weight: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_settled_vertices: None,
            heuristic_weight: 1.0,
        }
    }
}

impl RouterConfig {
    /// Reject values the search cannot honour.
    pub fn validate(&self) -> RgResult<()> {
        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 0.0 {
            return Err(RgError::Config(format!(
                "heuristic_weight must be finite and >= 0, got {}",
                self.heuristic_weight
            )));
        }
        if self.max_settled_vertices == Some(0) {
            return Err(RgError::Config(
                "max_settled_vertices must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }

    /// `true` if routes are guaranteed to be shortest paths.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.heuristic_weight <= 1.0
    }
}
