//! Strongly typed identifier wrappers.
//!
//! Two families live here:
//!
//! - **Map ids** (`VertexId`, `WayId`) are the `u64` identifiers carried by
//!   the ingested map records.  They are sparse and arbitrary; the graph
//!   never indexes a `Vec` with them.
//! - **Arena indices** (`VertexIdx`, `EdgeIdx`) are dense `u32` positions
//!   assigned when a graph is finalized.  Hot loops (search, adjacency scans)
//!   work exclusively on these.
//!
//! All ids are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.

use std::fmt;

/// Generate a map-id wrapper around a `u64`.
macro_rules! map_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            #[inline(always)]
            fn from(raw: u64) -> $name {
                $name(raw)
            }
        }
    };
}

/// Generate a dense arena index wrapper around a `u32`.
macro_rules! arena_idx {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel meaning "no valid index" (`u32::MAX`).
            pub const INVALID: $name = $name(u32::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized indices are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

map_id! {
    /// Identifier of a map vertex as it appears in the ingested records.
    pub struct VertexId;
}

map_id! {
    /// Identifier of a map way as it appears in the ingested records.
    pub struct WayId;
}

arena_idx! {
    /// Position of a vertex in a finalized graph's arrays.
    ///
    /// Indices are assigned in ascending `VertexId` order, so comparing two
    /// `VertexIdx` values orders the underlying vertices by id as well.
    pub struct VertexIdx;
}

arena_idx! {
    /// Position of a directed half-edge in a finalized graph's CSR arrays.
    pub struct EdgeIdx;
}
