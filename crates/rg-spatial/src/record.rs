//! Ingestion records and the CSV ingestion adapter.
//!
//! The graph builder consumes two pulled sequences of
//! `SpatialResult<Record>` values.  Any parser can feed it: the CSV adapter
//! below, an OSM reader living in another crate, or a synthetic `Vec` in a
//! test (`records.into_iter().map(Ok)`).
//!
//! # CSV format
//!
//! Vertices, one per row:
//!
//! ```csv
//! id,lat,lon
//! 53085,37.8719,-122.2585
//! 53086,37.8721,-122.2591
//! ```
//!
//! Ways, one per row.  `vertex_ids` is whitespace-separated; `name` and
//! `max_speed` may be empty:
//!
//! ```csv
//! id,vertex_ids,name,max_speed
//! 9001,53085 53086 53090,Bancroft Way,25 mph
//! ```
//!
//! A row that cannot be read, has a non-numeric id, or carries a non-finite
//! coordinate is yielded as [`SpatialError::MalformedRecord`]; iteration
//! continues with the next row.  An I/O failure of the underlying reader is
//! yielded once as a non-recoverable error and ends the sequence.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use rg_core::{Coord, VertexId, WayId};

use crate::{SpatialError, SpatialResult};

// ── Records ───────────────────────────────────────────────────────────────────

/// A map vertex as emitted by an ingestion source.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VertexRecord {
    pub id: VertexId,
    pub pos: Coord,
}

impl VertexRecord {
    pub fn new(id: u64, lat: f64, lon: f64) -> Self {
        Self { id: VertexId(id), pos: Coord::new(lat, lon) }
    }
}

/// Descriptive tags carried by a way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WayTags {
    pub name: Option<String>,
    pub max_speed: Option<String>,
}

/// An ordered polyline through vertices.  Consecutive ids imply an edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Way {
    pub id: WayId,
    pub vertex_ids: Vec<VertexId>,
    pub tags: WayTags,
}

/// Ways arrive from ingestion in the same shape they are retained in.
pub type WayRecord = Way;

impl Way {
    pub fn new(id: u64, vertex_ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            id: WayId(id),
            vertex_ids: vertex_ids.into_iter().map(VertexId).collect(),
            tags: WayTags::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.tags.name = Some(name.into());
        self
    }

    pub fn with_max_speed(mut self, max_speed: impl Into<String>) -> Self {
        self.tags.max_speed = Some(max_speed.into());
        self
    }

    /// Consecutive vertex pairs, one per implied edge.
    pub fn segments(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.vertex_ids.windows(2).map(|w| (w[0], w[1]))
    }
}

// ── CSV rows ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct VertexRow {
    id:  String,
    lat: String,
    lon: String,
}

#[derive(Deserialize)]
struct WayRow {
    id:         String,
    vertex_ids: String,
    #[serde(default)]
    name:       Option<String>,
    #[serde(default)]
    max_speed:  Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Open a vertex CSV file.  See [`read_vertex_csv`].
pub fn open_vertex_csv(
    path: &Path,
) -> SpatialResult<impl Iterator<Item = SpatialResult<VertexRecord>>> {
    let file = File::open(path)?;
    read_vertex_csv(file)
}

/// Open a way CSV file.  See [`read_way_csv`].
pub fn open_way_csv(path: &Path) -> SpatialResult<impl Iterator<Item = SpatialResult<Way>>> {
    let file = File::open(path)?;
    read_way_csv(file)
}

/// Stream vertex records from any `Read` source.
///
/// Fails up front only if the header row cannot be read.
pub fn read_vertex_csv<R: Read>(
    reader: R,
) -> SpatialResult<impl Iterator<Item = SpatialResult<VertexRecord>>> {
    rows(reader, parse_vertex_row)
}

/// Stream way records from any `Read` source.
pub fn read_way_csv<R: Read>(reader: R) -> SpatialResult<impl Iterator<Item = SpatialResult<Way>>> {
    rows(reader, parse_way_row)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Shared row loop: header handling, per-row deserialization, and fusing on
/// I/O failure.
fn rows<R, Row, T>(
    reader: R,
    parse: fn(Row) -> Result<T, String>,
) -> SpatialResult<impl Iterator<Item = SpatialResult<T>>>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut failed = false;
    let iter = csv_reader.into_records().map_while(move |result| {
        if failed {
            return None;
        }
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => {
                failed = true;
                return Some(Err(SpatialError::Csv(e)));
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                return Some(Err(SpatialError::MalformedRecord { line, reason: e.to_string() }));
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        let parsed = record
            .deserialize::<Row>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(parse)
            .map_err(|reason| SpatialError::MalformedRecord { line, reason });
        Some(parsed)
    });
    Ok(iter)
}

fn parse_vertex_row(row: VertexRow) -> Result<VertexRecord, String> {
    let id = parse_id(&row.id)?;
    let lat = parse_coordinate("lat", &row.lat)?;
    let lon = parse_coordinate("lon", &row.lon)?;
    Ok(VertexRecord { id: VertexId(id), pos: Coord::new(lat, lon) })
}

fn parse_way_row(row: WayRow) -> Result<Way, String> {
    let id = parse_id(&row.id)?;
    let vertex_ids = row
        .vertex_ids
        .split_whitespace()
        .map(|s| parse_id(s).map(VertexId))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Way {
        id: WayId(id),
        vertex_ids,
        tags: WayTags {
            name:      row.name.filter(|s| !s.is_empty()),
            max_speed: row.max_speed.filter(|s| !s.is_empty()),
        },
    })
}

fn parse_id(s: &str) -> Result<u64, String> {
    s.trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid id {s:?}: expected an unsigned integer"))
}

fn parse_coordinate(field: &str, s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(v) => Err(format!("{field} {v} is not finite")),
        Err(_) => Err(format!("invalid {field} {s:?}: expected a number")),
    }
}
