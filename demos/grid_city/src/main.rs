//! grid_city — end-to-end demo of the roadgraph routing core.
//!
//! Generates a synthetic downtown street grid as CSV text (avenues running
//! north–south, streets running east–west, a few blocks closed and one
//! record deliberately corrupt), builds the routing engine from it, and
//! answers a batch of coordinate-to-coordinate route queries.
//!
//! Usage: `grid_city [router-config.json]`
//!
//! Logs go through the default `tracing_subscriber` formatter, which shows
//! info level and above.

use std::fmt::Write as _;
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use rg_core::RouterConfig;
use rg_spatial::{RouteQuery, RoutingEngine, SpatialError, read_vertex_csv, read_way_csv};

// ── Constants ─────────────────────────────────────────────────────────────────

const AVENUES:     u64 = 40;
const STREETS:     u64 = 40;
const ORIGIN_LAT:  f64 = 37.8600;
const ORIGIN_LON:  f64 = -122.2800;
const BLOCK_DEG:   f64 = 0.0010;

// ── Synthetic map ─────────────────────────────────────────────────────────────

fn vertex_id(avenue: u64, street: u64) -> u64 {
    1_000_000 + street * AVENUES + avenue
}

/// Vertex CSV: one intersection per row, plus one corrupt row.
fn vertex_csv() -> Result<String> {
    let mut out = String::from("id,lat,lon\n");
    for s in 0..STREETS {
        for a in 0..AVENUES {
            let lat = ORIGIN_LAT + s as f64 * BLOCK_DEG;
            let lon = ORIGIN_LON + a as f64 * BLOCK_DEG;
            writeln!(out, "{},{lat:.7},{lon:.7}", vertex_id(a, s))?;
        }
    }
    out.push_str("not-a-number,37.9,-122.2\n");
    Ok(out)
}

/// Way CSV: one way per street and avenue.  Every seventh avenue is closed
/// between streets 10 and 20, which forces detours.
fn way_csv() -> Result<String> {
    let mut out = String::from("id,vertex_ids,name,max_speed\n");
    for s in 0..STREETS {
        let ids: Vec<String> = (0..AVENUES).map(|a| vertex_id(a, s).to_string()).collect();
        writeln!(out, "{},{},{} Street,25 mph", 1 + s, ids.join(" "), s + 1)?;
    }
    for a in 0..AVENUES {
        let open = |s: &u64| a % 7 != 3 || !(10..20).contains(s);
        let ids: Vec<String> = (0..STREETS).filter(open).map(|s| vertex_id(a, s).to_string()).collect();
        writeln!(out, "{},{},Avenue {},30 mph", 10_000 + a, ids.join(" "), a + 1)?;
    }
    Ok(out)
}

fn load_config(path: Option<&str>) -> Result<RouterConfig> {
    let Some(path) = path else {
        return Ok(RouterConfig::default());
    };
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading router config {path}"))?;
    let config: RouterConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing router config {path}"))?;
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref())?;

    let t0 = Instant::now();
    let vertices = read_vertex_csv(Cursor::new(vertex_csv()?))?;
    let ways = read_way_csv(Cursor::new(way_csv()?))?;
    let engine = RoutingEngine::build(vertices, ways, config)?;
    let report = engine.graph().build_report();
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "engine ready");

    println!(
        "graph: {} vertices, {} edges ({} malformed records skipped, {} pruned)",
        report.vertex_count, report.edge_count, report.malformed_records, report.pruned_vertices,
    );

    let corner = |a: u64, s: u64| {
        (ORIGIN_LON + a as f64 * BLOCK_DEG, ORIGIN_LAT + s as f64 * BLOCK_DEG)
    };
    let (lon0, lat0) = corner(0, 0);
    let (lon1, lat1) = corner(AVENUES - 1, STREETS - 1);
    let (lon2, lat2) = corner(3, 12);
    let (lon3, lat3) = corner(3, 18);

    let queries = [
        RouteQuery::new(lon0, lat0, lon1, lat1),
        RouteQuery::new(lon2, lat2, lon3, lat3),
        RouteQuery::new(lon0 + 0.0001, lat0, lon0, lat0 + 0.0001),
    ];

    let t1 = Instant::now();
    let results = engine.route_many(&queries);
    info!(queries = queries.len(), elapsed_us = t1.elapsed().as_micros() as u64, "batch routed");

    for (q, result) in queries.iter().zip(results) {
        match result {
            Ok(route) => {
                let metres = route.length_m(engine.graph())?;
                println!(
                    "({:.4}, {:.4}) → ({:.4}, {:.4}): {} vertices, {:.0} m, {} settled",
                    q.start_lat, q.start_lon, q.dest_lat, q.dest_lon,
                    route.vertices.len(), metres, route.settled,
                );
            }
            Err(SpatialError::NoRouteFound { from, to }) => {
                println!("no route between {from} and {to}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_map_skips_only_the_corrupt_row() {
        let vertices = read_vertex_csv(Cursor::new(vertex_csv().unwrap())).unwrap();
        let ways = read_way_csv(Cursor::new(way_csv().unwrap())).unwrap();
        let engine = RoutingEngine::build(vertices, ways, RouterConfig::default()).unwrap();

        let report = engine.graph().build_report();
        assert_eq!(report.malformed_records, 1);
        assert_eq!(report.vertex_count, (AVENUES * STREETS) as usize);
        assert_eq!(report.ways_ingested, (AVENUES + STREETS) as usize);
    }
}
