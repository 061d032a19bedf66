//! Geographic coordinate type and distance functions.
//!
//! Routing works in raw coordinate space: edge weights and the search
//! heuristic are both [`Coord::planar_distance`], the straight-line distance
//! in degrees.  Because the heuristic and the weights share one metric, the
//! triangle inequality makes the heuristic consistent.
//!
//! [`Coord::distance_m`] is only used to report human-scale route lengths.

/// A WGS-84 coordinate stored as double-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `sqrt(Δlat² + Δlon²)` in coordinate units.  Symmetric, and exactly
    /// zero for identical coordinates.
    #[inline]
    pub fn planar_distance(self, other: Coord) -> f64 {
        self.planar_distance_2(other).sqrt()
    }

    /// Squared planar distance; avoids the square root for comparisons.
    #[inline]
    pub fn planar_distance_2(self, other: Coord) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lon = self.lon - other.lon;
        d_lat * d_lat + d_lon * d_lon
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: Coord) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// `true` if both components are finite (no NaN / ±∞).
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
