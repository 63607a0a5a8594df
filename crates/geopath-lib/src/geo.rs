//! Great-circle distance on a spherical Earth.
//!
//! The same haversine function provides edge weights for synthetic endpoint
//! attachments and the A* heuristic. Straight-line distance never exceeds the
//! length of a route along the surface, which keeps the heuristic admissible
//! and consistent for graphs whose weights are physical distances.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside the geographic range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Reject coordinates that would poison distance computations with NaN or
    /// out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lng)
    }
}

/// Haversine distance between two points, in kilometres.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push near-antipodal points just past 1.
    let a = a.min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// A* estimate of the remaining cost from `from` to `goal`.
pub fn heuristic(from: &Coordinate, goal: &Coordinate) -> f64 {
    from.distance_to(goal)
}
