//! Test utilities for microservice handler testing.
//!
//! Provides in-memory geocoding providers and an [`AppState`] built on the
//! reference graph so handler tests never reach the network.

use std::sync::Arc;

use geopath_lib::{
    base_graph, Coordinate, Error as LibError, Geocoder, IpLocation, IpLocator, Place,
    Result as LibResult,
};

use crate::state::AppState;

/// Addresses known to [`StaticGeocoder::with_cities`].
pub mod fixture_places {
    pub const NEW_YORK: (&str, f64, f64) = ("New York", 40.7128, -74.006);
    pub const PHILADELPHIA: (&str, f64, f64) = ("Philadelphia", 39.9526, -75.1652);
    pub const DENVER: (&str, f64, f64) = ("Denver", 39.7392, -104.9903);
    pub const MIAMI: (&str, f64, f64) = ("Miami", 25.7617, -80.1918);

    /// Address that makes [`super::StaticGeocoder`] report a provider failure.
    pub const PROVIDER_DOWN: &str = "provider down";
}

/// Geocoder answering from a fixed table (case-insensitive match).
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: Vec<(String, Coordinate)>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, lat: f64, lng: f64) -> Self {
        self.places.push((name.to_string(), Coordinate::new(lat, lng)));
        self
    }

    /// Geocoder knowing every entry in [`fixture_places`].
    pub fn with_cities() -> Self {
        use fixture_places::*;
        [NEW_YORK, PHILADELPHIA, DENVER, MIAMI]
            .into_iter()
            .fold(Self::new(), |geocoder, (name, lat, lng)| {
                geocoder.with_place(name, lat, lng)
            })
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &str) -> LibResult<Place> {
        if address.eq_ignore_ascii_case(fixture_places::PROVIDER_DOWN) {
            return Err(LibError::Geocoding {
                message: "provider unavailable".to_string(),
            });
        }
        self.places
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(address.trim()))
            .map(|(name, coordinate)| Place {
                lat: coordinate.lat,
                lng: coordinate.lng,
                display_name: Some(name.clone()),
                address: None,
            })
            .ok_or_else(|| LibError::AddressNotFound {
                address: address.to_string(),
            })
    }

    fn reverse_geocode(&self, coordinate: Coordinate) -> LibResult<Place> {
        coordinate.validate()?;
        let nearest = self.places.iter().min_by(|(_, a), (_, b)| {
            a.distance_to(&coordinate)
                .total_cmp(&b.distance_to(&coordinate))
        });
        Ok(Place {
            lat: coordinate.lat,
            lng: coordinate.lng,
            display_name: nearest.map(|(name, _)| name.clone()),
            address: None,
        })
    }
}

/// IP locator returning a fixed location.
#[derive(Debug, Clone)]
pub struct StaticIpLocator(pub IpLocation);

impl Default for StaticIpLocator {
    fn default() -> Self {
        Self(IpLocation {
            lat: fixture_places::DENVER.1,
            lng: fixture_places::DENVER.2,
            city: Some("Denver".to_string()),
            country: Some("United States".to_string()),
        })
    }
}

impl IpLocator for StaticIpLocator {
    fn current_location(&self) -> LibResult<IpLocation> {
        Ok(self.0.clone())
    }
}

/// AppState over the reference graph with static providers.
///
/// # Panics
///
/// Panics if the reference graph cannot be built, which indicates a broken
/// build rather than a test failure.
pub fn test_state() -> AppState {
    let graph = base_graph()
        .unwrap_or_else(|e| panic!("reference graph failed to load: {e}"))
        .clone();
    AppState::from_components(
        graph,
        Arc::new(StaticGeocoder::with_cities()),
        Arc::new(StaticIpLocator::default()),
    )
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", crate::middleware::RequestId::generate())
}
