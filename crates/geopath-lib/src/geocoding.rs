//! Forward/reverse geocoding and IP-based location lookup.
//!
//! Providers sit behind the [`Geocoder`] and [`IpLocator`] traits so the
//! service and CLI can swap in static implementations for tests. The HTTP
//! implementations use a blocking `reqwest` client; async callers should run
//! them on a blocking thread.

use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::Coordinate;

const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_IP_LOCATOR_URL: &str = "https://ipapi.co/json/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const GEOCODER_URL_ENV: &str = "GEOPATH_GEOCODER_URL";
const IP_LOCATOR_URL_ENV: &str = "GEOPATH_IP_LOCATOR_URL";
const TIMEOUT_ENV: &str = "GEOPATH_HTTP_TIMEOUT_SECS";

const USER_AGENT: &str = concat!("geopath/", env!("CARGO_PKG_VERSION"));

/// A geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Approximate location of the caller derived from their IP address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub lat: f64,
    pub lng: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A location given either as explicit coordinates or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Coordinates(Coordinate),
    Address(String),
}

impl LocationInput {
    /// Interpret `"lat,lng"` as coordinates and anything else as an address.
    pub fn from_text(text: &str) -> Self {
        let parsed = text.split_once(',').and_then(|(lat, lng)| {
            let lat = lat.trim().parse::<f64>().ok()?;
            let lng = lng.trim().parse::<f64>().ok()?;
            Some(Coordinate::new(lat, lng))
        });
        match parsed {
            Some(coordinate) => LocationInput::Coordinates(coordinate),
            None => LocationInput::Address(text.trim().to_string()),
        }
    }
}

/// Address lookup in both directions.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<Place>;

    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Place>;
}

/// Lookup of the caller's approximate position.
pub trait IpLocator: Send + Sync {
    fn current_location(&self) -> Result<IpLocation>;
}

/// Resolve `input` to a validated coordinate, geocoding addresses as needed.
pub fn resolve_location(input: &LocationInput, geocoder: &dyn Geocoder) -> Result<Coordinate> {
    let coordinate = match input {
        LocationInput::Coordinates(coordinate) => *coordinate,
        LocationInput::Address(address) => geocoder.geocode(address)?.coordinate(),
    };
    coordinate.validate()?;
    Ok(coordinate)
}

/// OpenStreetMap Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    timeout: Duration,
}

impl NominatimClient {
    /// Read `GEOPATH_GEOCODER_URL` and `GEOPATH_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let base_url =
            env::var(GEOCODER_URL_ENV).unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string());
        Self {
            base_url,
            timeout: timeout_from_env(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Result<Place> {
        debug!(address, "geocoding address");
        let body = build_client(self.timeout)?
            .get(self.endpoint("search"))
            .header(ACCEPT, "application/json")
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        parse_search_response(address, &body)
    }

    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Place> {
        coordinate.validate()?;
        debug!(%coordinate, "reverse geocoding");
        let lat = coordinate.lat.to_string();
        let lon = coordinate.lng.to_string();
        let body = build_client(self.timeout)?
            .get(self.endpoint("reverse"))
            .header(ACCEPT, "application/json")
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        parse_reverse_response(&body)
    }
}

/// ipapi.co client.
#[derive(Debug, Clone)]
pub struct IpApiClient {
    url: String,
    timeout: Duration,
}

impl IpApiClient {
    /// Read `GEOPATH_IP_LOCATOR_URL` and `GEOPATH_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let url =
            env::var(IP_LOCATOR_URL_ENV).unwrap_or_else(|_| DEFAULT_IP_LOCATOR_URL.to_string());
        Self {
            url,
            timeout: timeout_from_env(),
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl IpLocator for IpApiClient {
    fn current_location(&self) -> Result<IpLocation> {
        let body = build_client(self.timeout)?
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()?
            .error_for_status()?
            .text()?;
        parse_ip_response(&body)
    }
}

// Built per call: a blocking client must not be created or dropped on an
// async runtime thread.
fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(Error::Http)
}

fn timeout_from_env() -> Duration {
    let secs = env::var(TIMEOUT_ENV)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl NominatimPlace {
    fn into_place(self) -> Result<Place> {
        Ok(Place {
            lat: parse_degrees(&self.lat)?,
            lng: parse_degrees(&self.lon)?,
            display_name: self.display_name,
            address: self.address,
        })
    }
}

fn parse_degrees(raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| Error::Geocoding {
        message: format!("provider returned non-numeric coordinate '{raw}'"),
    })
}

fn malformed(err: serde_json::Error) -> Error {
    Error::Geocoding {
        message: format!("unexpected provider response: {err}"),
    }
}

/// Parse a Nominatim `/search` body; an empty array means no match.
pub fn parse_search_response(address: &str, body: &str) -> Result<Place> {
    let results: Vec<NominatimPlace> = serde_json::from_str(body).map_err(malformed)?;
    results
        .into_iter()
        .next()
        .ok_or_else(|| Error::AddressNotFound {
            address: address.to_string(),
        })?
        .into_place()
}

/// Parse a Nominatim `/reverse` body.
pub fn parse_reverse_response(body: &str) -> Result<Place> {
    let value: Value = serde_json::from_str(body).map_err(malformed)?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(Error::Geocoding {
            message: message.to_string(),
        });
    }
    let place: NominatimPlace = serde_json::from_value(value).map_err(malformed)?;
    if let Some(message) = place.error {
        return Err(Error::Geocoding { message });
    }
    place.into_place()
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Parse an ipapi.co `/json/` body.
pub fn parse_ip_response(body: &str) -> Result<IpLocation> {
    let response: IpApiResponse = serde_json::from_str(body).map_err(malformed)?;
    match (response.latitude, response.longitude) {
        (Some(lat), Some(lng)) => Ok(IpLocation {
            lat,
            lng,
            city: response.city,
            country: response.country_name,
        }),
        _ => Err(Error::Geocoding {
            message: response
                .reason
                .unwrap_or_else(|| "location unavailable".to_string()),
        }),
    }
}
