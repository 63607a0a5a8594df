//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use geopath_lib::{Coordinate, LocationInput, RouteAlgorithm};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`. The error is boxed to keep `Result` small.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

const ALGORITHM_MESSAGE: &str = "Algorithm must be either \"dijkstra\" or \"astar\"";

/// Body of `POST /api/v1/find-path`.
///
/// Locations are kept as raw JSON until validated so that a malformed shape
/// produces a Problem Details response instead of a bare extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPathRequest {
    /// Address string or `{lat, lng}` object.
    #[serde(default)]
    pub start_location: Option<Value>,

    /// Address string or `{lat, lng}` object.
    #[serde(default)]
    pub destination: Option<Value>,

    /// `"dijkstra"` or `"astar"`, case-insensitive.
    #[serde(default)]
    pub algorithm: Option<String>,
}

impl FindPathRequest {
    /// Parsed start location. Call after [`Validate::validate`].
    pub fn start(&self, request_id: &str) -> Result<LocationInput, Box<ProblemDetails>> {
        parse_location(
            self.start_location.as_ref(),
            "Invalid start location format",
            request_id,
        )
    }

    /// Parsed destination. Call after [`Validate::validate`].
    pub fn destination(&self, request_id: &str) -> Result<LocationInput, Box<ProblemDetails>> {
        parse_location(
            self.destination.as_ref(),
            "Invalid destination format",
            request_id,
        )
    }

    /// Parsed algorithm. Call after [`Validate::validate`].
    pub fn algorithm(&self, request_id: &str) -> Result<RouteAlgorithm, Box<ProblemDetails>> {
        let name = self.algorithm.as_deref().unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(RouteAlgorithm::Dijkstra),
            "astar" => Ok(RouteAlgorithm::AStar),
            _ => Err(Box::new(ProblemDetails::bad_request(
                ALGORITHM_MESSAGE,
                request_id,
            ))),
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

fn parse_location(
    value: Option<&Value>,
    message: &str,
    request_id: &str,
) -> Result<LocationInput, Box<ProblemDetails>> {
    let invalid = || Box::new(ProblemDetails::bad_request(message, request_id));
    let location = value
        .cloned()
        .and_then(|value| serde_json::from_value::<LocationInput>(value).ok())
        .ok_or_else(invalid)?;

    match &location {
        LocationInput::Address(address) if address.trim().is_empty() => Err(invalid()),
        LocationInput::Coordinates(coordinate) if !coordinate.is_valid() => {
            Err(Box::new(ProblemDetails::bad_request(
                format!(
                    "Coordinates ({}, {}) are out of range",
                    coordinate.lat, coordinate.lng
                ),
                request_id,
            )))
        }
        _ => Ok(location),
    }
}

impl Validate for FindPathRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        let algorithm_missing = self
            .algorithm
            .as_deref()
            .is_none_or(|name| name.trim().is_empty());
        if is_blank(self.start_location.as_ref())
            || is_blank(self.destination.as_ref())
            || algorithm_missing
        {
            return Err(Box::new(ProblemDetails::bad_request(
                "Start location, destination, and algorithm are required",
                request_id,
            )));
        }

        self.algorithm(request_id)?;
        self.start(request_id)?;
        self.destination(request_id)?;
        Ok(())
    }
}

/// Body of `POST /api/v1/geocode`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeRequest {
    #[serde(default)]
    pub address: Option<String>,
}

impl GeocodeRequest {
    pub fn address(&self) -> &str {
        self.address.as_deref().map(str::trim).unwrap_or_default()
    }
}

impl Validate for GeocodeRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.address().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "Address is required",
                request_id,
            )));
        }
        Ok(())
    }
}

/// Body of `POST /api/v1/reverse-geocode`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReverseGeocodeRequest {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl ReverseGeocodeRequest {
    /// Coordinate of the request, if both components are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat?, self.lng?))
    }
}

impl Validate for ReverseGeocodeRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        let Some(coordinate) = self.coordinate() else {
            return Err(Box::new(ProblemDetails::bad_request(
                "Latitude and longitude are required",
                request_id,
            )));
        };
        if !coordinate.is_valid() {
            return Err(Box::new(ProblemDetails::bad_request(
                format!(
                    "Coordinates ({}, {}) are out of range",
                    coordinate.lat, coordinate.lng
                ),
                request_id,
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn find_path(body: Value) -> FindPathRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_find_path_accepts_addresses_and_coordinates() {
        let request = find_path(json!({
            "startLocation": "Chicago",
            "destination": {"lat": 29.76, "lng": -95.37},
            "algorithm": "Dijkstra"
        }));
        assert!(request.validate("req").is_ok());
        assert_eq!(
            request.start("req").unwrap(),
            LocationInput::Address("Chicago".to_string())
        );
        assert_eq!(
            request.destination("req").unwrap(),
            LocationInput::Coordinates(Coordinate::new(29.76, -95.37))
        );
        assert_eq!(request.algorithm("req").unwrap(), RouteAlgorithm::Dijkstra);
    }

    #[test]
    fn test_find_path_requires_all_fields() {
        for body in [
            json!({"destination": "Miami", "algorithm": "astar"}),
            json!({"startLocation": "  ", "destination": "Miami", "algorithm": "astar"}),
            json!({"startLocation": "Denver", "destination": "Miami"}),
        ] {
            let problem = find_path(body).validate("req-1").unwrap_err();
            assert_eq!(problem.status, 400);
            assert_eq!(
                problem.detail.as_deref(),
                Some("Start location, destination, and algorithm are required")
            );
        }
    }

    #[test]
    fn test_find_path_rejects_unknown_algorithm() {
        let problem = find_path(json!({
            "startLocation": "Denver",
            "destination": "Miami",
            "algorithm": "bfs"
        }))
        .validate("req")
        .unwrap_err();
        assert_eq!(problem.detail.as_deref(), Some(ALGORITHM_MESSAGE));
    }

    #[test]
    fn test_find_path_rejects_malformed_locations() {
        let problem = find_path(json!({
            "startLocation": {"latitude": 1.0},
            "destination": "Miami",
            "algorithm": "astar"
        }))
        .validate("req")
        .unwrap_err();
        assert_eq!(problem.detail.as_deref(), Some("Invalid start location format"));

        let problem = find_path(json!({
            "startLocation": "Denver",
            "destination": 42,
            "algorithm": "astar"
        }))
        .validate("req")
        .unwrap_err();
        assert_eq!(problem.detail.as_deref(), Some("Invalid destination format"));
    }

    #[test]
    fn test_find_path_rejects_out_of_range_coordinates() {
        let problem = find_path(json!({
            "startLocation": {"lat": 120.0, "lng": 0.0},
            "destination": "Miami",
            "algorithm": "astar"
        }))
        .validate("req")
        .unwrap_err();
        assert!(problem.detail.unwrap().contains("out of range"));
    }

    #[test]
    fn test_geocode_request_validation() {
        assert!(GeocodeRequest::default().validate("req").is_err());
        let blank = GeocodeRequest {
            address: Some("   ".into()),
        };
        assert!(blank.validate("req").is_err());
        let ok = GeocodeRequest {
            address: Some(" Denver ".into()),
        };
        assert!(ok.validate("req").is_ok());
        assert_eq!(ok.address(), "Denver");
    }

    #[test]
    fn test_reverse_geocode_request_validation() {
        let missing = ReverseGeocodeRequest {
            lat: Some(1.0),
            lng: None,
        };
        assert_eq!(
            missing.validate("req").unwrap_err().detail.as_deref(),
            Some("Latitude and longitude are required")
        );

        let out_of_range = ReverseGeocodeRequest {
            lat: Some(10.0),
            lng: Some(200.0),
        };
        assert!(out_of_range.validate("req").is_err());

        let ok = ReverseGeocodeRequest {
            lat: Some(0.0),
            lng: Some(0.0),
        };
        assert!(ok.validate("req").is_ok());
    }
}
