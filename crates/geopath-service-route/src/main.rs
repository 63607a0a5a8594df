//! geopath path finding HTTP microservice.
//!
//! Computes shortest paths between arbitrary coordinates or addresses over
//! the built-in road network, and exposes the geocoding helpers the web
//! client needs.
//!
//! # Endpoints
//!
//! - `GET /` - Service banner
//! - `POST /api/v1/find-path` - Shortest path between two locations
//! - `GET /api/v1/algorithms` - Supported algorithms
//! - `POST /api/v1/geocode` - Address to coordinates
//! - `POST /api/v1/reverse-geocode` - Coordinates to address
//! - `GET /api/v1/current-location` - Approximate caller location from IP
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED`, `METRICS_PATH` - Prometheus endpoint
//! - `GEOPATH_GEOCODER_URL`, `GEOPATH_IP_LOCATOR_URL`,
//!   `GEOPATH_HTTP_TIMEOUT_SECS` - Geocoding providers

use std::env;
use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use geopath_lib::{
    AlgorithmInfo, Coordinate, IpLocation, LocationInput, Place, RouteRequest,
    Waypoint, available_algorithms, plan_route_on, resolve_location,
};
use geopath_service_shared::{
    AppState, FindPathRequest, GeocodeRequest, LoggingConfig, MetricsConfig, ProblemDetails,
    ReverseGeocodeRequest, ServiceResponse, Validate, extract_or_generate_request_id,
    failure_reason, from_lib_error, health_live, health_ready, init_logging, init_metrics,
    metrics_handler, propagate_request_id, record_geocode_request, record_path_distance,
    record_path_failed, record_path_found,
};

/// Path response returned to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindPathResponse {
    path: Vec<Waypoint>,
    /// Total distance in kilometres, attachment legs included.
    distance: f64,
    /// "Dijkstra" or "A*".
    algorithm: &'static str,
    start_location: Coordinate,
    destination: Coordinate,
    units: &'static str,
    nodes_settled: usize,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug)]
enum Response<T> {
    Success(ServiceResponse<T>),
    Error(Box<ProblemDetails>),
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Response::Error(problem) => (*problem).into_response(),
        }
    }
}

impl<T> From<Result<T, Box<ProblemDetails>>> for Response<T> {
    fn from(result: Result<T, Box<ProblemDetails>>) -> Self {
        match result {
            Ok(data) => Response::Success(ServiceResponse::new(data)),
            Err(problem) => Response::Error(problem),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("route");
    init_logging(&logging_config)?;

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        // Metrics are optional.
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(
        service = logging_config.service_name(),
        port = port,
        "starting route service"
    );

    let state = AppState::load().map_err(|e| {
        error!(error = %e, "failed to load application state");
        e
    })?;

    let app = app(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all routes and layers.
fn app(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/v1/find-path", post(find_path_handler))
        .route("/api/v1/algorithms", get(algorithms_handler))
        .route("/api/v1/geocode", post(geocode_handler))
        .route("/api/v1/reverse-geocode", post(reverse_geocode_handler))
        .route("/api/v1/current-location", get(current_location_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(propagate_request_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle GET / with a short service description.
async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "geopath API is running",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "findPath": "/api/v1/find-path",
            "algorithms": "/api/v1/algorithms",
            "geocode": "/api/v1/geocode",
            "reverseGeocode": "/api/v1/reverse-geocode",
            "currentLocation": "/api/v1/current-location",
        },
    }))
}

/// Handle POST /api/v1/find-path requests.
async fn find_path_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<FindPathRequest>, JsonRejection>,
) -> Response<FindPathResponse> {
    let request_id = extract_or_generate_request_id(&headers);
    find_path(&state, request_id.as_str(), payload).await.into()
}

async fn find_path(
    state: &AppState,
    request_id: &str,
    payload: Result<Json<FindPathRequest>, JsonRejection>,
) -> Result<FindPathResponse, Box<ProblemDetails>> {
    let Json(request) = payload.map_err(|rejection| {
        record_path_failed("validation_error");
        rejection_problem(&rejection, request_id)
    })?;

    info!(
        request_id,
        algorithm = ?request.algorithm,
        "handling find-path request"
    );

    if let Err(problem) = request.validate(request_id) {
        record_path_failed("validation_error");
        return Err(problem);
    }
    let algorithm = request.algorithm(request_id)?;
    let start = request.start(request_id)?;
    let destination = request.destination(request_id)?;

    let (start, destination) = resolve_endpoints(state, start, destination, request_id).await?;
    let plan = plan_route_on(
        state.graph(),
        &RouteRequest::new(start, destination, algorithm),
    )
    .map_err(|e| {
        warn!(request_id, error = %e, "path finding failed");
        record_path_failed(failure_reason(&e));
        Box::new(from_lib_error(&e, request_id))
    })?;

    record_path_found(plan.algorithm);
    record_path_distance(plan.distance, plan.algorithm);
    info!(
        request_id,
        algorithm = %plan.algorithm,
        hops = plan.hop_count(),
        distance_km = plan.distance,
        settled = plan.nodes_settled,
        "path computed successfully"
    );

    Ok(FindPathResponse {
        algorithm: plan.algorithm.label(),
        distance: plan.distance,
        start_location: plan.start,
        destination: plan.destination,
        units: plan.units,
        nodes_settled: plan.nodes_settled,
        path: plan.path,
    })
}

/// Geocode address inputs on the blocking pool; coordinates pass through.
async fn resolve_endpoints(
    state: &AppState,
    start: LocationInput,
    destination: LocationInput,
    request_id: &str,
) -> Result<(Coordinate, Coordinate), Box<ProblemDetails>> {
    let needs_geocoding = matches!(start, LocationInput::Address(_))
        || matches!(destination, LocationInput::Address(_));
    let geocoder = state.geocoder();

    let resolved = tokio::task::spawn_blocking(move || {
        let start = resolve_location(&start, geocoder.as_ref())?;
        let destination = resolve_location(&destination, geocoder.as_ref())?;
        Ok::<_, geopath_lib::Error>((start, destination))
    })
    .await
    .map_err(|e| {
        error!(request_id, error = %e, "geocoding task panicked");
        Box::new(ProblemDetails::internal_error(
            "Location resolution was interrupted",
            request_id,
        ))
    })?;

    if needs_geocoding {
        let outcome = if resolved.is_ok() { "ok" } else { "error" };
        record_geocode_request("forward", outcome);
    }

    resolved.map_err(|e| {
        warn!(request_id, error = %e, "location resolution failed");
        record_path_failed(failure_reason(&e));
        Box::new(from_lib_error(&e, request_id))
    })
}

/// Handle GET /api/v1/algorithms.
async fn algorithms_handler() -> Response<Vec<AlgorithmInfo>> {
    Response::Success(ServiceResponse::new(available_algorithms()))
}

/// Handle POST /api/v1/geocode.
async fn geocode_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GeocodeRequest>, JsonRejection>,
) -> Response<Place> {
    let request_id = extract_or_generate_request_id(&headers);
    geocode(&state, request_id.as_str(), payload).await.into()
}

async fn geocode(
    state: &AppState,
    request_id: &str,
    payload: Result<Json<GeocodeRequest>, JsonRejection>,
) -> Result<Place, Box<ProblemDetails>> {
    let Json(request) = payload.map_err(|r| rejection_problem(&r, request_id))?;
    request.validate(request_id)?;

    let address = request.address().to_string();
    debug!(request_id, %address, "geocoding address");
    let geocoder = state.geocoder();
    let place = run_blocking(request_id, move || geocoder.geocode(&address)).await?;
    record_lookup("forward", place, request_id)
}

/// Handle POST /api/v1/reverse-geocode.
async fn reverse_geocode_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ReverseGeocodeRequest>, JsonRejection>,
) -> Response<Place> {
    let request_id = extract_or_generate_request_id(&headers);
    reverse_geocode(&state, request_id.as_str(), payload)
        .await
        .into()
}

async fn reverse_geocode(
    state: &AppState,
    request_id: &str,
    payload: Result<Json<ReverseGeocodeRequest>, JsonRejection>,
) -> Result<Place, Box<ProblemDetails>> {
    let Json(request) = payload.map_err(|r| rejection_problem(&r, request_id))?;
    request.validate(request_id)?;
    let Some(coordinate) = request.coordinate() else {
        return Err(Box::new(ProblemDetails::bad_request(
            "Latitude and longitude are required",
            request_id,
        )));
    };

    let geocoder = state.geocoder();
    let place = run_blocking(request_id, move || geocoder.reverse_geocode(coordinate)).await?;
    record_lookup("reverse", place, request_id)
}

/// Handle GET /api/v1/current-location.
async fn current_location_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response<IpLocation> {
    let request_id = extract_or_generate_request_id(&headers);
    let locator = state.ip_locator();
    let result = match run_blocking(request_id.as_str(), move || locator.current_location()).await
    {
        Ok(location) => record_lookup("ip", location, request_id.as_str()),
        Err(problem) => Err(problem),
    };
    result.into()
}

/// Run a blocking provider call off the async workers.
async fn run_blocking<T, F>(
    request_id: &str,
    call: F,
) -> Result<geopath_lib::Result<T>, Box<ProblemDetails>>
where
    T: Send + 'static,
    F: FnOnce() -> geopath_lib::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(call).await.map_err(|e| {
        error!(request_id, error = %e, "geocoding task panicked");
        Box::new(ProblemDetails::internal_error(
            "Geocoding task was interrupted",
            request_id,
        ))
    })
}

fn record_lookup<T>(
    kind: &'static str,
    result: geopath_lib::Result<T>,
    request_id: &str,
) -> Result<T, Box<ProblemDetails>> {
    match result {
        Ok(value) => {
            record_geocode_request(kind, "ok");
            Ok(value)
        }
        Err(e) => {
            warn!(request_id, kind, error = %e, "geocoding request failed");
            record_geocode_request(kind, "error");
            Err(Box::new(from_lib_error(&e, request_id)))
        }
    }
}

fn rejection_problem(rejection: &JsonRejection, request_id: &str) -> Box<ProblemDetails> {
    Box::new(ProblemDetails::bad_request(rejection.body_text(), request_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use geopath_service_shared::test_utils::{fixture_places, test_state};
    use geopath_service_shared::{
        PROBLEM_ADDRESS_NOT_FOUND, PROBLEM_GEOCODING_FAILED, PROBLEM_INVALID_REQUEST,
    };

    fn server() -> TestServer {
        TestServer::new(app(test_state(), "/metrics")).unwrap()
    }

    fn ids(body: &Value) -> Vec<Value> {
        body["data"]["path"]
            .as_array()
            .unwrap()
            .iter()
            .map(|waypoint| waypoint["id"].clone())
            .collect()
    }

    #[tokio::test]
    async fn find_path_with_coordinates() {
        let (_, ny_lat, ny_lng) = fixture_places::NEW_YORK;
        let (_, ph_lat, ph_lng) = fixture_places::PHILADELPHIA;

        for (algorithm, label) in [("dijkstra", "Dijkstra"), ("astar", "A*")] {
            let response = server()
                .post("/api/v1/find-path")
                .json(&json!({
                    "startLocation": {"lat": ny_lat, "lng": ny_lng},
                    "destination": {"lat": ph_lat, "lng": ph_lng},
                    "algorithm": algorithm,
                }))
                .await;

            response.assert_status_ok();
            let body = response.json::<Value>();
            assert_eq!(body["success"], true);
            assert_eq!(body["data"]["algorithm"], label);
            assert_eq!(body["data"]["distance"], 97.0);
            assert_eq!(body["data"]["units"], "kilometers");
            assert_eq!(
                ids(&body),
                vec![json!("start"), json!(1), json!(6), json!("destination")]
            );
            assert_eq!(body["data"]["startLocation"]["lat"], ny_lat);
        }
    }

    #[tokio::test]
    async fn find_path_geocodes_addresses() {
        let response = server()
            .post("/api/v1/find-path")
            .json(&json!({
                "startLocation": "Denver",
                "destination": "miami",
                "algorithm": "ASTAR",
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        let path = ids(&body);
        assert_eq!(path.first(), Some(&json!("start")));
        assert_eq!(path.get(1), Some(&json!(9)));
        assert_eq!(path.last(), Some(&json!("destination")));
    }

    #[tokio::test]
    async fn find_path_rejects_missing_fields() {
        let response = server()
            .post("/api/v1/find-path")
            .json(&json!({"startLocation": "Denver"}))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["type"], PROBLEM_INVALID_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["detail"],
            "Start location, destination, and algorithm are required"
        );
    }

    #[tokio::test]
    async fn find_path_rejects_unknown_algorithm() {
        let response = server()
            .post("/api/v1/find-path")
            .json(&json!({
                "startLocation": "Denver",
                "destination": "Miami",
                "algorithm": "bfs",
            }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["detail"],
            "Algorithm must be either \"dijkstra\" or \"astar\""
        );
    }

    #[tokio::test]
    async fn find_path_rejects_non_json_body() {
        let response = server()
            .post("/api/v1/find-path")
            .text("not json")
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["type"], PROBLEM_INVALID_REQUEST);
    }

    #[tokio::test]
    async fn find_path_unknown_address_is_not_found() {
        let response = server()
            .post("/api/v1/find-path")
            .json(&json!({
                "startLocation": "Atlantis",
                "destination": "Miami",
                "algorithm": "dijkstra",
            }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["type"], PROBLEM_ADDRESS_NOT_FOUND);
    }

    #[tokio::test]
    async fn geocode_returns_place() {
        let response = server()
            .post("/api/v1/geocode")
            .json(&json!({"address": "Philadelphia"}))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"]["lat"], fixture_places::PHILADELPHIA.1);
        assert_eq!(body["data"]["displayName"], "Philadelphia");
    }

    #[tokio::test]
    async fn geocode_requires_address() {
        let response = server()
            .post("/api/v1/geocode")
            .json(&json!({}))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["detail"], "Address is required");
    }

    #[tokio::test]
    async fn geocode_provider_failure_is_bad_gateway() {
        let response = server()
            .post("/api/v1/geocode")
            .json(&json!({"address": fixture_places::PROVIDER_DOWN}))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        assert_eq!(response.json::<Value>()["type"], PROBLEM_GEOCODING_FAILED);
    }

    #[tokio::test]
    async fn reverse_geocode_names_nearest_place() {
        let response = server()
            .post("/api/v1/reverse-geocode")
            .json(&json!({"lat": 40.7, "lng": -74.0}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["displayName"], "New York");
    }

    #[tokio::test]
    async fn reverse_geocode_requires_both_components() {
        let response = server()
            .post("/api/v1/reverse-geocode")
            .json(&json!({"lat": 40.7}))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn current_location_uses_ip_locator() {
        let response = server().get("/api/v1/current-location").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"]["city"], "Denver");
        assert_eq!(body["data"]["country"], "United States");
    }

    #[tokio::test]
    async fn algorithms_lists_catalogue() {
        let response = server().get("/api/v1/algorithms").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"][0]["id"], "dijkstra");
        assert_eq!(body["data"][1]["id"], "astar");
        assert_eq!(body["data"][1]["name"], "A* Algorithm");
    }

    #[tokio::test]
    async fn root_and_health_endpoints() {
        let server = server();

        let root = server.get("/").await;
        root.assert_status_ok();
        assert_eq!(
            root.json::<Value>()["endpoints"]["findPath"],
            "/api/v1/find-path"
        );

        server.get("/health/live").await.assert_status_ok();
        let ready = server.get("/health/ready").await;
        ready.assert_status_ok();
        assert_eq!(ready.json::<Value>()["nodes_loaded"], 10);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let response = server()
            .get("/api/v1/algorithms")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-42"),
            )
            .await;
        assert_eq!(response.header("x-request-id"), "req-42");
    }

    #[tokio::test]
    async fn request_id_flows_into_problem_instance() {
        let response = server()
            .post("/api/v1/geocode")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-7"),
            )
            .json(&json!({"address": ""}))
            .expect_failure()
            .await;
        assert_eq!(response.json::<Value>()["instance"], "req-7");
    }
}
