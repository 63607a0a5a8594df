//! Application state for HTTP microservices.
//!
//! Handlers reach the base road graph and the geocoding providers through
//! this state.

use std::sync::Arc;

use geopath_lib::{
    base_graph, Error as LibError, Geocoder, Graph, IpApiClient, IpLocator, NominatimClient,
};

/// Error during application state initialization.
#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    /// The base graph could not be built.
    #[error("failed to load base graph: {0}")]
    GraphLoad(#[from] LibError),

    /// The base graph has no nodes to attach endpoints to.
    #[error("base graph contains no nodes")]
    EmptyGraph,
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use geopath_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let graph = state.graph();
///     // ... search graph
/// }
///
/// let state = AppState::load().unwrap();
/// let app = Router::new()
///     .route("/api/v1/algorithms", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graph: Graph,
    geocoder: Arc<dyn Geocoder>,
    ip_locator: Arc<dyn IpLocator>,
}

impl AppState {
    /// Build state from the reference graph and environment-configured
    /// geocoding providers.
    pub fn load() -> Result<Self, AppStateError> {
        let graph = base_graph()?.clone();
        if graph.is_empty() {
            return Err(AppStateError::EmptyGraph);
        }

        let geocoder = NominatimClient::from_env();
        tracing::info!(
            nodes = graph.base_len(),
            geocoder = geocoder.base_url(),
            "base graph loaded"
        );

        Ok(Self::from_components(
            graph,
            Arc::new(geocoder),
            Arc::new(IpApiClient::from_env()),
        ))
    }

    /// Create application state from pre-built components.
    ///
    /// This is useful for testing with in-memory providers.
    pub fn from_components(
        graph: Graph,
        geocoder: Arc<dyn Geocoder>,
        ip_locator: Arc<dyn IpLocator>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                graph,
                geocoder,
                ip_locator,
            }),
        }
    }

    /// The immutable base graph. Per-request endpoints go in an overlay.
    pub fn graph(&self) -> &Graph {
        &self.inner.graph
    }

    /// Owned handle to the geocoder, for use on a blocking thread.
    pub fn geocoder(&self) -> Arc<dyn Geocoder> {
        Arc::clone(&self.inner.geocoder)
    }

    pub fn ip_locator(&self) -> Arc<dyn IpLocator> {
        Arc::clone(&self.inner.ip_locator)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("node_count", &self.inner.graph.base_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopath_lib::{Coordinate, IpLocation, Node, Place, Result as LibResult};

    struct Nowhere;

    impl Geocoder for Nowhere {
        fn geocode(&self, address: &str) -> LibResult<Place> {
            Err(LibError::AddressNotFound {
                address: address.to_string(),
            })
        }

        fn reverse_geocode(&self, coordinate: Coordinate) -> LibResult<Place> {
            self.geocode(&coordinate.to_string())
        }
    }

    impl IpLocator for Nowhere {
        fn current_location(&self) -> LibResult<IpLocation> {
            Err(LibError::Geocoding {
                message: "offline".into(),
            })
        }
    }

    fn two_node_graph() -> Graph {
        Graph::new(vec![
            Node::new(1, 0.0, 0.0).with_edge(2, 111.0),
            Node::new(2, 0.0, 1.0),
        ])
        .unwrap()
    }

    fn offline_state() -> AppState {
        AppState::from_components(two_node_graph(), Arc::new(Nowhere), Arc::new(Nowhere))
    }

    #[test]
    fn test_app_state_from_components() {
        let state = offline_state();
        assert_eq!(state.graph().base_len(), 2);
        assert!(state.geocoder().geocode("x").is_err());
        assert!(state.ip_locator().current_location().is_err());
    }

    #[test]
    fn test_app_state_clone_shares_graph() {
        let state1 = offline_state();
        let state2 = state1.clone();
        assert!(state1.graph().shares_base_with(state2.graph()));
    }

    #[test]
    fn test_app_state_debug() {
        let state = offline_state();
        let debug = format!("{:?}", state);
        assert!(debug.contains("AppState"));
        assert!(debug.contains("node_count"));
    }

    #[test]
    fn test_load_uses_reference_graph() {
        let state = AppState::load().unwrap();
        assert_eq!(state.graph().base_len(), 10);
        assert!(state.graph().shares_base_with(base_graph().unwrap()));
    }
}
