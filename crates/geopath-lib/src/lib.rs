//! Geographic shortest-path library entry points.
//!
//! This crate models a road network as a weighted graph of coordinates,
//! splices arbitrary start/destination points into it, and searches it with
//! Dijkstra's algorithm or A*. Higher-level consumers (CLI, HTTP service)
//! should only depend on the functions exported here.

#![deny(warnings)]

pub mod dataset;
pub mod error;
pub mod geo;
pub mod geocoding;
pub mod graph;
pub mod path;
pub mod routing;

pub use dataset::{base_graph, city_name};
pub use error::{Error, Result};
pub use geo::{haversine_distance, heuristic, Coordinate, EARTH_RADIUS_KM};
pub use geocoding::{
    resolve_location, Geocoder, IpApiClient, IpLocation, IpLocator, LocationInput,
    NominatimClient, Place,
};
pub use graph::{build_query_graph, Edge, Graph, Node, NodeId};
pub use path::{find_route_a_star, find_route_dijkstra, SearchFailure, SearchResult, Waypoint};
pub use routing::{
    available_algorithms, plan_route, plan_route_on, shortest_path, AlgorithmInfo,
    RouteAlgorithm, RoutePlan, RouteRequest,
};
