//! Route planning between arbitrary coordinates.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported search algorithms (Dijkstra, A*)
//! - [`RouteRequest`] - Start/destination coordinates plus algorithm choice
//! - [`RoutePlan`] - Successful route with waypoints and total distance
//! - [`shortest_path`] - Search between two node ids of an existing graph
//! - [`plan_route`] - End-to-end entry point over the reference graph
//!
//! # Strategy Pattern
//!
//! Each algorithm is wrapped in a [`RoutePlanner`] implementation and chosen
//! through [`select_planner`], so callers never branch on the algorithm.
//!
//! # Example
//!
//! ```
//! use geopath_lib::{plan_route, Coordinate, RouteRequest};
//!
//! let request = RouteRequest::dijkstra(
//!     Coordinate::new(40.7128, -74.006),
//!     Coordinate::new(39.9526, -75.1652),
//! );
//! let plan = plan_route(&request)?;
//! assert_eq!(plan.distance, 97.0);
//! # Ok::<(), geopath_lib::Error>(())
//! ```

mod planner;

pub use planner::{select_planner, AStarPlanner, DijkstraPlanner, RoutePlanner};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::base_graph;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::{build_query_graph, Graph, NodeId};
use crate::path::{SearchResult, Waypoint};

/// Supported search algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteAlgorithm {
    /// Dijkstra's label-setting search.
    Dijkstra,
    /// A* search guided by great-circle distance.
    #[default]
    #[serde(alias = "a-star", alias = "a_star", alias = "a*")]
    AStar,
}

impl RouteAlgorithm {
    pub const ALL: [RouteAlgorithm; 2] = [RouteAlgorithm::Dijkstra, RouteAlgorithm::AStar];

    /// Short label used in results ("Dijkstra" / "A*").
    pub fn label(self) -> &'static str {
        match self {
            RouteAlgorithm::Dijkstra => "Dijkstra",
            RouteAlgorithm::AStar => "A*",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RouteAlgorithm::Dijkstra => "Dijkstra's Algorithm",
            RouteAlgorithm::AStar => "A* Algorithm",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RouteAlgorithm::Dijkstra => "Finds the shortest path between two nodes in a graph",
            RouteAlgorithm::AStar => {
                "An informed search algorithm that uses heuristics to find the optimal path"
            }
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "astar",
        };
        f.write_str(value)
    }
}

impl FromStr for RouteAlgorithm {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(RouteAlgorithm::Dijkstra),
            "astar" | "a-star" | "a_star" | "a*" => Ok(RouteAlgorithm::AStar),
            _ => Err(Error::UnknownAlgorithm {
                name: value.to_string(),
            }),
        }
    }
}

/// Catalogue entry describing an algorithm to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    pub id: RouteAlgorithm,
    pub name: &'static str,
    pub description: &'static str,
}

/// Describe every supported algorithm.
pub fn available_algorithms() -> Vec<AlgorithmInfo> {
    RouteAlgorithm::ALL
        .iter()
        .map(|&algorithm| AlgorithmInfo {
            id: algorithm,
            name: algorithm.name(),
            description: algorithm.description(),
        })
        .collect()
}

/// High-level route planning request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub start: Coordinate,
    pub destination: Coordinate,
    pub algorithm: RouteAlgorithm,
}

impl RouteRequest {
    pub fn new(start: Coordinate, destination: Coordinate, algorithm: RouteAlgorithm) -> Self {
        Self {
            start,
            destination,
            algorithm,
        }
    }

    pub fn dijkstra(start: Coordinate, destination: Coordinate) -> Self {
        Self::new(start, destination, RouteAlgorithm::Dijkstra)
    }

    pub fn a_star(start: Coordinate, destination: Coordinate) -> Self {
        Self::new(start, destination, RouteAlgorithm::AStar)
    }
}

/// Planned route returned by [`plan_route`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub algorithm: RouteAlgorithm,
    pub start: Coordinate,
    pub destination: Coordinate,
    pub path: Vec<Waypoint>,
    /// Total distance in kilometres.
    pub distance: f64,
    pub units: &'static str,
    pub nodes_settled: usize,
}

impl RoutePlan {
    /// Number of edges in the route, attachment edges included.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Base-graph nodes visited between the two synthetic endpoints.
    pub fn interior_nodes(&self) -> impl Iterator<Item = &Waypoint> + '_ {
        self.path.iter().filter(|waypoint| !waypoint.id.is_synthetic())
    }
}

/// Search `graph` from `start` to `goal` with the requested algorithm.
pub fn shortest_path(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    algorithm: RouteAlgorithm,
) -> SearchResult {
    select_planner(algorithm).find_path(graph, start, goal)
}

/// Plan a route over the built-in reference graph.
pub fn plan_route(request: &RouteRequest) -> Result<RoutePlan> {
    plan_route_on(base_graph()?, request)
}

/// Plan a route over `base`, splicing the request's endpoints into it.
pub fn plan_route_on(base: &Graph, request: &RouteRequest) -> Result<RoutePlan> {
    let graph = build_query_graph(base, request.start, request.destination)?;
    let result = shortest_path(
        &graph,
        NodeId::Start,
        NodeId::Destination,
        request.algorithm,
    );

    if let Some(failure) = &result.error {
        warn!(
            algorithm = %request.algorithm,
            start = %request.start,
            destination = %request.destination,
            error = %failure,
            "route planning failed"
        );
    }
    let result = result.into_result()?;

    debug!(
        algorithm = %request.algorithm,
        hops = result.hop_count(),
        distance_km = result.distance,
        "route planned"
    );

    Ok(RoutePlan {
        algorithm: result.algorithm,
        start: request.start,
        destination: request.destination,
        path: result.path,
        distance: result.distance,
        units: "kilometers",
        nodes_settled: result.nodes_settled,
    })
}
