//! Route planning strategies implementing the Strategy pattern.
//!
//! This module provides the `RoutePlanner` trait and one implementation per
//! search algorithm. New algorithms plug in here without touching
//! [`super::shortest_path`].

use crate::graph::{Graph, NodeId};
use crate::path::{find_route_a_star, find_route_dijkstra, SearchResult};

use super::RouteAlgorithm;

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Search `graph` from `start` to `goal`.
    ///
    /// Failures (missing nodes, unreachable goal) are reported inside the
    /// returned [`SearchResult`] rather than as an `Err`.
    fn find_path(&self, graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult;

    /// Whether the planner orders its frontier with a distance estimate.
    fn uses_heuristic(&self) -> bool {
        false
    }
}

/// Dijkstra's algorithm planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraPlanner;

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn find_path(&self, graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult {
        find_route_dijkstra(graph, start, goal)
    }
}

/// A* planner using great-circle distance to the goal as its heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPlanner;

impl RoutePlanner for AStarPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStar
    }

    fn find_path(&self, graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult {
        find_route_a_star(graph, start, goal)
    }

    fn uses_heuristic(&self) -> bool {
        true
    }
}

/// Select the planner for `algorithm`.
pub fn select_planner(algorithm: RouteAlgorithm) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
        RouteAlgorithm::AStar => Box::new(AStarPlanner),
    }
}
