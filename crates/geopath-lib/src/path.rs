//! Best-first label-setting search.
//!
//! Dijkstra and A* share one search loop. They differ in the priority key
//! (tentative cost vs. tentative cost plus great-circle estimate) and in how
//! an unreachable goal is reported. Both stop as soon as the goal is popped
//! from the frontier, so the reported distance is final.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{heuristic, Coordinate};
use crate::graph::{Graph, NodeId};
use crate::routing::RouteAlgorithm;

/// One stop along a returned path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub id: NodeId,
    pub lat: f64,
    pub lng: f64,
}

impl Waypoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Why a search produced no usable path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchFailure {
    #[error("start or goal node not found: {id}")]
    NodeNotFound { id: NodeId },
    #[error("no path found from {start} to {goal}")]
    NoPathFound { start: NodeId, goal: NodeId },
}

/// Outcome of a single search. Failures are carried as data in `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub algorithm: RouteAlgorithm,
    pub path: Vec<Waypoint>,
    /// Sum of traversed edge weights in kilometres.
    pub distance: f64,
    /// Nodes popped from the frontier and expanded (or accepted as goal).
    pub nodes_settled: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchFailure>,
}

impl SearchResult {
    fn failure(algorithm: RouteAlgorithm, failure: SearchFailure) -> Self {
        Self {
            algorithm,
            path: Vec::new(),
            distance: 0.0,
            nodes_settled: 0,
            error: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.path.iter().map(|waypoint| waypoint.id).collect()
    }

    /// Convert a tagged failure into a library [`Error`].
    pub fn into_result(self) -> Result<Self> {
        match self.error {
            Some(failure) => Err(Error::from(failure)),
            None => Ok(self),
        }
    }
}

/// Run Dijkstra's algorithm from `start` to `goal`.
///
/// When the goal is unreachable the result still carries the reconstructed
/// predecessor chain (only the goal itself) with an infinite distance, and is
/// tagged [`SearchFailure::NoPathFound`].
pub fn find_route_dijkstra(graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult {
    search::<Uninformed>(graph, start, goal)
}

/// Run A* from `start` to `goal` using great-circle distance as heuristic.
pub fn find_route_a_star(graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult {
    search::<GreatCircle>(graph, start, goal)
}

trait SearchStrategy: Sized {
    const ALGORITHM: RouteAlgorithm;

    fn prepare(graph: &Graph, goal: usize) -> Self;

    /// Lower bound on the remaining cost from `node` to the goal.
    fn estimate(&self, graph: &Graph, node: usize) -> f64;

    /// Path and distance reported when the frontier empties first.
    fn unreachable(graph: &Graph, exploration: &Exploration, goal: usize) -> (Vec<Waypoint>, f64);
}

struct Uninformed;

impl SearchStrategy for Uninformed {
    const ALGORITHM: RouteAlgorithm = RouteAlgorithm::Dijkstra;

    fn prepare(_graph: &Graph, _goal: usize) -> Self {
        Uninformed
    }

    fn estimate(&self, _graph: &Graph, _node: usize) -> f64 {
        0.0
    }

    fn unreachable(graph: &Graph, exploration: &Exploration, goal: usize) -> (Vec<Waypoint>, f64) {
        (
            reconstruct_path(graph, &exploration.parent, goal),
            exploration.cost[goal],
        )
    }
}

struct GreatCircle {
    goal: Option<Coordinate>,
}

impl SearchStrategy for GreatCircle {
    const ALGORITHM: RouteAlgorithm = RouteAlgorithm::AStar;

    fn prepare(graph: &Graph, goal: usize) -> Self {
        Self {
            goal: graph.node(goal).map(|node| node.position),
        }
    }

    fn estimate(&self, graph: &Graph, node: usize) -> f64 {
        match (self.goal, graph.node(node)) {
            (Some(goal), Some(node)) => heuristic(&node.position, &goal),
            _ => 0.0,
        }
    }

    fn unreachable(_graph: &Graph, _exploration: &Exploration, _goal: usize) -> (Vec<Waypoint>, f64) {
        (Vec::new(), 0.0)
    }
}

struct Exploration {
    cost: Vec<f64>,
    parent: Vec<Option<usize>>,
    reached: bool,
    settled: usize,
}

fn search<S: SearchStrategy>(graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult {
    let Some(start_index) = graph.index_of(start) else {
        return SearchResult::failure(S::ALGORITHM, SearchFailure::NodeNotFound { id: start });
    };
    let Some(goal_index) = graph.index_of(goal) else {
        return SearchResult::failure(S::ALGORITHM, SearchFailure::NodeNotFound { id: goal });
    };

    let strategy = S::prepare(graph, goal_index);
    let exploration = best_first(graph, start_index, goal_index, &strategy);

    debug!(
        algorithm = %S::ALGORITHM,
        %start,
        %goal,
        reached = exploration.reached,
        settled = exploration.settled,
        "search finished"
    );

    if exploration.reached {
        SearchResult {
            algorithm: S::ALGORITHM,
            path: reconstruct_path(graph, &exploration.parent, goal_index),
            distance: exploration.cost[goal_index],
            nodes_settled: exploration.settled,
            error: None,
        }
    } else {
        let (path, distance) = S::unreachable(graph, &exploration, goal_index);
        SearchResult {
            algorithm: S::ALGORITHM,
            path,
            distance,
            nodes_settled: exploration.settled,
            error: Some(SearchFailure::NoPathFound { start, goal }),
        }
    }
}

fn best_first<S: SearchStrategy>(
    graph: &Graph,
    start: usize,
    goal: usize,
    strategy: &S,
) -> Exploration {
    let count = graph.len();
    let mut cost = vec![f64::INFINITY; count];
    let mut parent: Vec<Option<usize>> = vec![None; count];
    let mut closed = vec![false; count];
    let mut frontier = BinaryHeap::new();
    let mut settled = 0;

    cost[start] = 0.0;
    frontier.push(Candidate::new(start, strategy.estimate(graph, start)));

    while let Some(Candidate { node, .. }) = frontier.pop() {
        // Lazy deletion: superseded heap entries surface after the node closed.
        if closed[node] {
            continue;
        }
        settled += 1;

        if node == goal {
            return Exploration {
                cost,
                parent,
                reached: true,
                settled,
            };
        }
        closed[node] = true;

        for edge in graph.neighbours(node) {
            let Some(next) = graph.index_of(edge.target) else {
                continue;
            };
            if closed[next] {
                continue;
            }

            let tentative = cost[node] + edge.weight;
            if tentative < cost[next] {
                cost[next] = tentative;
                parent[next] = Some(node);
                frontier.push(Candidate::new(
                    next,
                    tentative + strategy.estimate(graph, next),
                ));
            }
        }
    }

    Exploration {
        cost,
        parent,
        reached: false,
        settled,
    }
}

fn reconstruct_path(graph: &Graph, parent: &[Option<usize>], goal: usize) -> Vec<Waypoint> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(index) = current {
        let Some(node) = graph.node(index) else {
            break;
        };
        path.push(Waypoint {
            id: node.id,
            lat: node.position.lat,
            lng: node.position.lng,
        });
        current = parent[index];
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Candidate {
    node: usize,
    priority: FloatOrd,
}

impl Candidate {
    fn new(node: usize, priority: f64) -> Self {
        Self {
            node,
            priority: FloatOrd(priority),
        }
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest priority, then the lowest index.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
