#![allow(dead_code)]

use geopath_lib::{Coordinate, Graph, Node, NodeId};
use proptest::prelude::*;

pub const NEW_YORK: Coordinate = Coordinate::new(40.7128, -74.006);
pub const PHILADELPHIA: Coordinate = Coordinate::new(39.9526, -75.1652);

/// Randomly generated directed graph, kept as plain data so properties can
/// enumerate it independently of [`Graph`].
#[derive(Debug, Clone)]
pub struct GraphSpec {
    pub positions: Vec<(f64, f64)>,
    /// `(from, to, stretch)` where the weight is `stretch` times the
    /// great-circle distance between the endpoints.
    pub edges: Vec<(usize, usize, f64)>,
}

impl GraphSpec {
    pub fn weight(&self, from: usize, to: usize, stretch: f64) -> f64 {
        let (lat1, lng1) = self.positions[from];
        let (lat2, lng2) = self.positions[to];
        geopath_lib::haversine_distance(lat1, lng1, lat2, lng2) * stretch
    }

    pub fn build(&self) -> Graph {
        let nodes = self
            .positions
            .iter()
            .enumerate()
            .map(|(index, &(lat, lng))| {
                self.edges
                    .iter()
                    .filter(|(from, _, _)| *from == index)
                    .fold(Node::new(index as u32, lat, lng), |node, &(_, to, stretch)| {
                        node.with_edge(to as u32, self.weight(index, to, stretch))
                    })
            })
            .collect();
        Graph::new(nodes).expect("generated graph is valid")
    }

    /// Shortest distance by enumerating every simple path.
    pub fn brute_force(&self, start: usize, goal: usize) -> Option<f64> {
        let mut visited = vec![false; self.positions.len()];
        let mut best = None;
        self.explore(start, goal, 0.0, &mut visited, &mut best);
        best
    }

    fn explore(
        &self,
        node: usize,
        goal: usize,
        cost: f64,
        visited: &mut [bool],
        best: &mut Option<f64>,
    ) {
        if node == goal {
            if best.map_or(true, |b| cost < b) {
                *best = Some(cost);
            }
            return;
        }
        visited[node] = true;
        for &(from, to, stretch) in &self.edges {
            if from == node && !visited[to] {
                self.explore(to, goal, cost + self.weight(from, to, stretch), visited, best);
            }
        }
        visited[node] = false;
    }
}

/// Small graphs in a 10 x 10 degree box with stretch factors of at least 1,
/// so great-circle distance never overestimates a remaining route.
pub fn graph_spec() -> impl Strategy<Value = GraphSpec> {
    (2usize..8).prop_flat_map(|count| {
        (
            prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), count),
            prop::collection::vec((0..count, 0..count, 1.0f64..3.0), 0..(count * 3)),
        )
            .prop_map(|(positions, edges)| GraphSpec { positions, edges })
    })
}

pub fn node(index: usize) -> NodeId {
    NodeId::Base(index as u32)
}
