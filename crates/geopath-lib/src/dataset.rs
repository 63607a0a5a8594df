//! Built-in reference road network of ten US cities.
//!
//! Road lengths are kilometres and every road is traversable in both
//! directions. The graph is built once on first use and shared by every query.

use once_cell::sync::OnceCell;
use tracing::info;

use crate::error::Result;
use crate::graph::{Graph, Node, NodeId};

/// `(id, name, lat, lng)` for every city in the reference network.
pub const CITIES: [(u32, &str, f64, f64); 10] = [
    (1, "New York", 40.7128, -74.006),
    (2, "Los Angeles", 34.0522, -118.2437),
    (3, "Chicago", 41.8781, -87.6298),
    (4, "Houston", 29.7604, -95.3698),
    (5, "Atlanta", 33.749, -84.388),
    (6, "Philadelphia", 39.9526, -75.1652),
    (7, "Miami", 25.7617, -80.1918),
    (8, "Seattle", 47.6062, -122.3321),
    (9, "Denver", 39.7392, -104.9903),
    (10, "Dallas", 32.7767, -96.797),
];

/// Undirected roads as `(a, b, km)`.
pub const ROADS: [(u32, u32, f64); 14] = [
    (1, 2, 3935.0),
    (1, 3, 1147.0),
    (1, 6, 97.0),
    (2, 3, 2800.0),
    (2, 4, 2180.0),
    (3, 5, 715.0),
    (3, 8, 1730.0),
    (3, 9, 1730.0),
    (4, 5, 940.0),
    (4, 10, 239.0),
    (5, 6, 640.0),
    (5, 7, 660.0),
    (8, 9, 1310.0),
    (9, 10, 780.0),
];

static BASE_GRAPH: OnceCell<Graph> = OnceCell::new();

/// Nodes of the reference network, each road expanded into two directed edges.
pub fn reference_nodes() -> Vec<Node> {
    CITIES
        .iter()
        .map(|&(id, _, lat, lng)| {
            ROADS
                .iter()
                .filter_map(|&(a, b, km)| {
                    if a == id {
                        Some((b, km))
                    } else if b == id {
                        Some((a, km))
                    } else {
                        None
                    }
                })
                .fold(Node::new(id, lat, lng), |node, (target, km)| {
                    node.with_edge(target, km)
                })
        })
        .collect()
}

/// Shared base graph, built on first access.
pub fn base_graph() -> Result<&'static Graph> {
    BASE_GRAPH.get_or_try_init(|| {
        let graph = Graph::new(reference_nodes())?;
        info!(
            cities = CITIES.len(),
            roads = ROADS.len(),
            "loaded reference road network"
        );
        Ok(graph)
    })
}

/// City name for a base node id.
pub fn city_name(id: NodeId) -> Option<&'static str> {
    match id {
        NodeId::Base(id) => CITIES
            .iter()
            .find(|(city, ..)| *city == id)
            .map(|(_, name, ..)| *name),
        NodeId::Start | NodeId::Destination => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_road_is_symmetric() {
        let nodes = reference_nodes();
        for node in &nodes {
            for edge in &node.edges {
                let back = nodes
                    .iter()
                    .find(|candidate| candidate.id == edge.target)
                    .expect("target exists");
                assert!(back
                    .edges
                    .iter()
                    .any(|e| e.target == node.id && e.weight == edge.weight));
            }
        }
        let directed: usize = nodes.iter().map(|n| n.edges.len()).sum();
        assert_eq!(directed, ROADS.len() * 2);
    }

    #[test]
    fn base_graph_is_built_once() {
        let first = base_graph().unwrap();
        let second = base_graph().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), CITIES.len());
    }

    #[test]
    fn city_names_resolve() {
        assert_eq!(city_name(NodeId::Base(7)), Some("Miami"));
        assert_eq!(city_name(NodeId::Base(11)), None);
        assert_eq!(city_name(NodeId::Start), None);
    }
}
