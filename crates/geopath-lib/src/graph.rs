use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Identifier of a node within a graph snapshot.
///
/// Base nodes carry a small integer; the two synthetic endpoints spliced in
/// per query use reserved sentinels so they can never collide with base ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Base(u32),
    Start,
    Destination,
}

impl NodeId {
    /// Whether this id is one of the per-query sentinels.
    pub fn is_synthetic(self) -> bool {
        matches!(self, NodeId::Start | NodeId::Destination)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId::Base(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Base(id) => write!(f, "{id}"),
            NodeId::Start => f.write_str("start"),
            NodeId::Destination => f.write_str("destination"),
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NodeId::Base(id) => serializer.serialize_u32(*id),
            NodeId::Start => serializer.serialize_str("start"),
            NodeId::Destination => serializer.serialize_str("destination"),
        }
    }
}

/// Directed, weighted edge. Weights are kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub target: NodeId,
    pub weight: f64,
}

/// Graph node with its outgoing edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Coordinate,
    pub edges: Vec<Edge>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            position: Coordinate::new(lat, lng),
            edges: Vec::new(),
        }
    }

    /// Append an outgoing edge.
    pub fn with_edge(mut self, target: impl Into<NodeId>, weight: f64) -> Self {
        self.edges.push(Edge {
            target: target.into(),
            weight,
        });
        self
    }
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

/// Graph snapshot searched by the path-finding algorithms.
///
/// The base nodes live in a shared, immutable arena. Query graphs created by
/// [`Graph::attach_endpoints`] reuse that arena and append the two synthetic
/// nodes (indices `base_len()` and `base_len() + 1`) plus the single edge that
/// leads into the destination, so concurrent queries never touch shared state.
#[derive(Debug, Clone)]
pub struct Graph {
    base: Arc<Arena>,
    overlay: Vec<Node>,
    attachments: Vec<(usize, Edge)>,
}

impl Graph {
    /// Build a graph from `nodes`, validating ids, coordinates and edges.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            node.position.validate()?;
            if index.insert(node.id, position).is_some() {
                return Err(Error::DuplicateNode { id: node.id });
            }
        }

        for node in &nodes {
            for edge in &node.edges {
                if !edge.weight.is_finite() || edge.weight < 0.0 {
                    return Err(Error::InvalidEdgeWeight {
                        from: node.id,
                        target: edge.target,
                        weight: edge.weight,
                    });
                }
                if !index.contains_key(&edge.target) {
                    return Err(Error::UnknownEdgeTarget {
                        from: node.id,
                        target: edge.target,
                    });
                }
            }
        }

        debug!(
            nodes = nodes.len(),
            edges = nodes.iter().map(|n| n.edges.len()).sum::<usize>(),
            "graph constructed"
        );

        Ok(Self {
            base: Arc::new(Arena { nodes, index }),
            overlay: Vec::new(),
            attachments: Vec::new(),
        })
    }

    /// Total number of nodes, synthetic endpoints included.
    pub fn len(&self) -> usize {
        self.base.nodes.len() + self.overlay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes in the shared base arena.
    pub fn base_len(&self) -> usize {
        self.base.nodes.len()
    }

    /// Whether both graphs are views over the same base arena.
    pub fn shares_base_with(&self, other: &Graph) -> bool {
        Arc::ptr_eq(&self.base, &other.base)
    }

    /// Resolve a node id to its dense index.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        if let Some(&index) = self.base.index.get(&id) {
            return Some(index);
        }
        self.overlay
            .iter()
            .position(|node| node.id == id)
            .map(|position| self.base.nodes.len() + position)
    }

    /// Node stored at `index`.
    pub fn node(&self, index: usize) -> Option<&Node> {
        let base_len = self.base.nodes.len();
        if index < base_len {
            self.base.nodes.get(index)
        } else {
            self.overlay.get(index - base_len)
        }
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).and_then(|index| self.node(index))
    }

    /// All nodes in index order: base nodes first, then synthetic endpoints.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.base.nodes.iter().chain(self.overlay.iter())
    }

    /// Outgoing edges of the node at `index`, including per-query attachments.
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = &Edge> + '_ {
        let own = self.node(index).map(|node| node.edges.as_slice()).unwrap_or(&[]);
        own.iter().chain(
            self.attachments
                .iter()
                .filter(move |(from, _)| *from == index)
                .map(|(_, edge)| edge),
        )
    }

    /// Edges that end at `target`, paired with the node they leave from.
    pub fn incoming(&self, target: NodeId) -> Vec<(NodeId, Edge)> {
        (0..self.len())
            .filter_map(|index| self.node(index).map(|node| (index, node.id)))
            .flat_map(|(index, from)| {
                self.neighbours(index)
                    .filter(|edge| edge.target == target)
                    .map(move |edge| (from, *edge))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Splice synthetic `start` and `destination` nodes into a copy of this
    /// graph's base arena.
    ///
    /// Each endpoint is wired to the base node nearest to it: a single edge
    /// `start -> nearest` and a single edge `nearest -> destination`, weighted
    /// by great-circle distance. Ties keep the first node in base order. Any
    /// endpoints previously attached to `self` are discarded.
    pub fn attach_endpoints(&self, start: Coordinate, destination: Coordinate) -> Result<Graph> {
        start.validate()?;
        destination.validate()?;

        for sentinel in [NodeId::Start, NodeId::Destination] {
            if self.base.index.contains_key(&sentinel) {
                return Err(Error::DuplicateNode { id: sentinel });
            }
        }

        let (start_index, start_distance) =
            self.nearest_base_node(&start).ok_or(Error::EmptyGraph)?;
        let (dest_index, dest_distance) =
            self.nearest_base_node(&destination).ok_or(Error::EmptyGraph)?;

        let start_target = self.base.nodes[start_index].id;
        let dest_source = self.base.nodes[dest_index].id;
        debug!(
            closest_to_start = %start_target,
            start_distance,
            closest_to_destination = %dest_source,
            dest_distance,
            "attached query endpoints"
        );

        let start_node = Node {
            id: NodeId::Start,
            position: start,
            edges: vec![Edge {
                target: start_target,
                weight: start_distance,
            }],
        };
        let destination_node = Node {
            id: NodeId::Destination,
            position: destination,
            edges: Vec::new(),
        };

        Ok(Graph {
            base: Arc::clone(&self.base),
            overlay: vec![start_node, destination_node],
            attachments: vec![(
                dest_index,
                Edge {
                    target: NodeId::Destination,
                    weight: dest_distance,
                },
            )],
        })
    }

    fn nearest_base_node(&self, target: &Coordinate) -> Option<(usize, f64)> {
        self.base
            .nodes
            .iter()
            .enumerate()
            .fold(None, |best, (index, node)| {
                let distance = node.position.distance_to(target);
                match best {
                    Some((_, best_distance)) if best_distance <= distance => best,
                    _ => Some((index, distance)),
                }
            })
    }
}

/// Build the per-query graph for `start` and `destination` on top of `base`.
pub fn build_query_graph(base: &Graph, start: Coordinate, destination: Coordinate) -> Result<Graph> {
    base.attach_endpoints(start, destination)
}
