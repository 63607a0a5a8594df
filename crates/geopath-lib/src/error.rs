use thiserror::Error;

use crate::graph::NodeId;
use crate::path::SearchFailure;

/// Convenient result alias for the geopath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A latitude/longitude pair was non-finite or outside the valid range.
    #[error("invalid coordinate ({lat}, {lng}); expected lat in [-90, 90] and lng in [-180, 180]")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// Raised when endpoints are attached to a graph without any base nodes.
    #[error("cannot attach endpoints to an empty graph")]
    EmptyGraph,

    /// Two nodes in the same graph share an identifier.
    #[error("duplicate node id {id} in graph")]
    DuplicateNode { id: NodeId },

    /// An edge points at a node that is not part of the graph.
    #[error("edge from {from} references unknown node {target}")]
    UnknownEdgeTarget { from: NodeId, target: NodeId },

    /// An edge weight was negative or not finite.
    #[error("edge from {from} to {target} has invalid weight {weight}")]
    InvalidEdgeWeight {
        from: NodeId,
        target: NodeId,
        weight: f64,
    },

    /// Start or goal node is absent from the node set.
    #[error("start or goal node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// The search exhausted its frontier without reaching the goal.
    #[error("no path found from {start} to {goal}")]
    NoPathFound { start: NodeId, goal: NodeId },

    /// Raised when an algorithm name cannot be parsed.
    #[error("unknown algorithm '{name}'; expected \"dijkstra\" or \"astar\"")]
    UnknownAlgorithm { name: String },

    /// The geocoding provider returned no match for the address.
    #[error("no results found for address '{address}'")]
    AddressNotFound { address: String },

    /// The geocoding provider answered with something we could not use.
    #[error("geocoding failed: {message}")]
    Geocoding { message: String },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<SearchFailure> for Error {
    fn from(failure: SearchFailure) -> Self {
        match failure {
            SearchFailure::NodeNotFound { id } => Error::NodeNotFound { id },
            SearchFailure::NoPathFound { start, goal } => Error::NoPathFound { start, goal },
        }
    }
}
