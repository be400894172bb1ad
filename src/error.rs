use crate::graph::{ConnectorId, EdgeKey, NodeId};
use thiserror::Error;

/// Structural violations reported by the explicit command API.
///
/// The primitive mutators on [`GraphModel`](crate::graph::GraphModel) drop these silently;
/// [`GraphModel::apply`](crate::graph::GraphModel::apply) reports them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node '{0}' does not exist in this graph")]
    NodeNotFound(NodeId),

    #[error("Connector '{0}' does not exist in this graph")]
    ConnectorNotFound(ConnectorId),

    #[error("Edge {0} does not exist in this graph")]
    EdgeNotFound(EdgeKey),

    #[error("Connector '{connector}' cannot be used as an edge {role}")]
    InvalidDirection {
        connector: ConnectorId,
        role: &'static str,
    },

    #[error("The input node cannot receive links")]
    InputAsDestination,

    #[error("The input node cannot feed a rule chain link")]
    InputToChainLink,

    #[error("A link from node '{source_node}' needs at least one label")]
    MissingLabels { source_node: NodeId },

    #[error("Node '{0}' is read-only")]
    ReadOnlyNode(NodeId),
}

/// Failures reported by the remote rule-chain service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(
        "Rule chain '{rule_chain_id}' was modified concurrently (submitted version {expected:?}, stored version {actual:?})"
    )]
    Conflict {
        rule_chain_id: String,
        expected: Option<i64>,
        actual: Option<i64>,
    },

    #[error("Rule chain '{0}' not found")]
    NotFound(String),

    #[error("Remote call failed: {0}")]
    Remote(String),
}

/// Reasons a nested-chain extraction is refused or abandoned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("At least two rule nodes must be selected, found {count}")]
    TooFewNodes { count: usize },

    #[error("Selection has {} possible entry points; a nested chain needs at most one", candidates.len())]
    AmbiguousEntryPoint { candidates: Vec<NodeId> },

    #[error("Failed to persist nested rule chain: {0}")]
    Service(#[from] ServiceError),
}

/// Errors that can occur while loading editor configuration or component catalogs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}

/// Errors surfaced by an editing session.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Rule chain has invalid nodes and cannot be saved")]
    InvalidChain,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
