use crate::component::ComponentDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Graph-unique node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule-chain-node-{}", self.0)
    }
}

/// Graph-unique connector handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorId(pub u32);

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn rounded(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connector {
    pub id: ConnectorId,
    pub direction: Direction,
}

/// A rule node placed on the canvas.
///
/// Nodes are only ever handed out by shared reference; all changes go through
/// [`GraphModel`](super::GraphModel).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub component: Arc<ComponentDescriptor>,
    /// Id the remote store assigned to this rule node, if it was ever saved.
    pub rule_node_id: Option<String>,
    pub name: String,
    pub configuration: serde_json::Value,
    pub configuration_version: u32,
    pub description: Option<String>,
    pub debug_settings: Option<serde_json::Value>,
    pub singleton_mode: Option<bool>,
    pub queue_name: Option<String>,
    pub additional_info: serde_json::Map<String, serde_json::Value>,
    pub position: Position,
    pub connectors: Vec<Connector>,
    pub error: Option<String>,
    pub readonly: bool,
}

impl Node {
    pub fn connector(&self, direction: Direction) -> Option<ConnectorId> {
        self.connectors
            .iter()
            .find(|c| c.direction == direction)
            .map(|c| c.id)
    }

    pub fn input_connector(&self) -> Option<ConnectorId> {
        self.connector(Direction::In)
    }

    pub fn output_connector(&self) -> Option<ConnectorId> {
        self.connector(Direction::Out)
    }

    pub fn owns(&self, connector: ConnectorId) -> bool {
        self.connectors.iter().any(|c| c.id == connector)
    }
}

/// Identifies an edge. At most one edge exists per connector pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub source: ConnectorId,
    pub destination: ConnectorId,
}

impl EdgeKey {
    pub fn new(source: ConnectorId, destination: ConnectorId) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// A directed, possibly multi-labeled link between an output and an input connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: ConnectorId,
    pub destination: ConnectorId,
    pub labels: Vec<String>,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source, self.destination)
    }

    /// The display label, all labels joined by `" / "`.
    pub fn label(&self) -> String {
        super::labels::join_labels(&self.labels)
    }
}
