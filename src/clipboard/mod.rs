//! Copy and paste of node selections.
//!
//! The buffer only stores detached node data and index-based connections; the graph
//! allocates fresh ids when pasting, exactly as it does when decoding.

mod memory;

pub use memory::MemoryClipboard;

use crate::component::ComponentResolver;
use crate::graph::{Direction, GraphModel, Node, NodeId, NodeSpec, Position, Selectable};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A copied node without any graph ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardNode {
    pub component_clazz: String,
    pub name: String,
    pub configuration: serde_json::Value,
    pub configuration_version: u32,
    pub description: Option<String>,
    pub debug_settings: Option<serde_json::Value>,
    pub singleton_mode: Option<bool>,
    pub queue_name: Option<String>,
    pub additional_info: serde_json::Map<String, serde_json::Value>,
    pub position: Position,
    pub error: Option<String>,
}

impl From<&Node> for ClipboardNode {
    fn from(node: &Node) -> Self {
        Self {
            component_clazz: node.component.clazz.clone(),
            name: node.name.clone(),
            configuration: node.configuration.clone(),
            configuration_version: node.configuration_version,
            description: node.description.clone(),
            debug_settings: node.debug_settings.clone(),
            singleton_mode: node.singleton_mode,
            queue_name: node.queue_name.clone(),
            additional_info: node.additional_info.clone(),
            position: node.position,
            error: node.error.clone(),
        }
    }
}

/// A copied edge, by position within the copied node list.
///
/// When `is_input_source` is set the edge came from the input node, which is never copied,
/// and `from_index` is meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardConnection {
    pub is_input_source: bool,
    pub from_index: usize,
    pub to_index: usize,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipboardContents {
    pub nodes: Vec<ClipboardNode>,
    pub connections: Vec<ClipboardConnection>,
}

/// The clipboard collaborator.
pub trait ClipboardBuffer {
    fn copy(&mut self, nodes: Vec<ClipboardNode>, connections: Vec<ClipboardConnection>);

    /// The buffered selection, repositioned so its centre lands on `(x, y)`.
    fn paste(&self, x: f64, y: f64) -> Option<ClipboardContents>;

    fn has_buffered(&self) -> bool;
}

/// Copies the graph's selected rule nodes and the selected edges among them. Rule chain
/// link targets stay behind, like the input node.
/// Returns the number of nodes copied; nothing is buffered for an empty selection.
pub fn copy_selection(graph: &GraphModel, buffer: &mut impl ClipboardBuffer) -> usize {
    let nodes: Vec<&Node> = graph
        .selected_nodes()
        .into_iter()
        .filter(|n| !n.readonly && !n.component.is_rule_chain_link())
        .collect();
    if nodes.is_empty() {
        return 0;
    }
    let index: AHashMap<NodeId, usize> =
        nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
    let index_of = |connector| {
        graph
            .node_by_connector(connector)
            .and_then(|n| index.get(&n.id).copied())
    };

    let connections = graph
        .selected_edges()
        .into_iter()
        .filter_map(|edge| {
            let to_index = index_of(edge.destination)?;
            let is_input_source = edge.source == graph.input_connector();
            let from_index = if is_input_source {
                0
            } else {
                index_of(edge.source)?
            };
            Some(ClipboardConnection {
                is_input_source,
                from_index,
                to_index,
                labels: edge.labels.clone(),
            })
        })
        .collect();

    let count = nodes.len();
    buffer.copy(
        nodes.into_iter().map(ClipboardNode::from).collect(),
        connections,
    );
    count
}

/// Pastes the buffered selection centred on `(x, y)` and selects the pasted nodes.
///
/// Returns `None`, leaving the graph untouched, when nothing is buffered or any buffered
/// component can no longer be resolved.
pub fn paste_into(
    graph: &mut GraphModel,
    buffer: &impl ClipboardBuffer,
    resolver: &impl ComponentResolver,
    x: f64,
    y: f64,
) -> Option<Vec<NodeId>> {
    let contents = buffer.paste(x, y)?;
    let mut specs = Vec::with_capacity(contents.nodes.len());
    for node in contents.nodes {
        let Some(component) = resolver.resolve(&node.component_clazz) else {
            tracing::warn!("Cannot paste: unknown component '{}'", node.component_clazz);
            return None;
        };
        specs.push(NodeSpec {
            component,
            rule_node_id: None,
            name: node.name,
            configuration: node.configuration,
            configuration_version: node.configuration_version,
            description: node.description,
            debug_settings: node.debug_settings,
            singleton_mode: node.singleton_mode,
            queue_name: node.queue_name,
            additional_info: node.additional_info,
            position: node.position,
            error: node.error,
        });
    }

    let pasted: Vec<NodeId> = specs
        .into_iter()
        .map(|spec| graph.insert_node(spec))
        .collect();
    let port = |graph: &GraphModel, index: usize, direction: Direction| {
        pasted
            .get(index)
            .and_then(|id| graph.node(*id))
            .and_then(|n| n.connector(direction))
    };

    for connection in &contents.connections {
        let Some(destination) = port(graph, connection.to_index, Direction::In) else {
            continue;
        };
        let source = if connection.is_input_source {
            Some(graph.input_connector())
        } else {
            port(graph, connection.from_index, Direction::Out)
        };
        if let Some(source) = source {
            graph.add_edge(source, destination, &connection.labels);
        }
    }

    graph.deselect_all();
    for id in &pasted {
        graph.select(Selectable::Node(*id));
    }
    Some(pasted)
}
