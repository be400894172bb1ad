use super::labels::{dedup_labels, merge_labels};
use super::validation::Validator;
use super::{Connector, ConnectorId, Direction, Edge, EdgeKey, Node, NodeId, Position};
use crate::component::ComponentDescriptor;
use crate::error::GraphError;
use ahash::{AHashMap, AHashSet};
use std::sync::Arc;

/// Hands out fresh node and connector ids. Owned by exactly one [`GraphModel`].
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_node: u32,
    next_connector: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_node: 1,
            next_connector: 1,
        }
    }
}

impl IdAllocator {
    pub fn node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub fn connector(&mut self) -> ConnectorId {
        let id = ConnectorId(self.next_connector);
        self.next_connector += 1;
        id
    }
}

/// Identity of the persisted chain a model was decoded from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainIdentity {
    pub rule_chain_id: Option<String>,
    pub version: Option<i64>,
    /// Stored top-level keys the graph does not model, written back on encode.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Change notification emitted by every committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeUpdated(NodeId),
    NodeRemoved(NodeId),
    EdgeAdded(EdgeKey),
    EdgeUpdated(EdgeKey),
    EdgeRemoved(EdgeKey),
}

/// Something that can be selected on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selectable {
    Node(NodeId),
    Edge(EdgeKey),
}

/// Everything needed to place a node, minus the ids the model allocates.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub component: Arc<ComponentDescriptor>,
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
    pub error: Option<String>,
}

impl NodeSpec {
    pub fn new(component: Arc<ComponentDescriptor>, position: Position) -> Self {
        let configuration = component.default_configuration();
        Self {
            component,
            rule_node_id: None,
            name: String::new(),
            configuration,
            configuration_version: 0,
            description: None,
            debug_settings: None,
            singleton_mode: None,
            queue_name: None,
            additional_info: serde_json::Map::new(),
            position,
            error: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_configuration(mut self, configuration: serde_json::Value) -> Self {
        self.configuration = configuration;
        self
    }
}

/// In-memory rule chain graph: nodes, connectors, edges and selection.
///
/// Invariants kept by every mutator:
/// - connector ids are unique and every edge references two existing connectors;
/// - a node owns exactly the connectors its component enables, IN before OUT;
/// - at most one edge leaves the input node's connector.
#[derive(Debug, Clone)]
pub struct GraphModel {
    chain: ChainIdentity,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    connector_owners: AHashMap<ConnectorId, NodeId>,
    selected_nodes: AHashSet<NodeId>,
    selected_edges: AHashSet<EdgeKey>,
    input_node: NodeId,
    input_connector: ConnectorId,
    ids: IdAllocator,
    validator: Validator,
    events: Vec<GraphEvent>,
    dirty: bool,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new(Position::new(50.0, 150.0))
    }
}

impl GraphModel {
    /// Creates an empty graph holding only the read-only input node.
    pub fn new(input_position: Position) -> Self {
        let mut ids = IdAllocator::default();
        let input_node = ids.node();
        let input_connector = ids.connector();
        let node = Node {
            id: input_node,
            component: Arc::new(ComponentDescriptor::input()),
            rule_node_id: None,
            name: String::new(),
            configuration: serde_json::Value::Null,
            configuration_version: 0,
            description: None,
            debug_settings: None,
            singleton_mode: None,
            queue_name: None,
            additional_info: serde_json::Map::new(),
            position: input_position,
            connectors: vec![Connector {
                id: input_connector,
                direction: Direction::Out,
            }],
            error: None,
            readonly: true,
        };
        let mut connector_owners = AHashMap::new();
        connector_owners.insert(input_connector, input_node);
        Self {
            chain: ChainIdentity::default(),
            nodes: vec![node],
            edges: Vec::new(),
            connector_owners,
            selected_nodes: AHashSet::new(),
            selected_edges: AHashSet::new(),
            input_node,
            input_connector,
            ids,
            validator: Validator::default(),
            events: Vec::new(),
            dirty: false,
        }
    }

    pub fn chain(&self) -> &ChainIdentity {
        &self.chain
    }

    pub fn set_chain(&mut self, chain: ChainIdentity) {
        self.chain = chain;
    }

    // --- Queries ---

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All nodes except the synthetic input node, in insertion order.
    pub fn rule_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.id != self.input_node)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.iter().find(|e| e.key() == key)
    }

    pub fn input_node(&self) -> &Node {
        // The input node is created in `new` and can never be removed.
        &self.nodes[self.input_index()]
    }

    pub fn input_node_id(&self) -> NodeId {
        self.input_node
    }

    pub fn input_connector(&self) -> ConnectorId {
        self.input_connector
    }

    pub fn is_input_node(&self, id: NodeId) -> bool {
        id == self.input_node
    }

    pub fn node_by_connector(&self, connector: ConnectorId) -> Option<&Node> {
        self.connector_owners
            .get(&connector)
            .and_then(|id| self.node(*id))
    }

    pub fn connectors_by_type(&self, node: NodeId, direction: Direction) -> Vec<ConnectorId> {
        self.node(node)
            .map(|n| {
                n.connectors
                    .iter()
                    .filter(|c| c.direction == direction)
                    .map(|c| c.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn edges_from(&self, connector: ConnectorId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.source == connector)
    }

    pub fn edges_to(&self, connector: ConnectorId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.destination == connector)
    }

    /// Keys of every edge touching one of `node`'s connectors.
    pub fn edges_of_node(&self, node: NodeId) -> Vec<EdgeKey> {
        let Some(node) = self.node(node) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|e| node.owns(e.source) || node.owns(e.destination))
            .map(Edge::key)
            .collect()
    }

    // --- Node mutation ---

    /// Adds a node of `component` with its default configuration.
    pub fn add_node(&mut self, component: Arc<ComponentDescriptor>, position: Position) -> NodeId {
        self.insert_node(NodeSpec::new(component, position))
    }

    /// Adds a node, allocating its id and one connector per enabled port (IN, then OUT).
    pub fn insert_node(&mut self, spec: NodeSpec) -> NodeId {
        let id = self.ids.node();
        let mut connectors = Vec::with_capacity(2);
        if spec.component.in_enabled() {
            connectors.push(Connector {
                id: self.ids.connector(),
                direction: Direction::In,
            });
        }
        if spec.component.out_enabled() {
            connectors.push(Connector {
                id: self.ids.connector(),
                direction: Direction::Out,
            });
        }
        for connector in &connectors {
            self.connector_owners.insert(connector.id, id);
        }
        self.nodes.push(Node {
            id,
            component: spec.component,
            rule_node_id: spec.rule_node_id,
            name: spec.name,
            configuration: spec.configuration,
            configuration_version: spec.configuration_version,
            description: spec.description,
            debug_settings: spec.debug_settings,
            singleton_mode: spec.singleton_mode,
            queue_name: spec.queue_name,
            additional_info: spec.additional_info,
            position: spec.position,
            connectors,
            error: spec.error,
            readonly: false,
        });
        self.record(GraphEvent::NodeAdded(id));
        id
    }

    /// Removes a node and every edge touching it. The input node is left alone.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        match self.try_remove_node(id) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Ignoring node removal: {}", e);
                false
            }
        }
    }

    pub fn try_remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(GraphError::NodeNotFound(id))?;
        if self.nodes[index].readonly {
            return Err(GraphError::ReadOnlyNode(id));
        }
        for key in self.edges_of_node(id) {
            self.detach_edge(key);
        }
        let node = self.nodes.remove(index);
        for connector in &node.connectors {
            self.connector_owners.remove(&connector.id);
        }
        self.selected_nodes.remove(&id);
        self.record(GraphEvent::NodeRemoved(id));
        Ok(())
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.position = position;
        self.record(GraphEvent::NodeUpdated(id));
        true
    }

    /// Replaces the user-editable fields of a rule node.
    pub fn update_node(
        &mut self,
        id: NodeId,
        name: &str,
        configuration: serde_json::Value,
        description: Option<String>,
    ) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id && !n.readonly) else {
            return false;
        };
        node.name = name.to_string();
        node.configuration = configuration;
        node.description = description;
        self.record(GraphEvent::NodeUpdated(id));
        true
    }

    /// Sets or clears a node's configuration error. Errors come from outside the engine, so
    /// this does not dirty the model; it only schedules a validation sweep.
    pub fn set_node_error(&mut self, id: NodeId, error: Option<String>) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.error = error;
        self.events.push(GraphEvent::NodeUpdated(id));
        self.validator.schedule();
        true
    }

    // --- Edge mutation ---

    /// Connects `source` to `destination`, merging into an existing edge between the same
    /// connectors. Invalid requests are dropped and yield `None`.
    pub fn add_edge(
        &mut self,
        source: ConnectorId,
        destination: ConnectorId,
        labels: &[String],
    ) -> Option<EdgeKey> {
        self.try_add_edge(source, destination, labels)
            .map_err(|e| tracing::debug!("Dropping edge {} -> {}: {}", source, destination, e))
            .ok()
    }

    pub fn try_add_edge(
        &mut self,
        source: ConnectorId,
        destination: ConnectorId,
        labels: &[String],
    ) -> Result<EdgeKey, GraphError> {
        let source_node = self
            .node_by_connector(source)
            .ok_or(GraphError::ConnectorNotFound(source))?;
        let destination_node = self
            .node_by_connector(destination)
            .ok_or(GraphError::ConnectorNotFound(destination))?;
        if destination_node.id == self.input_node {
            return Err(GraphError::InputAsDestination);
        }
        if source_node.output_connector() != Some(source) {
            return Err(GraphError::InvalidDirection {
                connector: source,
                role: "source",
            });
        }
        if destination_node.input_connector() != Some(destination) {
            return Err(GraphError::InvalidDirection {
                connector: destination,
                role: "destination",
            });
        }
        if source == self.input_connector && destination_node.component.is_rule_chain_link() {
            return Err(GraphError::InputToChainLink);
        }
        // Only the input link is stored without a label, as the first node index.
        let labels = dedup_labels(labels);
        if labels.is_empty() && source != self.input_connector {
            return Err(GraphError::MissingLabels {
                source_node: source_node.id,
            });
        }

        let key = EdgeKey::new(source, destination);
        if source == self.input_connector {
            let stale: Vec<EdgeKey> = self
                .edges_from(source)
                .map(Edge::key)
                .filter(|k| *k != key)
                .collect();
            for stale_key in stale {
                self.detach_edge(stale_key);
            }
        }

        if let Some(edge) = self.edges.iter_mut().find(|e| e.key() == key) {
            if merge_labels(&mut edge.labels, &labels) {
                self.record(GraphEvent::EdgeUpdated(key));
            }
        } else {
            self.edges.push(Edge {
                source,
                destination,
                labels,
            });
            self.record(GraphEvent::EdgeAdded(key));
        }
        Ok(key)
    }

    pub fn remove_edge(&mut self, key: EdgeKey) -> bool {
        self.detach_edge(key)
    }

    /// Replaces the label list of an existing edge.
    pub fn set_edge_labels(&mut self, key: EdgeKey, labels: &[String]) -> Result<(), GraphError> {
        let source_node = self
            .node_by_connector(key.source)
            .map(|n| n.id)
            .ok_or(GraphError::ConnectorNotFound(key.source))?;
        let labels = dedup_labels(labels);
        if labels.is_empty() && key.source != self.input_connector {
            return Err(GraphError::MissingLabels { source_node });
        }
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.key() == key)
            .ok_or(GraphError::EdgeNotFound(key))?;
        edge.labels = labels;
        self.record(GraphEvent::EdgeUpdated(key));
        Ok(())
    }

    fn detach_edge(&mut self, key: EdgeKey) -> bool {
        let Some(index) = self.edges.iter().position(|e| e.key() == key) else {
            return false;
        };
        self.edges.remove(index);
        self.selected_edges.remove(&key);
        self.record(GraphEvent::EdgeRemoved(key));
        true
    }

    // --- Selection ---

    pub fn select(&mut self, item: Selectable) {
        match item {
            Selectable::Node(id) if self.node(id).is_some() => {
                self.selected_nodes.insert(id);
            }
            Selectable::Edge(key) if self.edge(key).is_some() => {
                self.selected_edges.insert(key);
            }
            _ => {}
        }
    }

    pub fn deselect(&mut self, item: Selectable) {
        match item {
            Selectable::Node(id) => {
                self.selected_nodes.remove(&id);
            }
            Selectable::Edge(key) => {
                self.selected_edges.remove(&key);
            }
        }
    }

    pub fn is_selected(&self, item: Selectable) -> bool {
        match item {
            Selectable::Node(id) => self.selected_nodes.contains(&id),
            Selectable::Edge(key) => self.selected_edges.contains(&key),
        }
    }

    /// Selected nodes, in graph order.
    pub fn selected_nodes(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| self.selected_nodes.contains(&n.id))
            .collect()
    }

    /// Selected edges, in graph order.
    pub fn selected_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| self.selected_edges.contains(&e.key()))
            .collect()
    }

    pub fn select_all(&mut self) {
        self.selected_nodes = self.nodes.iter().map(|n| n.id).collect();
        self.selected_edges = self.edges.iter().map(Edge::key).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected_nodes.clear();
        self.selected_edges.clear();
    }

    /// Removes every selected edge and every selected non-readonly node (with its edges).
    /// Returns the number of nodes and edges removed.
    pub fn delete_selected(&mut self) -> usize {
        let nodes: Vec<NodeId> = self
            .selected_nodes()
            .into_iter()
            .filter(|n| !n.readonly)
            .map(|n| n.id)
            .collect();
        let edges: Vec<EdgeKey> = self.selected_edges().into_iter().map(Edge::key).collect();

        let mut removed = 0;
        for key in edges {
            if self.detach_edge(key) {
                removed += 1;
            }
        }
        for id in nodes {
            removed += 1 + self.edges_of_node(id).len();
            self.remove_node(id);
        }
        removed
    }

    // --- Validation & change tracking ---

    /// Runs a pending validation sweep. Returns `true` when validity changed.
    pub fn tick(&mut self) -> bool {
        self.validator.run_pending(&self.nodes)
    }

    pub fn validation_pending(&self) -> bool {
        self.validator.is_scheduled()
    }

    /// Result of the last validation sweep.
    pub fn is_invalid(&self) -> bool {
        self.validator.is_invalid()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Drains the change notifications recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forces a validation sweep on the next tick without dirtying the model.
    pub(crate) fn schedule_validation(&mut self) {
        self.validator.schedule();
    }

    fn record(&mut self, event: GraphEvent) {
        self.events.push(event);
        self.dirty = true;
        self.validator.schedule();
    }

    fn input_index(&self) -> usize {
        self.nodes
            .iter()
            .position(|n| n.id == self.input_node)
            .unwrap_or(0)
    }
}
