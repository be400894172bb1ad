//! Common test utilities for building catalogs, graphs and metadata.
use rulegraph::error::ServiceError;
use rulegraph::metadata::AdditionalInfo;
use rulegraph::prelude::*;
use std::cell::Cell;
use std::sync::Arc;

pub const FILTER: &str = "org.example.filter.CheckField";
pub const ACTION: &str = "org.example.action.Log";
pub const GENERATOR: &str = "org.example.action.Generator";
pub const SWITCH: &str = "org.example.filter.Switch";

#[allow(dead_code)]
pub fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A catalog with a filter (True/False), an action (Success/Failure), an output-only
/// generator and a switch that allows custom link labels.
#[allow(dead_code)]
pub fn catalog() -> ComponentCatalog {
    let both = |relations: &[&str], custom: bool| NodeDefinition {
        in_enabled: true,
        out_enabled: true,
        relation_types: labels(relations),
        custom_relations: custom,
        default_configuration: serde_json::json!({ "enabled": true }),
        ..Default::default()
    };
    ComponentCatalog::new()
        .with_component(ComponentDescriptor::new(
            ComponentKind::Filter,
            FILTER,
            "check field",
            both(&["True", "False"], false),
        ))
        .with_component(ComponentDescriptor::new(
            ComponentKind::Action,
            ACTION,
            "log",
            both(&["Success", "Failure"], false),
        ))
        .with_component(ComponentDescriptor::new(
            ComponentKind::Action,
            GENERATOR,
            "generator",
            NodeDefinition {
                out_enabled: true,
                relation_types: labels(&["Success"]),
                ..Default::default()
            },
        ))
        .with_component(ComponentDescriptor::new(
            ComponentKind::Filter,
            SWITCH,
            "switch",
            both(&[], true),
        ))
}

#[allow(dead_code)]
pub fn component(clazz: &str) -> Arc<ComponentDescriptor> {
    catalog().get(clazz).expect("component registered in test catalog")
}

#[allow(dead_code)]
pub fn in_of(graph: &GraphModel, node: NodeId) -> ConnectorId {
    graph
        .node(node)
        .and_then(|n| n.input_connector())
        .expect("node has an input connector")
}

#[allow(dead_code)]
pub fn out_of(graph: &GraphModel, node: NodeId) -> ConnectorId {
    graph
        .node(node)
        .and_then(|n| n.output_connector())
        .expect("node has an output connector")
}

#[allow(dead_code)]
pub fn add_named(graph: &mut GraphModel, clazz: &str, name: &str, x: f64, y: f64) -> NodeId {
    graph.insert_node(NodeSpec::new(component(clazz), Position::new(x, y)).named(name))
}

#[allow(dead_code)]
pub fn node_named<'a>(graph: &'a GraphModel, name: &str) -> Option<&'a Node> {
    graph.rule_nodes().find(|n| n.name == name)
}

/// Three actions `A -> B -> C`, each link labeled `Success`, with the input node feeding `A`.
#[allow(dead_code)]
pub fn linear_graph() -> (GraphModel, NodeId, NodeId, NodeId) {
    let mut graph = GraphModel::default();
    let a = add_named(&mut graph, ACTION, "A", 300.0, 150.0);
    let b = add_named(&mut graph, ACTION, "B", 600.0, 150.0);
    let c = add_named(&mut graph, ACTION, "C", 900.0, 150.0);
    let input = graph.input_connector();
    graph.add_edge(input, in_of(&graph, a), &[]);
    graph.add_edge(out_of(&graph, a), in_of(&graph, b), &labels(&["Success"]));
    graph.add_edge(out_of(&graph, b), in_of(&graph, c), &labels(&["Success"]));
    graph.take_events();
    graph.mark_clean();
    (graph, a, b, c)
}

#[allow(dead_code)]
pub fn record(clazz: &str, name: &str, x: f64, y: f64) -> RuleNodeRecord {
    RuleNodeRecord {
        id: None,
        node_type: clazz.to_string(),
        name: name.to_string(),
        configuration: serde_json::json!({ "name": name }),
        configuration_version: 0,
        additional_info: AdditionalInfo {
            layout_x: x,
            layout_y: y,
            ..Default::default()
        },
        debug_settings: None,
        singleton_mode: None,
        queue_name: None,
    }
}

/// Filter `check` branching into two actions: `True` to `store`, `True`/`False` to `log`.
#[allow(dead_code)]
pub fn branching_metadata() -> RuleChainMetaData {
    RuleChainMetaData {
        rule_chain_id: None,
        version: None,
        first_node_index: Some(0),
        nodes: vec![
            record(FILTER, "check", 300.0, 150.0),
            record(ACTION, "store", 600.0, 100.0),
            record(ACTION, "log", 600.0, 250.0),
        ],
        connections: vec![
            NodeConnectionInfo::new(0, 1, "True"),
            NodeConnectionInfo::new(0, 2, "True"),
            NodeConnectionInfo::new(0, 2, "False"),
            NodeConnectionInfo::new(1, 2, "Failure"),
        ],
        ..Default::default()
    }
}

/// Topology of a graph independent of ids: `(from, to, labels)` by rule-node index, with
/// `None` standing for the input node.
#[allow(dead_code)]
pub fn topology(graph: &GraphModel) -> Vec<(Option<usize>, usize, Vec<String>)> {
    let index_of = |connector| {
        let node = graph.node_by_connector(connector)?;
        graph.rule_nodes().position(|n| n.id == node.id)
    };
    let mut edges: Vec<_> = graph
        .edges()
        .iter()
        .filter_map(|e| Some((index_of(e.source), index_of(e.destination)?, e.labels.clone())))
        .collect();
    edges.sort();
    edges
}

type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// A store whose metadata saves can be made to fail.
#[allow(dead_code)]
pub struct FlakyStore {
    pub inner: InMemoryRuleChainStore,
    pub reject_saves: Cell<bool>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryRuleChainStore::new(catalog()),
            reject_saves: Cell::new(false),
        }
    }
}

impl RuleChainService for FlakyStore {
    async fn get_rule_chain(&self, id: &str) -> ServiceResult<RuleChain> {
        self.inner.get_rule_chain(id).await
    }

    async fn get_rule_chain_metadata(&self, id: &str) -> ServiceResult<RuleChainMetaData> {
        self.inner.get_rule_chain_metadata(id).await
    }

    async fn save_rule_chain(&self, chain: RuleChain) -> ServiceResult<RuleChain> {
        self.inner.save_rule_chain(chain).await
    }

    async fn save_rule_chain_metadata(
        &self,
        metadata: RuleChainMetaData,
    ) -> ServiceResult<RuleChainMetaData> {
        if self.reject_saves.get() {
            return Err(ServiceError::Remote("store unavailable".to_string()));
        }
        self.inner.save_rule_chain_metadata(metadata).await
    }

    fn component_by_clazz(&self, clazz: &str) -> Option<Arc<ComponentDescriptor>> {
        self.inner.component_by_clazz(clazz)
    }
}
