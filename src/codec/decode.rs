use crate::component::{ComponentDescriptor, ComponentResolver};
use crate::config::EditorConfig;
use crate::graph::{ChainIdentity, ConnectorId, GraphModel, Node, NodeId, NodeSpec, Position};
use crate::metadata::{RuleChainConnectionInfo, RuleChainMetaData, RuleNodeRecord};
use ahash::AHashMap;
use std::sync::Arc;

/// Builds a fresh [`GraphModel`] from persisted metadata.
///
/// Malformed input (dangling indices, connections to nodes without the needed port) is
/// dropped rather than reported; nodes whose component cannot be resolved are kept with an
/// error so the chain is flagged invalid instead of losing data. Legacy rule chain
/// connections become link target nodes, one per `ruleChainNodeId`.
pub fn decode(
    metadata: &RuleChainMetaData,
    resolver: &impl ComponentResolver,
    config: &EditorConfig,
) -> GraphModel {
    let mut graph = GraphModel::new(config.input_node_position);
    graph.set_chain(ChainIdentity {
        rule_chain_id: metadata.rule_chain_id.clone(),
        version: metadata.version,
        extra: metadata.extra.clone(),
    });

    let nodes: Vec<NodeId> = metadata
        .nodes
        .iter()
        .map(|record| graph.insert_node(node_spec(record, resolver)))
        .collect();

    if let Some(index) = metadata.first_node_index {
        match input_of(&graph, &nodes, index) {
            Some(destination) => {
                let input = graph.input_connector();
                graph.add_edge(input, destination, &[]);
            }
            None => tracing::debug!("First node index {} has no input port, ignoring", index),
        }
    }

    for connection in &metadata.connections {
        let source = output_of(&graph, &nodes, connection.from_index);
        let destination = input_of(&graph, &nodes, connection.to_index);
        match (source, destination) {
            (Some(source), Some(destination)) => {
                graph.add_edge(source, destination, std::slice::from_ref(&connection.label));
            }
            _ => tracing::debug!(
                "Dropping connection {} -> {} ({}): unresolved endpoint",
                connection.from_index,
                connection.to_index,
                connection.label
            ),
        }
    }

    decode_chain_links(&mut graph, &nodes, &metadata.rule_chain_connections);

    graph.take_events();
    graph.mark_clean();
    graph.schedule_validation();
    graph.tick();
    graph
}

fn decode_chain_links(
    graph: &mut GraphModel,
    nodes: &[NodeId],
    links: &[RuleChainConnectionInfo],
) {
    let link_component = Arc::new(ComponentDescriptor::rule_chain_link());
    let mut targets: AHashMap<String, ConnectorId> = AHashMap::new();
    for link in links {
        let Some(key) = link.target_node_key() else {
            tracing::debug!(
                "Dropping rule chain connection from {} without a target node",
                link.from_index
            );
            continue;
        };
        let Some(destination) = targets.get(&key).copied().or_else(|| {
            let info = &link.additional_info;
            let spec = NodeSpec {
                name: link.target_rule_chain_id.id.clone(),
                configuration: serde_json::json!({ "ruleChainId": link.target_rule_chain_id.id }),
                description: info.description.clone(),
                additional_info: info.extra.clone(),
                ..NodeSpec::new(
                    Arc::clone(&link_component),
                    Position::new(info.layout_x, info.layout_y).rounded(),
                )
            };
            let id = graph.insert_node(spec);
            let connector = graph.node(id).and_then(Node::input_connector)?;
            targets.insert(key, connector);
            Some(connector)
        }) else {
            continue;
        };
        match output_of(graph, nodes, link.from_index) {
            Some(source) => {
                graph.add_edge(source, destination, std::slice::from_ref(&link.label));
            }
            None => tracing::debug!(
                "Dropping rule chain connection from {} ({}): unresolved source",
                link.from_index,
                link.label
            ),
        }
    }
}

fn node_spec(record: &RuleNodeRecord, resolver: &impl ComponentResolver) -> NodeSpec {
    let (component, error) = match resolver.resolve(&record.node_type) {
        Some(component) => (component, None),
        None => {
            tracing::warn!(
                "Rule node '{}' uses unknown component '{}'",
                record.name,
                record.node_type
            );
            (
                Arc::new(ComponentDescriptor::unknown(&record.node_type)),
                Some(format!("Unresolved component '{}'", record.node_type)),
            )
        }
    };
    let info = &record.additional_info;
    NodeSpec {
        component,
        rule_node_id: record.id.clone(),
        name: record.name.clone(),
        configuration: record.configuration.clone(),
        configuration_version: record.configuration_version,
        description: info.description.clone(),
        debug_settings: record.debug_settings.clone(),
        singleton_mode: record.singleton_mode,
        queue_name: record.queue_name.clone(),
        additional_info: info.extra.clone(),
        position: Position::new(info.layout_x, info.layout_y).rounded(),
        error,
    }
}

fn input_of(graph: &GraphModel, nodes: &[NodeId], index: usize) -> Option<ConnectorId> {
    nodes
        .get(index)
        .and_then(|id| graph.node(*id))
        .and_then(Node::input_connector)
}

fn output_of(graph: &GraphModel, nodes: &[NodeId], index: usize) -> Option<ConnectorId> {
    nodes
        .get(index)
        .and_then(|id| graph.node(*id))
        .and_then(Node::output_connector)
}
