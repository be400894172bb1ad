use crate::graph::labels;
use crate::graph::{Edge, GraphModel, Node, NodeId};
use crate::metadata::{
    AdditionalInfo, EntityRef, NodeConnectionInfo, RuleChainConnectionInfo, RuleChainMetaData,
    RuleNodeRecord,
};
use ahash::AHashMap;

/// Converts a graph into its persisted, index-based form.
///
/// The input node is never emitted; the node it feeds becomes `first_node_index`. Links
/// into rule chain link targets are written as rule chain connections.
pub fn encode(graph: &GraphModel) -> RuleChainMetaData {
    let mut indices: AHashMap<NodeId, usize> = AHashMap::new();
    let nodes: Vec<RuleNodeRecord> = graph
        .rule_nodes()
        .filter(|node| !node.component.is_rule_chain_link())
        .enumerate()
        .map(|(index, node)| {
            indices.insert(node.id, index);
            node_record(node)
        })
        .collect();

    let index_of = |connector| {
        graph
            .node_by_connector(connector)
            .and_then(|node| indices.get(&node.id).copied())
    };

    let first_node_index = graph
        .edges_from(graph.input_connector())
        .find_map(|edge| index_of(edge.destination));

    let links_into = |edge: &Edge| {
        graph
            .node_by_connector(edge.destination)
            .is_some_and(|node| node.component.is_rule_chain_link())
    };

    let connections = graph
        .edges()
        .iter()
        .filter(|edge| edge.source != graph.input_connector())
        .filter(|edge| !links_into(edge))
        .filter_map(|edge| {
            let from = index_of(edge.source)?;
            let to = index_of(edge.destination)?;
            Some(
                labels::expand(from, to, &edge.labels)
                    .map(|(from, to, label)| NodeConnectionInfo::new(from, to, label))
                    .collect::<Vec<_>>(),
            )
        })
        .flatten()
        .collect();

    let rule_chain_connections = graph
        .edges()
        .iter()
        .filter(|edge| links_into(edge))
        .filter_map(|edge| {
            let from_index = index_of(edge.source)?;
            let target = graph.node_by_connector(edge.destination)?;
            Some(
                edge.labels
                    .iter()
                    .map(|label| chain_link(from_index, target, label))
                    .collect::<Vec<_>>(),
            )
        })
        .flatten()
        .collect();

    RuleChainMetaData {
        rule_chain_id: graph.chain().rule_chain_id.clone(),
        version: graph.chain().version,
        first_node_index,
        nodes,
        connections,
        rule_chain_connections,
        extra: graph.chain().extra.clone(),
    }
}

fn chain_link(from_index: usize, target: &Node, label: &str) -> RuleChainConnectionInfo {
    let position = target.position.rounded();
    let target_chain = target.configuration["ruleChainId"].as_str().unwrap_or_default();
    let mut extra = target.additional_info.clone();
    extra
        .entry(RuleChainConnectionInfo::TARGET_NODE_KEY)
        .or_insert_with(|| target.id.to_string().into());
    RuleChainConnectionInfo {
        from_index,
        target_rule_chain_id: EntityRef::rule_chain(target_chain),
        additional_info: AdditionalInfo {
            layout_x: position.x,
            layout_y: position.y,
            description: target.description.clone(),
            extra,
        },
        label: label.to_string(),
    }
}

/// The persisted record for one node, with its layout rounded to whole pixels.
pub(crate) fn node_record(node: &Node) -> RuleNodeRecord {
    let position = node.position.rounded();
    RuleNodeRecord {
        id: node.rule_node_id.clone(),
        node_type: node.component.clazz.clone(),
        name: node.name.clone(),
        configuration: node.configuration.clone(),
        configuration_version: node.configuration_version,
        additional_info: AdditionalInfo {
            layout_x: position.x,
            layout_y: position.y,
            description: node.description.clone(),
            extra: node.additional_info.clone(),
        },
        debug_settings: node.debug_settings.clone(),
        singleton_mode: node.singleton_mode,
        queue_name: node.queue_name.clone(),
    }
}
