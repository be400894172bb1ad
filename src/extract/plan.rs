use crate::codec::node_record;
use crate::component::RULE_CHAIN_OUTPUT_CLAZZ;
use crate::config::EditorConfig;
use crate::error::ExtractionError;
use crate::graph::labels;
use crate::graph::{ConnectorId, Edge, EdgeKey, GraphModel, Node, NodeId, Position};
use crate::metadata::{AdditionalInfo, NodeConnectionInfo, RuleChainMetaData, RuleNodeRecord};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// Axis-aligned bounding box over node positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn around<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        nodes.into_iter().fold(
            Self {
                min_x: f64::INFINITY,
                min_y: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |b, node| Self {
                min_x: b.min_x.min(node.position.x),
                min_y: b.min_y.min(node.position.y),
                max_x: b.max_x.max(node.position.x),
                max_y: b.max_y.max(node.position.y),
            },
        )
    }

    pub fn centroid(&self) -> Position {
        Position::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Everything computed about a selection before anything is persisted or mutated.
#[derive(Debug, Clone)]
pub struct ExtractionPlan {
    /// Selected rule nodes in graph order; their position here is their nested index.
    pub nodes: Vec<NodeId>,
    /// Edges with both endpoints inside the selection.
    pub internal: Vec<EdgeKey>,
    /// Edges entering the selection from outside, including from the input node.
    pub inbound: Vec<Edge>,
    /// Edges leaving the selection, in selection order.
    pub outbound: Vec<Edge>,
    /// The nested chain's first node, if the selection has exactly one entry point.
    pub entry: Option<NodeId>,
    pub bounds: Bounds,
    /// Nested chain metadata, not yet bound to a rule chain id.
    pub metadata: RuleChainMetaData,
}

/// Classifies the selection and synthesizes the nested chain.
///
/// Internal and boundary edges are discovered from the whole graph, so selecting the edges
/// themselves is not required. The input node and rule chain link targets are never part
/// of a selection; links into the latter leave the nested chain through an output.
pub fn plan_extraction(
    graph: &GraphModel,
    selection: &[NodeId],
    config: &EditorConfig,
) -> Result<ExtractionPlan, ExtractionError> {
    let selected: AHashSet<NodeId> = selection
        .iter()
        .copied()
        .filter(|id| !graph.is_input_node(*id))
        .filter(|id| {
            graph
                .node(*id)
                .is_some_and(|n| !n.component.is_rule_chain_link())
        })
        .collect();
    let members: Vec<&Node> = graph
        .rule_nodes()
        .filter(|n| selected.contains(&n.id))
        .collect();
    if members.len() < 2 {
        return Err(ExtractionError::TooFewNodes {
            count: members.len(),
        });
    }

    let inside = |connector: ConnectorId| {
        graph
            .node_by_connector(connector)
            .is_some_and(|n| selected.contains(&n.id))
    };

    let internal: Vec<&Edge> = graph
        .edges()
        .iter()
        .filter(|e| inside(e.source) && inside(e.destination))
        .collect();
    let inbound: Vec<Edge> = graph
        .edges()
        .iter()
        .filter(|e| !inside(e.source) && inside(e.destination))
        .cloned()
        .collect();
    let outbound: Vec<Edge> = members
        .iter()
        .filter_map(|n| n.output_connector())
        .flat_map(|out| graph.edges_from(out))
        .filter(|e| !inside(e.destination))
        .cloned()
        .collect();

    let entry = entry_point(&members, &internal)?;

    let index: AHashMap<NodeId, usize> = members
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id, i))
        .collect();
    let index_of = |connector: ConnectorId| {
        graph
            .node_by_connector(connector)
            .and_then(|n| index.get(&n.id).copied())
    };

    let bounds = Bounds::around(members.iter().copied());
    let delta_x = bounds.min_x - config.nested_anchor.x;
    let delta_y = bounds.min_y - config.nested_anchor.y;

    let mut nodes: Vec<RuleNodeRecord> = members
        .iter()
        .map(|node| {
            let mut record = node_record(node);
            record.id = None;
            record.additional_info.layout_x = (node.position.x - delta_x).round();
            record.additional_info.layout_y = (node.position.y - delta_y).round();
            record
        })
        .collect();

    let mut connections: Vec<NodeConnectionInfo> = internal
        .iter()
        .filter_map(|e| Some((index_of(e.source)?, index_of(e.destination)?, &e.labels)))
        .flat_map(|(from, to, edge_labels)| {
            labels::expand(from, to, edge_labels)
                .map(|(from, to, label)| NodeConnectionInfo::new(from, to, label))
                .collect_vec()
        })
        .collect();

    let output_x = (bounds.max_x - delta_x + config.output_column_gap).round();
    for (i, edge) in outbound.iter().enumerate() {
        let Some(from) = index_of(edge.source) else {
            continue;
        };
        let to = nodes.len();
        nodes.push(output_placeholder(
            &edge.label(),
            output_x,
            (config.nested_anchor.y + i as f64 * config.output_row_spacing).round(),
        ));
        connections.extend(
            labels::expand(from, to, &edge.labels)
                .map(|(from, to, label)| NodeConnectionInfo::new(from, to, label)),
        );
    }

    Ok(ExtractionPlan {
        nodes: members.iter().map(|n| n.id).collect(),
        internal: internal.iter().map(|e| e.key()).collect(),
        inbound,
        outbound,
        entry,
        bounds,
        metadata: RuleChainMetaData {
            rule_chain_id: None,
            version: None,
            first_node_index: entry.and_then(|id| index.get(&id).copied()),
            nodes,
            connections,
            ..Default::default()
        },
    })
}

/// Nodes that accept input but receive nothing from inside the selection. More than one
/// makes the nested chain's start ambiguous.
fn entry_point(members: &[&Node], internal: &[&Edge]) -> Result<Option<NodeId>, ExtractionError> {
    let fed: AHashSet<ConnectorId> = internal.iter().map(|e| e.destination).collect();
    let candidates: Vec<NodeId> = members
        .iter()
        .filter(|n| n.component.in_enabled())
        .filter(|n| n.input_connector().is_some_and(|c| !fed.contains(&c)))
        .map(|n| n.id)
        .collect();
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.first().copied()),
        _ => Err(ExtractionError::AmbiguousEntryPoint { candidates }),
    }
}

fn output_placeholder(name: &str, layout_x: f64, layout_y: f64) -> RuleNodeRecord {
    RuleNodeRecord {
        id: None,
        node_type: RULE_CHAIN_OUTPUT_CLAZZ.to_string(),
        name: name.to_string(),
        configuration: serde_json::Value::Object(Default::default()),
        configuration_version: 0,
        additional_info: AdditionalInfo {
            layout_x,
            layout_y,
            ..Default::default()
        },
        debug_settings: None,
        singleton_mode: None,
        queue_name: None,
    }
}
