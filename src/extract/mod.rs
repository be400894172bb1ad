//! Carving a selected region of a rule chain out into a nested rule chain.
//!
//! Extraction runs in three steps: [`plan_extraction`] classifies the selection and builds
//! the nested metadata without touching the graph, the remote service persists that
//! metadata, and only then [`commit`] replaces the selection with a single reference node
//! wired to everything the selection used to be connected to.

mod plan;

pub use plan::{Bounds, ExtractionPlan, plan_extraction};

use crate::component::ComponentDescriptor;
use crate::config::EditorConfig;
use crate::error::{ExtractionError, ServiceError};
use crate::graph::{GraphModel, NodeId, NodeSpec, Selectable};
use crate::metadata::{RuleChain, RuleChainMetaData};
use crate::service::RuleChainService;
use std::sync::Arc;

/// Result of a successful extraction.
#[derive(Debug, Clone)]
pub struct NestedChain {
    pub chain: RuleChain,
    pub metadata: RuleChainMetaData,
    /// The node that now stands in for the extracted selection in the parent graph.
    pub reference_node: NodeId,
}

/// Whether `selection` can be extracted: at least two rule nodes and at most one entry point.
pub fn can_extract(graph: &GraphModel, selection: &[NodeId]) -> bool {
    plan_extraction(graph, selection, &EditorConfig::default()).is_ok()
}

/// Extracts `selection` into a new nested rule chain called `name`.
///
/// The graph is left untouched unless the nested chain was persisted successfully.
pub async fn extract<S: RuleChainService>(
    graph: &mut GraphModel,
    selection: &[NodeId],
    name: &str,
    service: &S,
    config: &EditorConfig,
) -> Result<NestedChain, ExtractionError> {
    let plan = plan_extraction(graph, selection, config)?;

    let chain = service.save_rule_chain(RuleChain::named(name)).await?;
    let chain_id = chain
        .id
        .clone()
        .ok_or_else(|| ServiceError::Remote("Saved rule chain has no id".to_string()))?;
    let metadata = RuleChainMetaData {
        rule_chain_id: Some(chain_id.clone()),
        ..plan.metadata.clone()
    };
    let metadata = service.save_rule_chain_metadata(metadata).await?;

    let reference_node = commit(graph, &plan, &chain_id, name);
    Ok(NestedChain {
        chain,
        metadata,
        reference_node,
    })
}

/// Replaces the planned selection with a reference to the nested chain `rule_chain_id`.
///
/// Inbound boundary edges are redirected to the reference node's input, outbound ones leave
/// from its output; edges that end up sharing endpoints are merged.
pub fn commit(
    graph: &mut GraphModel,
    plan: &ExtractionPlan,
    rule_chain_id: &str,
    name: &str,
) -> NodeId {
    for id in &plan.nodes {
        graph.remove_node(*id);
    }

    let spec = NodeSpec::new(
        Arc::new(ComponentDescriptor::rule_chain_input()),
        plan.bounds.centroid(),
    )
    .named(name)
    .with_configuration(serde_json::json!({ "ruleChainId": rule_chain_id }));
    let reference = graph.insert_node(spec);
    let (reference_in, reference_out) = graph
        .node(reference)
        .map(|n| (n.input_connector(), n.output_connector()))
        .unwrap_or_default();

    if let Some(destination) = reference_in {
        for edge in &plan.inbound {
            graph.add_edge(edge.source, destination, &edge.labels);
        }
    }
    if let Some(source) = reference_out {
        for edge in &plan.outbound {
            graph.add_edge(source, edge.destination, &edge.labels);
        }
    }

    graph.deselect_all();
    graph.select(Selectable::Node(reference));
    graph.mark_dirty();
    graph.tick();
    tracing::info!(
        "Extracted {} nodes into nested rule chain '{}' ({})",
        plan.nodes.len(),
        name,
        rule_chain_id
    );
    reference
}
