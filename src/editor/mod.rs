use crate::clipboard::{self, ClipboardBuffer, MemoryClipboard};
use crate::codec::{decode, encode};
use crate::config::EditorConfig;
use crate::error::{EditorError, GraphError, ServiceError};
use crate::extract::{self, NestedChain};
use crate::graph::{GraphModel, Mutation, MutationOutcome, NodeId};
use crate::metadata::{RuleChain, RuleChainMetaData};
use crate::service::{RuleChainService, ServiceResolver};

/// How a save request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The model was stored and replaced by the service's canonical copy.
    Saved,
    /// The store reported a concurrent modification; the model now mirrors the stored copy.
    Reconciled,
    /// Nothing to save.
    Unchanged,
}

/// One open rule chain: the graph being edited plus its last known-good metadata.
pub struct RuleChainEditor<S, B = MemoryClipboard> {
    service: S,
    clipboard: B,
    config: EditorConfig,
    chain: RuleChain,
    last_saved: RuleChainMetaData,
    graph: GraphModel,
}

impl<S: RuleChainService, B: ClipboardBuffer> RuleChainEditor<S, B> {
    /// Loads chain `id` and decodes it into a fresh graph.
    pub async fn open(
        service: S,
        clipboard: B,
        config: EditorConfig,
        id: &str,
    ) -> Result<Self, EditorError> {
        let chain = service.get_rule_chain(id).await?;
        let metadata = service.get_rule_chain_metadata(id).await?;
        let graph = decode(&metadata, &ServiceResolver(&service), &config);
        tracing::info!("Opened rule chain '{}' ({} nodes)", chain.name, metadata.nodes.len());
        Ok(Self {
            service,
            clipboard,
            config,
            chain,
            last_saved: metadata,
            graph,
        })
    }

    /// Creates a new, empty chain called `name` and opens it.
    pub async fn create(
        service: S,
        clipboard: B,
        config: EditorConfig,
        name: &str,
    ) -> Result<Self, EditorError> {
        let chain = service.save_rule_chain(RuleChain::named(name)).await?;
        let id = chain
            .id
            .clone()
            .ok_or_else(|| ServiceError::Remote("Saved rule chain has no id".to_string()))?;
        Self::open(service, clipboard, config, &id).await
    }

    pub fn chain(&self) -> &RuleChain {
        &self.chain
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut GraphModel {
        &mut self.graph
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn clipboard(&self) -> &B {
        &self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The metadata the graph was last decoded from.
    pub fn last_saved(&self) -> &RuleChainMetaData {
        &self.last_saved
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, GraphError> {
        self.graph.apply(mutation)
    }

    /// Runs deferred work (validation). Returns `true` when validity changed.
    pub fn tick(&mut self) -> bool {
        self.graph.tick()
    }

    pub fn is_dirty(&self) -> bool {
        self.graph.is_dirty()
    }

    pub fn is_invalid(&self) -> bool {
        self.graph.is_invalid()
    }

    pub fn can_save(&self) -> bool {
        self.is_dirty() && !self.is_invalid()
    }

    /// Persists the graph.
    ///
    /// On success the graph is replaced by a decode of the service's canonical response.
    /// A version conflict is resolved by adopting the stored copy. Any other failure leaves
    /// the graph as it was.
    pub async fn save(&mut self) -> Result<SaveOutcome, EditorError> {
        self.graph.tick();
        if self.graph.is_invalid() {
            return Err(EditorError::InvalidChain);
        }
        if !self.graph.is_dirty() {
            return Ok(SaveOutcome::Unchanged);
        }
        let mut metadata = encode(&self.graph);
        metadata.rule_chain_id = self.chain.id.clone();

        match self.service.save_rule_chain_metadata(metadata).await {
            Ok(saved) => {
                tracing::info!("Saved rule chain '{}'", self.chain.name);
                self.reload(saved);
                Ok(SaveOutcome::Saved)
            }
            Err(ServiceError::Conflict {
                rule_chain_id,
                expected,
                actual,
            }) => {
                tracing::warn!(
                    "Rule chain '{}' changed remotely ({:?} vs {:?}), reloading stored copy",
                    rule_chain_id,
                    expected,
                    actual
                );
                let canonical = self
                    .service
                    .get_rule_chain_metadata(&rule_chain_id)
                    .await?;
                self.reload(canonical);
                Ok(SaveOutcome::Reconciled)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Discards unsaved edits.
    pub fn revert(&mut self) {
        tracing::info!("Reverting rule chain '{}'", self.chain.name);
        self.graph = decode(
            &self.last_saved,
            &ServiceResolver(&self.service),
            &self.config,
        );
    }

    /// Copies the current selection. Returns the number of nodes copied.
    pub fn copy(&mut self) -> usize {
        clipboard::copy_selection(&self.graph, &mut self.clipboard)
    }

    pub fn can_paste(&self) -> bool {
        self.clipboard.has_buffered()
    }

    pub fn paste(&mut self, x: f64, y: f64) -> Option<Vec<NodeId>> {
        clipboard::paste_into(
            &mut self.graph,
            &self.clipboard,
            &ServiceResolver(&self.service),
            x,
            y,
        )
    }

    fn selected_node_ids(&self) -> Vec<NodeId> {
        self.graph.selected_nodes().iter().map(|n| n.id).collect()
    }

    pub fn can_extract(&self) -> bool {
        extract::can_extract(&self.graph, &self.selected_node_ids())
    }

    /// Moves the selected nodes into a new nested chain called `name`.
    pub async fn extract_selection(&mut self, name: &str) -> Result<NestedChain, EditorError> {
        let selection = self.selected_node_ids();
        let nested = extract::extract(
            &mut self.graph,
            &selection,
            name,
            &self.service,
            &self.config,
        )
        .await?;
        Ok(nested)
    }

    fn reload(&mut self, metadata: RuleChainMetaData) {
        self.graph = decode(&metadata, &ServiceResolver(&self.service), &self.config);
        self.last_saved = metadata;
    }
}
