use super::RuleChainService;
use crate::component::{ComponentCatalog, ComponentDescriptor};
use crate::error::ServiceError;
use crate::metadata::{RuleChain, RuleChainMetaData};
use ahash::AHashMap;
use std::cell::{Cell, RefCell};
use std::sync::Arc;

/// A local stand-in for the remote rule-chain store.
///
/// Assigns chain and rule-node ids, versions metadata and rejects stale writes the way the
/// remote store does. Not shareable across threads.
#[derive(Debug, Default)]
pub struct InMemoryRuleChainStore {
    catalog: ComponentCatalog,
    chains: RefCell<AHashMap<String, RuleChain>>,
    metadata: RefCell<AHashMap<String, RuleChainMetaData>>,
    next_id: Cell<u64>,
}

impl InMemoryRuleChainStore {
    pub fn new(catalog: ComponentCatalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    /// Seeds the store with an existing chain, returning its id.
    pub fn insert(&self, chain: RuleChain, metadata: RuleChainMetaData) -> String {
        let id = chain.id.clone().unwrap_or_else(|| self.fresh_id("rule-chain"));
        let chain = RuleChain {
            id: Some(id.clone()),
            ..chain
        };
        let version = metadata_version(&metadata);
        let metadata = self.canonicalize(&id, metadata, version);
        self.chains.borrow_mut().insert(id.clone(), chain);
        self.metadata.borrow_mut().insert(id.clone(), metadata);
        id
    }

    /// Stored metadata, bypassing the async interface.
    pub fn stored_metadata(&self, id: &str) -> Option<RuleChainMetaData> {
        self.metadata.borrow().get(id).cloned()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.borrow().len()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        format!("{}-{}", prefix, next)
    }

    fn canonicalize(
        &self,
        id: &str,
        mut metadata: RuleChainMetaData,
        version: i64,
    ) -> RuleChainMetaData {
        metadata.rule_chain_id = Some(id.to_string());
        metadata.version = Some(version);
        for node in &mut metadata.nodes {
            if node.id.is_none() {
                node.id = Some(self.fresh_id("rule-node"));
            }
        }
        metadata
    }
}

fn metadata_version(metadata: &RuleChainMetaData) -> i64 {
    metadata.version.unwrap_or(1)
}

impl RuleChainService for InMemoryRuleChainStore {
    async fn get_rule_chain(&self, id: &str) -> Result<RuleChain, ServiceError> {
        self.chains
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn get_rule_chain_metadata(&self, id: &str) -> Result<RuleChainMetaData, ServiceError> {
        self.stored_metadata(id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn save_rule_chain(&self, chain: RuleChain) -> Result<RuleChain, ServiceError> {
        let id = match &chain.id {
            Some(id) if self.chains.borrow().contains_key(id) => id.clone(),
            Some(id) => return Err(ServiceError::NotFound(id.clone())),
            None => self.fresh_id("rule-chain"),
        };
        let chain = RuleChain {
            id: Some(id.clone()),
            ..chain
        };
        self.chains.borrow_mut().insert(id.clone(), chain.clone());
        self.metadata
            .borrow_mut()
            .entry(id.clone())
            .or_insert_with(|| RuleChainMetaData {
                rule_chain_id: Some(id),
                version: Some(1),
                ..Default::default()
            });
        Ok(chain)
    }

    async fn save_rule_chain_metadata(
        &self,
        metadata: RuleChainMetaData,
    ) -> Result<RuleChainMetaData, ServiceError> {
        let id = metadata
            .rule_chain_id
            .clone()
            .ok_or_else(|| ServiceError::Remote("Metadata has no rule chain id".to_string()))?;
        let stored_version = self
            .metadata
            .borrow()
            .get(&id)
            .map(metadata_version)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        if metadata.version.is_some_and(|v| v != stored_version) {
            return Err(ServiceError::Conflict {
                rule_chain_id: id,
                expected: metadata.version,
                actual: Some(stored_version),
            });
        }
        let canonical = self.canonicalize(&id, metadata, stored_version + 1);
        self.metadata
            .borrow_mut()
            .insert(id.clone(), canonical.clone());
        tracing::debug!("Stored metadata for '{}' at version {}", id, stored_version + 1);
        Ok(canonical)
    }

    fn component_by_clazz(&self, clazz: &str) -> Option<Arc<ComponentDescriptor>> {
        self.catalog.get(clazz)
    }
}
