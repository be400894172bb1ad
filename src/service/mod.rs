//! Remote rule-chain persistence, as consumed by the editor and the extractor.

mod memory;

pub use memory::InMemoryRuleChainStore;

use crate::component::ComponentDescriptor;
use crate::error::ServiceError;
use crate::metadata::{RuleChain, RuleChainMetaData};
use std::sync::Arc;

/// The chain-persistence collaborator.
///
/// Futures returned by this trait are awaited on the editor's own task; the engine never
/// mutates a graph while one is pending.
#[allow(async_fn_in_trait)]
pub trait RuleChainService {
    async fn get_rule_chain(&self, id: &str) -> Result<RuleChain, ServiceError>;

    async fn get_rule_chain_metadata(&self, id: &str) -> Result<RuleChainMetaData, ServiceError>;

    /// Creates or updates a chain header, returning it with its assigned id.
    async fn save_rule_chain(&self, chain: RuleChain) -> Result<RuleChain, ServiceError>;

    /// Stores chain metadata and returns the canonical, re-versioned copy.
    ///
    /// Must fail with [`ServiceError::Conflict`] when `metadata.version` is stale.
    async fn save_rule_chain_metadata(
        &self,
        metadata: RuleChainMetaData,
    ) -> Result<RuleChainMetaData, ServiceError>;

    fn component_by_clazz(&self, clazz: &str) -> Option<Arc<ComponentDescriptor>>;

    fn supported_link_labels(&self, component: &ComponentDescriptor) -> Vec<String> {
        component.supported_link_labels().to_vec()
    }

    fn allows_custom_links(&self, component: &ComponentDescriptor) -> bool {
        component.allows_custom_links()
    }
}

/// Adapts a service's component lookup to the codec's resolver seam.
pub struct ServiceResolver<'a, S: ?Sized>(pub &'a S);

impl<S: RuleChainService + ?Sized> crate::component::ComponentResolver for ServiceResolver<'_, S> {
    fn resolve(&self, clazz: &str) -> Option<Arc<ComponentDescriptor>> {
        self.0.component_by_clazz(clazz)
    }
}
