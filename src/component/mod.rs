mod descriptor;

pub use descriptor::*;

use crate::error::ConfigError;
use ahash::AHashMap;
use std::fs;
use std::sync::Arc;

/// Looks up component descriptors by their class identifier.
pub trait ComponentResolver {
    fn resolve(&self, clazz: &str) -> Option<Arc<ComponentDescriptor>>;
}

/// Registry of all component types an editor knows about.
///
/// The built-in flow components (nested-chain input and output) are always registered.
#[derive(Debug, Clone)]
pub struct ComponentCatalog {
    components: AHashMap<String, Arc<ComponentDescriptor>>,
}

impl Default for ComponentCatalog {
    fn default() -> Self {
        let mut catalog = Self {
            components: AHashMap::new(),
        };
        catalog.register(ComponentDescriptor::rule_chain_input());
        catalog.register(ComponentDescriptor::rule_chain_output());
        catalog
    }
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a JSON array of component descriptors.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let descriptors: Vec<ComponentDescriptor> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.register(descriptor);
        }
        Ok(catalog)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn register(&mut self, descriptor: ComponentDescriptor) -> Arc<ComponentDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.components
            .insert(descriptor.clazz.clone(), Arc::clone(&descriptor));
        descriptor
    }

    pub fn with_component(mut self, descriptor: ComponentDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, clazz: &str) -> Option<Arc<ComponentDescriptor>> {
        self.components.get(clazz).cloned()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// All registered components of one kind, sorted by name.
    pub fn by_kind(&self, kind: ComponentKind) -> Vec<Arc<ComponentDescriptor>> {
        let mut found: Vec<_> = self
            .components
            .values()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}

impl ComponentResolver for ComponentCatalog {
    fn resolve(&self, clazz: &str) -> Option<Arc<ComponentDescriptor>> {
        self.get(clazz)
    }
}
