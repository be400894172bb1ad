//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the rulegraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use rulegraph::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let catalog = ComponentCatalog::from_file("path/to/components.json")?;
//! let metadata = RuleChainMetaData::from_json(&std::fs::read_to_string("path/to/chain.json")?)?;
//!
//! let graph = decode(&metadata, &catalog, &EditorConfig::default());
//! println!("{} nodes, {} links", graph.nodes().len(), graph.edges().len());
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{
    ConnectorId, Direction, Edge, EdgeKey, GraphEvent, GraphModel, Mutation, MutationOutcome,
    Node, NodeId, NodeSpec, Position, Selectable,
};

// Components
pub use crate::component::{
    ComponentCatalog, ComponentDescriptor, ComponentKind, ComponentResolver, NodeDefinition,
};

// Persistence
pub use crate::codec::{decode, encode};
pub use crate::metadata::{
    EntityRef, NodeConnectionInfo, RuleChain, RuleChainConnectionInfo, RuleChainMetaData,
    RuleNodeRecord,
};
pub use crate::service::{InMemoryRuleChainStore, RuleChainService};

// Editing operations
pub use crate::clipboard::{ClipboardBuffer, MemoryClipboard};
pub use crate::config::EditorConfig;
pub use crate::editor::{RuleChainEditor, SaveOutcome};
pub use crate::extract::{NestedChain, can_extract, plan_extraction};

// Error types
pub use crate::error::{EditorError, ExtractionError, GraphError, ServiceError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
