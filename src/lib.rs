//! # rulegraph - Rule Chain Graph Engine
//!
//! **rulegraph** is the editing core behind a visual rule-chain designer. A rule chain is a
//! directed graph of typed processing nodes joined by labeled links; this crate owns the
//! in-memory graph, converts it to and from the compact index-based form rule chains are
//! stored in, and implements the structural edits an editor needs: copy/paste of node
//! selections and carving a selection out into a nested rule chain.
//!
//! ## Core Workflow
//!
//! 1.  **Describe Your Components**: Load a [`ComponentCatalog`](component::ComponentCatalog)
//!     describing the node types (which ports they have, which link labels they emit).
//! 2.  **Decode**: Turn stored [`RuleChainMetaData`](metadata::RuleChainMetaData) into a
//!     [`GraphModel`](graph::GraphModel) with [`codec::decode`].
//! 3.  **Edit**: Mutate the graph through its primitives or the [`Mutation`](graph::Mutation)
//!     command API. A synthetic, read-only input node marks where messages enter.
//! 4.  **Encode**: Turn the graph back into metadata with [`codec::encode`].
//!
//! [`editor::RuleChainEditor`] wraps these steps around a
//! [`RuleChainService`](service::RuleChainService) for save/revert, clipboard and nested
//! chain extraction.
//!
//! ## Quick Start
//!
//! ```rust
//! use rulegraph::prelude::*;
//! use std::sync::Arc;
//!
//! let filter = ComponentDescriptor::new(
//!     ComponentKind::Filter,
//!     "org.example.CheckTemperature",
//!     "check temperature",
//!     NodeDefinition {
//!         in_enabled: true,
//!         out_enabled: true,
//!         relation_types: vec!["True".to_string(), "False".to_string()],
//!         ..Default::default()
//!     },
//! );
//! let catalog = ComponentCatalog::new().with_component(filter);
//! let component = catalog.get("org.example.CheckTemperature").unwrap();
//!
//! let mut graph = GraphModel::default();
//! let check = graph.add_node(Arc::clone(&component), Position::new(300.0, 150.0));
//! let alarm = graph.add_node(component, Position::new(600.0, 150.0));
//!
//! let input = graph.input_connector();
//! let check_in = graph.node(check).and_then(|n| n.input_connector()).unwrap();
//! let check_out = graph.node(check).and_then(|n| n.output_connector()).unwrap();
//! let alarm_in = graph.node(alarm).and_then(|n| n.input_connector()).unwrap();
//! graph.add_edge(input, check_in, &[]);
//! graph.add_edge(check_out, alarm_in, &["True".to_string()]);
//!
//! let metadata = encode(&graph);
//! assert_eq!(metadata.first_node_index, Some(0));
//! assert_eq!(metadata.connections.len(), 1);
//!
//! let decoded = decode(&metadata, &catalog, &EditorConfig::default());
//! assert_eq!(decoded.edges().len(), 2);
//! ```

pub mod clipboard;
pub mod codec;
pub mod component;
pub mod config;
pub mod editor;
pub mod error;
pub mod extract;
pub mod graph;
pub mod metadata;
pub mod prelude;
pub mod service;
