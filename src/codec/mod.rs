//! Conversion between the id-based [`GraphModel`](crate::graph::GraphModel) and the
//! index-based [`RuleChainMetaData`](crate::metadata::RuleChainMetaData).
//!
//! `decode(encode(g))` reproduces `g` up to id renumbering: same node data in the same
//! order, same edges with the same label lists.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::encode;
pub(crate) use encode::node_record;
