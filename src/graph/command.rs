use super::{ConnectorId, EdgeKey, GraphModel, NodeId, NodeSpec, Position, Selectable};
use crate::error::GraphError;

/// One editing command. Applied through [`GraphModel::apply`].
#[derive(Debug, Clone)]
pub enum Mutation {
    AddNode(NodeSpec),
    RemoveNode(NodeId),
    MoveNode {
        node: NodeId,
        position: Position,
    },
    UpdateNode {
        node: NodeId,
        name: String,
        configuration: serde_json::Value,
        description: Option<String>,
    },
    SetNodeError {
        node: NodeId,
        error: Option<String>,
    },
    AddEdge {
        source: ConnectorId,
        destination: ConnectorId,
        labels: Vec<String>,
    },
    RemoveEdge(EdgeKey),
    SetEdgeLabels {
        edge: EdgeKey,
        labels: Vec<String>,
    },
    Select(Selectable),
    Deselect(Selectable),
    SelectAll,
    DeselectAll,
    DeleteSelected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    NodeAdded(NodeId),
    EdgeAdded(EdgeKey),
    Removed(usize),
    Applied,
}

impl GraphModel {
    /// Applies a command, reporting structural violations instead of dropping them.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, GraphError> {
        match mutation {
            Mutation::AddNode(spec) => Ok(MutationOutcome::NodeAdded(self.insert_node(spec))),
            Mutation::RemoveNode(node) => {
                self.try_remove_node(node)?;
                Ok(MutationOutcome::Removed(1))
            }
            Mutation::MoveNode { node, position } => {
                self.move_node(node, position)
                    .then_some(MutationOutcome::Applied)
                    .ok_or(GraphError::NodeNotFound(node))
            }
            Mutation::UpdateNode {
                node,
                name,
                configuration,
                description,
            } => {
                if self.is_input_node(node) {
                    return Err(GraphError::ReadOnlyNode(node));
                }
                self.update_node(node, &name, configuration, description)
                    .then_some(MutationOutcome::Applied)
                    .ok_or(GraphError::NodeNotFound(node))
            }
            Mutation::SetNodeError { node, error } => self
                .set_node_error(node, error)
                .then_some(MutationOutcome::Applied)
                .ok_or(GraphError::NodeNotFound(node)),
            Mutation::AddEdge {
                source,
                destination,
                labels,
            } => self
                .try_add_edge(source, destination, &labels)
                .map(MutationOutcome::EdgeAdded),
            Mutation::RemoveEdge(edge) => self
                .remove_edge(edge)
                .then_some(MutationOutcome::Removed(1))
                .ok_or(GraphError::EdgeNotFound(edge)),
            Mutation::SetEdgeLabels { edge, labels } => {
                self.set_edge_labels(edge, &labels)?;
                Ok(MutationOutcome::Applied)
            }
            Mutation::Select(item) => {
                self.select(item);
                Ok(MutationOutcome::Applied)
            }
            Mutation::Deselect(item) => {
                self.deselect(item);
                Ok(MutationOutcome::Applied)
            }
            Mutation::SelectAll => {
                self.select_all();
                Ok(MutationOutcome::Applied)
            }
            Mutation::DeselectAll => {
                self.deselect_all();
                Ok(MutationOutcome::Applied)
            }
            Mutation::DeleteSelected => Ok(MutationOutcome::Removed(self.delete_selected())),
        }
    }
}
