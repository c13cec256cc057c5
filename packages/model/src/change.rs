use crate::node::ModelNode;
use crate::position::Position;
use serde::Serialize;

/// Record of one committed content change, in application order.
///
/// Positions are valid at the moment the change happened; replaying the
/// records in order reproduces the tree shape step by step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    Insert {
        position: Position,
        nodes: Vec<ModelNode>,
    },

    Remove {
        position: Position,
        nodes: Vec<ModelNode>,
    },

    Attribute {
        position: Position,
        key: String,
        old: Option<String>,
        new: Option<String>,
        /// The node right after the change
        node: ModelNode,
    },
}

impl Change {
    pub fn position(&self) -> &Position {
        match self {
            Change::Insert { position, .. }
            | Change::Remove { position, .. }
            | Change::Attribute { position, .. } => position,
        }
    }
}

/// Outcome of a committed batch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppliedBatch {
    pub changes: Vec<Change>,
    pub selection_changed: bool,
    pub version: u64,
}

impl AppliedBatch {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && !self.selection_changed
    }
}
