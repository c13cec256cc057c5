//! # Batches
//!
//! A batch groups the operations of one user-visible change. The document
//! applies it atomically: converters only ever see the committed result, never
//! a half-applied tree.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut batch = Batch::new().with_description("insert image");
//! batch
//!     .insert(Position::at("main", &[], 0), ModelNode::element("image").with_attr("src", "a.png"))
//!     .set_selection(Selection::collapsed(Position::at("main", &[], 1)));
//!
//! let applied = doc.apply(&batch, &schema)?;
//! ```

use crate::node::ModelNode;
use crate::operations::Operation;
use crate::position::{Position, Selection};
use serde::{Deserialize, Serialize};

/// A group of operations applied (or rejected) together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// The operations in this batch (in application order)
    operations: Vec<Operation>,

    /// Optional description of this batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn push(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn insert(&mut self, position: Position, node: ModelNode) -> &mut Self {
        self.insert_nodes(position, vec![node])
    }

    pub fn insert_nodes(&mut self, position: Position, nodes: Vec<ModelNode>) -> &mut Self {
        self.push(Operation::Insert { position, nodes })
    }

    pub fn remove(&mut self, position: Position, count: usize) -> &mut Self {
        self.push(Operation::Remove { position, count })
    }

    /// Set `key` on the node right after `position`
    pub fn set_attribute(&mut self, position: Position, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(Operation::SetAttribute {
            position,
            key: key.into(),
            value: Some(value.into()),
        })
    }

    /// Remove `key` from the node right after `position`
    pub fn remove_attribute(&mut self, position: Position, key: impl Into<String>) -> &mut Self {
        self.push(Operation::SetAttribute {
            position,
            key: key.into(),
            value: None,
        })
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.push(Operation::SetSelection {
            selection: Some(selection),
        })
    }

    pub fn clear_selection(&mut self) -> &mut Self {
        self.push(Operation::SetSelection { selection: None })
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}
