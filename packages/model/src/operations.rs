//! # Operations
//!
//! Low-level edits on the model tree.
//!
//! ## Semantics
//!
//! ### Insert
//! - Inserts nodes at a position inside an element
//! - Every inserted node (and its whole subtree) must satisfy the schema in
//!   the context it lands in
//!
//! ### Remove
//! - Removes `count` consecutive siblings starting at a position
//! - Fails if the range runs past the parent's children
//!
//! ### SetAttribute
//! - Sets (or with `None` removes) one attribute on the node after a position
//! - The resulting node must still be valid: no undeclared attributes, no
//!   missing required ones
//!
//! ### SetSelection
//! - Both boundaries must be valid positions

use crate::change::Change;
use crate::document::ModelDocument;
use crate::errors::ModelError;
use crate::node::ModelNode;
use crate::position::{Position, Selection};
use crate::visitor::{walk_children, Visitor};
use serde::{Deserialize, Serialize};
use vellum_schema::{SchemaItem, SchemaRegistry, SchemaViolation};

/// Model operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    /// Insert nodes at a position
    Insert {
        position: Position,
        nodes: Vec<ModelNode>,
    },

    /// Remove `count` nodes starting at a position
    Remove { position: Position, count: usize },

    /// Set or remove an attribute on the node right after a position
    SetAttribute {
        position: Position,
        key: String,
        value: Option<String>,
    },

    /// Replace the document selection
    SetSelection { selection: Option<Selection> },
}

/// What applying an operation did to the staged document
pub(crate) enum Applied {
    Content(Change),
    Selection,
    Nothing,
}

impl Operation {
    /// Get a debug name for this operation
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Remove { .. } => "remove",
            Operation::SetAttribute { .. } => "setAttribute",
            Operation::SetSelection { .. } => "setSelection",
        }
    }

    /// Validate that this operation can be applied to the document
    pub fn validate(&self, doc: &ModelDocument, schema: &SchemaRegistry) -> Result<(), ModelError> {
        match self {
            Operation::Insert { position, nodes } => {
                let parent = doc.container_at(position)?;
                if position.offset() > parent.children().len() {
                    return Err(ModelError::InvalidPosition(position.clone()));
                }

                let mut validator = SchemaValidator::new(schema, parent.name());
                walk_children(&mut validator, nodes);
                validator.finish()?;
                Ok(())
            }

            Operation::Remove { position, count } => {
                let parent = doc.container_at(position)?;
                removal_end(position, *count, parent.children().len())?;
                Ok(())
            }

            Operation::SetAttribute { position, key, value } => {
                let parent = doc.container_at(position)?;
                let node = parent
                    .child(position.offset())
                    .ok_or_else(|| ModelError::NodeNotFound(position.clone()))?;

                let pending = PendingAttributes::after_change(node, key, value.as_deref());
                schema.check_in_context(parent.name(), &pending)?;
                Ok(())
            }

            Operation::SetSelection { selection } => {
                if let Some(selection) = selection {
                    for boundary in [&selection.anchor, &selection.focus] {
                        if !doc.is_valid_position(boundary) {
                            return Err(ModelError::InvalidPosition(boundary.clone()));
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Apply this operation; callers validate first
    pub(crate) fn apply(&self, doc: &mut ModelDocument) -> Result<Applied, ModelError> {
        match self {
            Operation::Insert { position, nodes } => {
                if nodes.is_empty() {
                    return Ok(Applied::Nothing);
                }

                let children = doc.children_at_mut(position)?;
                let offset = position.offset();
                if offset > children.len() {
                    return Err(ModelError::InvalidPosition(position.clone()));
                }
                children.splice(offset..offset, nodes.iter().cloned());

                Ok(Applied::Content(Change::Insert {
                    position: position.clone(),
                    nodes: nodes.clone(),
                }))
            }

            Operation::Remove { position, count } => {
                let children = doc.children_at_mut(position)?;
                let end = removal_end(position, *count, children.len())?;
                let removed: Vec<ModelNode> = children.drain(position.offset()..end).collect();

                Ok(Applied::Content(Change::Remove {
                    position: position.clone(),
                    nodes: removed,
                }))
            }

            Operation::SetAttribute { position, key, value } => {
                let node = doc
                    .children_at_mut(position)?
                    .get_mut(position.offset())
                    .ok_or_else(|| ModelError::NodeNotFound(position.clone()))?;

                let old = match value {
                    Some(value) => node.attributes_mut().insert(key.clone(), value.clone()),
                    None => node.attributes_mut().remove(key),
                };

                if old == *value {
                    return Ok(Applied::Nothing);
                }

                Ok(Applied::Content(Change::Attribute {
                    position: position.clone(),
                    key: key.clone(),
                    old,
                    new: value.clone(),
                    node: node.clone(),
                }))
            }

            Operation::SetSelection { selection } => {
                if doc.selection() == selection.as_ref() {
                    return Ok(Applied::Nothing);
                }
                doc.replace_selection(selection.clone());
                Ok(Applied::Selection)
            }
        }
    }
}

/// End offset of a removal of `count` siblings at `position` among `len` children
fn removal_end(position: &Position, count: usize, len: usize) -> Result<usize, ModelError> {
    match position.offset().checked_add(count) {
        Some(end) if count > 0 && end <= len => Ok(end),
        _ => Err(ModelError::InvalidRange {
            position: position.clone(),
            count,
        }),
    }
}

/// Name plus attribute keys of a node as it would look after an attribute change
struct PendingAttributes<'a> {
    name: &'a str,
    attributes: Vec<&'a str>,
}

impl<'a> PendingAttributes<'a> {
    fn after_change(node: &'a ModelNode, key: &'a str, value: Option<&str>) -> Self {
        let mut attributes: Vec<&str> = node
            .attributes()
            .keys()
            .map(String::as_str)
            .filter(|existing| *existing != key)
            .collect();
        if value.is_some() {
            attributes.push(key);
        }

        Self {
            name: node.name(),
            attributes,
        }
    }
}

impl SchemaItem for PendingAttributes<'_> {
    fn item_name(&self) -> &str {
        self.name
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.attributes.clone()
    }
}

/// Checks every node of inserted subtrees against the schema, tracking the parent context
struct SchemaValidator<'s> {
    schema: &'s SchemaRegistry,
    context: Vec<String>,
    violation: Option<SchemaViolation>,
}

impl<'s> SchemaValidator<'s> {
    fn new(schema: &'s SchemaRegistry, parent: &str) -> Self {
        Self {
            schema,
            context: vec![parent.to_string()],
            violation: None,
        }
    }

    fn check(&mut self, node: &ModelNode) -> bool {
        if self.violation.is_some() {
            return false;
        }

        let parent = self.context.last().map(String::as_str).unwrap_or_default();
        match self.schema.check_in_context(parent, node) {
            Ok(()) => true,
            Err(violation) => {
                self.violation = Some(violation);
                false
            }
        }
    }

    fn finish(self) -> Result<(), SchemaViolation> {
        match self.violation {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }
}

impl Visitor for SchemaValidator<'_> {
    fn visit_element(&mut self, element: &ModelNode) {
        if !self.check(element) {
            return;
        }

        self.context.push(element.name().to_string());
        walk_children(self, element.children());
        self.context.pop();
    }

    fn visit_text(&mut self, text: &ModelNode) {
        self.check(text);
    }
}
