//! # Model Document
//!
//! Owns the model roots and the document selection.
//!
//! ## Lifecycle
//!
//! ```text
//! Batch → validate (staged copy) → commit → AppliedBatch
//!            ↓ any failure
//!         rejected, document untouched
//! ```

use crate::batch::Batch;
use crate::change::{AppliedBatch, Change};
use crate::errors::ModelError;
use crate::node::ModelNode;
use crate::operations::Applied;
use crate::position::{Position, Selection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use vellum_schema::{SchemaRegistry, ROOT};

/// Default root name
pub const MAIN_ROOT: &str = "main";

/// Editable model document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    roots: BTreeMap<String, ModelNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    selection: Option<Selection>,

    /// Current version number (increments on each committed batch)
    #[serde(default)]
    version: u64,
}

impl ModelDocument {
    /// Create a document without roots
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with the given (empty) roots
    pub fn with_roots<I, S>(names: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut doc = Self::new();
        for name in names {
            doc.create_root(name.as_ref())?;
        }
        Ok(doc)
    }

    pub fn create_root(&mut self, name: &str) -> Result<(), ModelError> {
        if self.roots.contains_key(name) {
            return Err(ModelError::DuplicateRoot(name.to_string()));
        }
        self.roots.insert(name.to_string(), ModelNode::element(ROOT));
        Ok(())
    }

    pub fn root(&self, name: &str) -> Option<&ModelNode> {
        self.roots.get(name)
    }

    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Node reached by `path` inside `root` (empty path is the root element)
    pub fn node(&self, root: &str, path: &[usize]) -> Option<&ModelNode> {
        self.roots.get(root)?.descendant(path)
    }

    pub fn node_after(&self, position: &Position) -> Option<&ModelNode> {
        self.container_at(position).ok()?.child(position.offset())
    }

    pub fn node_before(&self, position: &Position) -> Option<&ModelNode> {
        let offset = position.offset().checked_sub(1)?;
        self.container_at(position).ok()?.child(offset)
    }

    pub fn is_valid_position(&self, position: &Position) -> bool {
        self.container_at(position)
            .map(|parent| position.offset() <= parent.children().len())
            .unwrap_or(false)
    }

    /// The single node spanned by `selection`, if it spans exactly one sibling
    pub fn selected_element(&self, selection: &Selection) -> Option<&ModelNode> {
        let start = selection.start();
        let end = selection.end();

        if !start.has_same_parent(end) || end.offset() != start.offset() + 1 {
            return None;
        }
        self.node_after(start)
    }

    /// Apply a batch atomically.
    ///
    /// Every operation is validated against the staged result of the previous
    /// ones. The document only changes if all of them pass.
    pub fn apply(&mut self, batch: &Batch, schema: &SchemaRegistry) -> Result<AppliedBatch, ModelError> {
        if batch.is_empty() {
            return Ok(AppliedBatch {
                version: self.version,
                ..AppliedBatch::default()
            });
        }

        let mut staged = self.clone();
        let mut changes: Vec<Change> = Vec::new();
        let mut selection_changed = false;

        for operation in batch.operations() {
            if let Err(e) = operation.validate(&staged, schema) {
                debug!(operation = operation.name(), error = %e, "Rejecting batch");
                return Err(e);
            }

            match operation.apply(&mut staged)? {
                Applied::Content(change) => changes.push(change),
                Applied::Selection => selection_changed = true,
                Applied::Nothing => {}
            }
        }

        if !changes.is_empty() && staged.repair_selection() {
            selection_changed = true;
        }

        if !changes.is_empty() || selection_changed {
            staged.version += 1;
        }

        debug!(
            description = batch.description().unwrap_or_default(),
            changes = changes.len(),
            selection_changed,
            version = staged.version,
            "Committed batch"
        );

        *self = staged;

        Ok(AppliedBatch {
            changes,
            selection_changed,
            version: self.version,
        })
    }

    /// Element that contains `position`
    pub(crate) fn container_at(&self, position: &Position) -> Result<&ModelNode, ModelError> {
        let root = self
            .roots
            .get(&position.root)
            .ok_or_else(|| ModelError::UnknownRoot(position.root.clone()))?;

        if position.path.is_empty() {
            return Err(ModelError::InvalidPosition(position.clone()));
        }

        let parent = root
            .descendant(position.parent_path())
            .ok_or_else(|| ModelError::InvalidPosition(position.clone()))?;

        if !parent.is_element() {
            return Err(ModelError::NotAContainer(position.clone()));
        }
        Ok(parent)
    }

    pub(crate) fn children_at_mut(&mut self, position: &Position) -> Result<&mut Vec<ModelNode>, ModelError> {
        if position.path.is_empty() {
            return Err(ModelError::InvalidPosition(position.clone()));
        }

        let root = self
            .roots
            .get_mut(&position.root)
            .ok_or_else(|| ModelError::UnknownRoot(position.root.clone()))?;

        root.descendant_mut(position.parent_path())
            .ok_or_else(|| ModelError::InvalidPosition(position.clone()))?
            .children_mut()
            .ok_or_else(|| ModelError::NotAContainer(position.clone()))
    }

    pub(crate) fn replace_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Clamp selection boundaries that content changes left dangling.
    /// Returns whether the selection moved.
    fn repair_selection(&mut self) -> bool {
        let Some(selection) = self.selection.clone() else {
            return false;
        };

        let anchor = self.clamp(&selection.anchor);
        let focus = self.clamp(&selection.focus);

        let repaired = match (anchor, focus) {
            (Some(anchor), Some(focus)) => Some(Selection::range(anchor, focus)),
            _ => None,
        };

        if repaired.as_ref() == Some(&selection) {
            return false;
        }
        self.selection = repaired;
        true
    }

    fn clamp(&self, position: &Position) -> Option<Position> {
        let mut node = self.roots.get(&position.root)?;
        let mut parent_path = Vec::new();

        for &index in position.parent_path() {
            match node.child(index) {
                Some(child) if child.is_element() => {
                    parent_path.push(index);
                    node = child;
                }
                _ => {
                    let offset = index.min(node.children().len());
                    return Some(Position::at(position.root.clone(), &parent_path, offset));
                }
            }
        }

        let offset = position.offset().min(node.children().len());
        Some(Position::at(position.root.clone(), &parent_path, offset))
    }
}
