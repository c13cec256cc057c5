//! # View Document
//!
//! Named view roots plus the rendered selection. Content is only ever
//! spliced in or out in whole subtrees; conversion rebuilds what changed.

use crate::errors::ViewError;
use crate::node::{ViewElement, ViewNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Element name used for view roots
const ROOT_ELEMENT: &str = "div";

/// Location between view nodes; the last path entry is the offset inside the parent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewPosition {
    pub root: String,
    pub path: Vec<usize>,
}

impl ViewPosition {
    pub fn new(root: impl Into<String>, path: Vec<usize>) -> Self {
        Self {
            root: root.into(),
            path,
        }
    }

    pub fn at(root: impl Into<String>, parent_path: &[usize], offset: usize) -> Self {
        let mut path = parent_path.to_vec();
        path.push(offset);
        Self::new(root, path)
    }

    pub fn parent_path(&self) -> &[usize] {
        match self.path.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    pub fn offset(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    pub fn shifted(&self, delta: usize) -> Self {
        Self::at(self.root.clone(), self.parent_path(), self.offset() + delta)
    }
}

impl fmt::Display for ViewPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.root, self.path)
    }
}

/// Rendered selection: a plain range, or a fake selection drawn around a widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewSelection {
    Range {
        anchor: ViewPosition,
        focus: ViewPosition,
    },
    WidgetFake {
        label: String,
        /// Position right before the widget element
        widget: ViewPosition,
    },
}

impl ViewSelection {
    pub fn is_fake(&self) -> bool {
        matches!(self, ViewSelection::WidgetFake { .. })
    }

    pub fn fake_label(&self) -> Option<&str> {
        match self {
            ViewSelection::WidgetFake { label, .. } => Some(label),
            ViewSelection::Range { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDocument {
    roots: BTreeMap<String, ViewElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selection: Option<ViewSelection>,
}

impl ViewDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_root(&mut self, name: &str) -> Result<(), ViewError> {
        if self.roots.contains_key(name) {
            return Err(ViewError::DuplicateRoot(name.to_string()));
        }
        self.roots.insert(name.to_string(), ViewElement::new(ROOT_ELEMENT));
        Ok(())
    }

    pub fn has_root(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    pub fn root(&self, name: &str) -> Option<&ViewElement> {
        self.roots.get(name)
    }

    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Drop every child of a root
    pub fn clear_root(&mut self, name: &str) -> Result<Vec<ViewNode>, ViewError> {
        let root = self
            .roots
            .get_mut(name)
            .ok_or_else(|| ViewError::UnknownRoot(name.to_string()))?;
        Ok(std::mem::take(&mut root.children))
    }

    pub fn selection(&self) -> Option<&ViewSelection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<ViewSelection>) {
        self.selection = selection;
    }

    pub fn node_after(&self, position: &ViewPosition) -> Option<&ViewNode> {
        self.container(position).ok()?.child(position.offset())
    }

    pub fn element_at(&self, root: &str, path: &[usize]) -> Option<&ViewElement> {
        self.roots.get(root)?.element_at(path)
    }

    pub fn element_at_mut(&mut self, root: &str, path: &[usize]) -> Option<&mut ViewElement> {
        self.roots.get_mut(root)?.element_at_mut(path)
    }

    /// Splice nodes in at `position`
    pub fn insert(&mut self, position: &ViewPosition, nodes: Vec<ViewNode>) -> Result<(), ViewError> {
        let parent = self.container_mut(position)?;
        let offset = position.offset();
        if offset > parent.children.len() {
            return Err(ViewError::InvalidPosition(position.clone()));
        }
        parent.children.splice(offset..offset, nodes);
        Ok(())
    }

    /// Remove `count` nodes starting at `position`
    pub fn remove(&mut self, position: &ViewPosition, count: usize) -> Result<Vec<ViewNode>, ViewError> {
        let parent = self.container_mut(position)?;
        let offset = position.offset();
        if offset + count > parent.children.len() {
            return Err(ViewError::InvalidPosition(position.clone()));
        }
        Ok(parent.children.drain(offset..offset + count).collect())
    }

    fn container(&self, position: &ViewPosition) -> Result<&ViewElement, ViewError> {
        if position.path.is_empty() {
            return Err(ViewError::InvalidPosition(position.clone()));
        }
        self.roots
            .get(&position.root)
            .ok_or_else(|| ViewError::UnknownRoot(position.root.clone()))?
            .element_at(position.parent_path())
            .ok_or_else(|| ViewError::ElementNotFound(position.clone()))
    }

    fn container_mut(&mut self, position: &ViewPosition) -> Result<&mut ViewElement, ViewError> {
        if position.path.is_empty() {
            return Err(ViewError::InvalidPosition(position.clone()));
        }
        self.roots
            .get_mut(&position.root)
            .ok_or_else(|| ViewError::UnknownRoot(position.root.clone()))?
            .element_at_mut(position.parent_path())
            .ok_or_else(|| ViewError::ElementNotFound(position.clone()))
    }
}
