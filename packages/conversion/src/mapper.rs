//! # Mapper
//!
//! Keeps a mirror of each model root recording, per model node, how many
//! view nodes it produced and where (relative to its first produced view
//! node) the view element holding its children sits.
//!
//! ```text
//! model  $root ─┬─ paragraph ── "Hi"        view  div ─┬─ p ── "Hi"
//!               └─ image                               └─ figure ── img
//!
//! mirror root{container: []} ─┬─ {produced: 1, container: []} ── {produced: 1}
//!                             └─ {produced: 1, container: []}
//! ```
//!
//! Model positions map to view positions by summing the view nodes produced
//! by earlier siblings. Nodes whose converter produced nothing map to
//! nothing, and neither does anything inside them.

use std::collections::BTreeMap;
use vellum_model::{ModelNode, Position};
use vellum_view::ViewPosition;

#[derive(Debug, Clone, Default, PartialEq)]
struct MapNode {
    produced: usize,
    container: Option<Vec<usize>>,
    children: Vec<MapNode>,
}

impl MapNode {
    fn root() -> Self {
        Self {
            produced: 0,
            container: Some(Vec::new()),
            children: Vec::new(),
        }
    }

    fn placeholder(node: &ModelNode) -> Self {
        Self {
            produced: 0,
            container: None,
            children: node.children().iter().map(MapNode::placeholder).collect(),
        }
    }

    /// View offset of the first node produced by child `index`
    fn offset_of(&self, index: usize) -> usize {
        self.children.iter().take(index).map(|child| child.produced).sum()
    }

    fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut MapNode> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mapper {
    roots: BTreeMap<String, MapNode>,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) mapping a root
    pub fn create_root(&mut self, name: &str) {
        self.roots.insert(name.to_string(), MapNode::root());
    }

    pub fn has_root(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    /// View position for a model position, if every ancestor has a view container
    pub fn view_position(&self, position: &Position) -> Option<ViewPosition> {
        if position.path.is_empty() {
            return None;
        }

        let mut node = self.roots.get(&position.root)?;
        let mut container = node.container.clone()?;

        for &index in position.parent_path() {
            let child = node.children.get(index)?;
            if child.produced == 0 {
                return None;
            }

            let mut path = container;
            path.push(node.offset_of(index));
            path.extend(child.container.as_ref()?.iter().copied());

            container = path;
            node = child;
        }

        if position.offset() > node.children.len() {
            return None;
        }

        Some(ViewPosition::at(
            position.root.clone(),
            &container,
            node.offset_of(position.offset()),
        ))
    }

    /// Number of view nodes produced by the model node after `position`
    pub fn produced(&self, position: &Position) -> usize {
        self.node(position).map(|node| node.produced).unwrap_or(0)
    }

    /// Add unconverted mirror nodes for freshly inserted model nodes
    pub fn insert(&mut self, position: &Position, nodes: &[ModelNode]) -> bool {
        let Some(siblings) = self.siblings_mut(position) else {
            return false;
        };
        let offset = position.offset();
        if offset > siblings.len() {
            return false;
        }
        siblings.splice(offset..offset, nodes.iter().map(MapNode::placeholder));
        true
    }

    /// Record what the converter of the node after `position` produced.
    ///
    /// `container` is the path, relative to the first produced view node, of
    /// the element that will hold the node's children.
    pub fn bind(&mut self, position: &Position, produced: usize, container: Option<Vec<usize>>) -> bool {
        match self.node_mut(position) {
            Some(node) => {
                node.produced = produced;
                node.container = container;
                true
            }
            None => false,
        }
    }

    /// Forget the view of the node after `position` and its subtree, keeping its slot
    pub fn reset(&mut self, position: &Position, node: &ModelNode) -> bool {
        match self.node_mut(position) {
            Some(slot) => {
                *slot = MapNode::placeholder(node);
                true
            }
            None => false,
        }
    }

    /// Drop the mirror node after `position`
    pub fn remove(&mut self, position: &Position) -> bool {
        let Some(siblings) = self.siblings_mut(position) else {
            return false;
        };
        let offset = position.offset();
        if offset >= siblings.len() {
            return false;
        }
        siblings.remove(offset);
        true
    }

    fn node(&self, position: &Position) -> Option<&MapNode> {
        let mut node = self.roots.get(&position.root)?;
        if position.path.is_empty() {
            return None;
        }
        for &index in &position.path {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, position: &Position) -> Option<&mut MapNode> {
        if position.path.is_empty() {
            return None;
        }
        self.roots.get_mut(&position.root)?.descendant_mut(&position.path)
    }

    fn siblings_mut(&mut self, position: &Position) -> Option<&mut Vec<MapNode>> {
        if position.path.is_empty() {
            return None;
        }
        let parent = self
            .roots
            .get_mut(&position.root)?
            .descendant_mut(position.parent_path())?;
        Some(&mut parent.children)
    }
}
