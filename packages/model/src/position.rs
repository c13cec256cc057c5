use serde::{Deserialize, Serialize};
use std::fmt;

/// Location between nodes in a root.
///
/// `path` leads from the root element down to the parent; its last entry is
/// the offset inside that parent. Every child node occupies one offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub root: String,
    pub path: Vec<usize>,
}

impl Position {
    pub fn new(root: impl Into<String>, path: Vec<usize>) -> Self {
        Self {
            root: root.into(),
            path,
        }
    }

    /// Position at `offset` inside the element reached by `parent_path`
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

    /// Position at `offset` inside the node that sits right after this position
    pub fn child(&self, offset: usize) -> Self {
        let mut path = self.path.clone();
        path.push(offset);
        Self::new(self.root.clone(), path)
    }

    /// Same parent, offset moved forward by `delta`
    pub fn shifted(&self, delta: usize) -> Self {
        Self::at(self.root.clone(), self.parent_path(), self.offset() + delta)
    }

    pub fn with_offset(&self, offset: usize) -> Self {
        Self::at(self.root.clone(), self.parent_path(), offset)
    }

    pub fn has_same_parent(&self, other: &Position) -> bool {
        self.root == other.root && self.parent_path() == other.parent_path()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.root, self.path)
    }
}

/// Document selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position.clone(),
            focus: position,
        }
    }

    pub fn range(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// Earlier of the two boundaries
    pub fn start(&self) -> &Position {
        if self.is_backward() {
            &self.focus
        } else {
            &self.anchor
        }
    }

    /// Later of the two boundaries
    pub fn end(&self) -> &Position {
        if self.is_backward() {
            &self.anchor
        } else {
            &self.focus
        }
    }
}
