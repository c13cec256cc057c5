use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vellum_schema::{SchemaItem, TEXT};

/// Attribute map; sorted so iteration (and therefore conversion) is deterministic
pub type Attributes = BTreeMap<String, String>;

/// Model node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModelNode {
    /// Typed element, possibly a container
    Element {
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: Attributes,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ModelNode>,
    },

    /// Text run (the `$text` schema item)
    Text {
        data: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: Attributes,
    },
}

impl ModelNode {
    pub fn element(name: impl Into<String>) -> Self {
        ModelNode::Element {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn text(data: impl Into<String>) -> Self {
        ModelNode::Text {
            data: data.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes_mut().insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        if let ModelNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<ModelNode>) -> Self {
        if let ModelNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    /// Schema name; text nodes are `$text`
    pub fn name(&self) -> &str {
        match self {
            ModelNode::Element { name, .. } => name,
            ModelNode::Text { .. } => TEXT,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, ModelNode::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ModelNode::Text { .. })
    }

    pub fn data(&self) -> Option<&str> {
        match self {
            ModelNode::Text { data, .. } => Some(data),
            ModelNode::Element { .. } => None,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            ModelNode::Element { attributes, .. } | ModelNode::Text { attributes, .. } => attributes,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            ModelNode::Element { attributes, .. } | ModelNode::Text { attributes, .. } => attributes,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes().get(key).map(String::as_str)
    }

    pub fn children(&self) -> &[ModelNode] {
        match self {
            ModelNode::Element { children, .. } => children,
            ModelNode::Text { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<ModelNode>> {
        match self {
            ModelNode::Element { children, .. } => Some(children),
            ModelNode::Text { .. } => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<&ModelNode> {
        self.children().get(index)
    }

    /// Node reached by following `path` from this node (empty path is the node itself)
    pub fn descendant(&self, path: &[usize]) -> Option<&ModelNode> {
        path.iter().try_fold(self, |node, &index| node.child(index))
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut ModelNode> {
        let mut node = self;
        for &index in path {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }
}

impl SchemaItem for ModelNode {
    fn item_name(&self) -> &str {
        self.name()
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.attributes().keys().map(String::as_str).collect()
    }
}
