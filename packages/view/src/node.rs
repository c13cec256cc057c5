use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Class added to every widget root
pub const WIDGET_CLASS: &str = "widget";

/// Attribute carrying the editable flag of an element
pub const CONTENT_EDITABLE: &str = "contenteditable";

/// Capability tag marking an element as an atomic, selectable unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetMarker {
    /// Widget kind, used to look up its label provider
    pub kind: String,
}

/// View element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetMarker>,
}

/// View node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewNode {
    /// Element node
    Element(ViewElement),

    /// Text node
    Text { data: String },
}

impl ViewElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            widget: None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_child(mut self, child: impl Into<ViewNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, new_children: Vec<ViewNode>) -> Self {
        self.children.extend(new_children);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.remove(key)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|existing| existing == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute("class", joined);
    }

    pub fn is_editable(&self) -> bool {
        self.attribute(CONTENT_EDITABLE) != Some("false")
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.set_attribute(CONTENT_EDITABLE, editable.to_string());
    }

    pub fn is_widget(&self) -> bool {
        self.widget.is_some()
    }

    pub fn child(&self, index: usize) -> Option<&ViewNode> {
        self.children.get(index)
    }

    /// First child element with the given name
    pub fn find_child(&self, name: &str) -> Option<&ViewElement> {
        self.children
            .iter()
            .filter_map(ViewNode::as_element)
            .find(|child| child.name == name)
    }

    /// Node reached by following `path` (empty path is not a node of the children)
    pub fn descendant(&self, path: &[usize]) -> Option<&ViewNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &index in rest {
            node = node.as_element()?.children.get(index)?;
        }
        Some(node)
    }

    /// Element reached by following `path`; the empty path is this element
    pub fn element_at(&self, path: &[usize]) -> Option<&ViewElement> {
        if path.is_empty() {
            return Some(self);
        }
        self.descendant(path)?.as_element()
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut ViewElement> {
        let mut element = self;
        for &index in path {
            element = element.children.get_mut(index)?.as_element_mut()?;
        }
        Some(element)
    }
}

impl ViewNode {
    pub fn element(name: impl Into<String>) -> Self {
        ViewNode::Element(ViewElement::new(name))
    }

    pub fn text(data: impl Into<String>) -> Self {
        ViewNode::Text { data: data.into() }
    }

    /// Element name; `None` for text
    pub fn name(&self) -> Option<&str> {
        match self {
            ViewNode::Element(element) => Some(&element.name),
            ViewNode::Text { .. } => None,
        }
    }

    pub fn as_element(&self) -> Option<&ViewElement> {
        match self {
            ViewNode::Element(element) => Some(element),
            ViewNode::Text { .. } => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ViewElement> {
        match self {
            ViewNode::Element(element) => Some(element),
            ViewNode::Text { .. } => None,
        }
    }

    pub fn data(&self) -> Option<&str> {
        match self {
            ViewNode::Text { data } => Some(data),
            ViewNode::Element(_) => None,
        }
    }
}

impl From<ViewElement> for ViewNode {
    fn from(element: ViewElement) -> Self {
        ViewNode::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_deduplicated() {
        let element = ViewElement::new("figure")
            .with_class("image")
            .with_class("widget")
            .with_class("image");

        assert_eq!(element.attribute("class"), Some("image widget"));
        assert!(element.has_class("widget"));
        assert!(!element.has_class("img"));
    }

    #[test]
    fn test_editable_flag() {
        let mut element = ViewElement::new("figure");
        assert!(element.is_editable());

        element.set_editable(false);
        assert!(!element.is_editable());
        assert_eq!(element.attribute(CONTENT_EDITABLE), Some("false"));
    }

    #[test]
    fn test_paths() {
        let mut quote = ViewElement::new("blockquote")
            .with_child(ViewElement::new("p").with_child(ViewNode::text("x")));

        assert_eq!(quote.element_at(&[]).map(|e| e.name.as_str()), Some("blockquote"));
        assert_eq!(quote.element_at(&[0]).map(|e| e.name.as_str()), Some("p"));
        assert!(quote.element_at(&[0, 0]).is_none());
        assert_eq!(quote.descendant(&[0, 0]).and_then(ViewNode::data), Some("x"));

        quote.element_at_mut(&[0]).unwrap().set_attribute("data-align", "left");
        assert_eq!(quote.find_child("p").unwrap().attribute("data-align"), Some("left"));
    }

    #[test]
    fn test_json_fragment() {
        let json = r#"{
            "type": "element",
            "name": "figure",
            "attributes": { "class": "image" },
            "children": [
                { "type": "element", "name": "img", "attributes": { "src": "a.png" } }
            ]
        }"#;

        let node: ViewNode = serde_json::from_str(json).unwrap();
        let figure = node.as_element().unwrap();

        assert!(figure.has_class("image"));
        assert_eq!(figure.find_child("img").unwrap().attribute("src"), Some("a.png"));
        assert!(!figure.is_widget());
    }
}
