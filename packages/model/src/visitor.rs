use crate::node::ModelNode;

/// Visitor pattern for traversing model trees immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &ModelNode) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &ModelNode) {
        walk_children(self, element.children());
    }

    fn visit_text(&mut self, _text: &ModelNode) {
        // Leaf node, no children to walk
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &ModelNode) {
    match node {
        ModelNode::Element { .. } => visitor.visit_element(node),
        ModelNode::Text { .. } => visitor.visit_text(node),
    }
}

pub fn walk_children<V: Visitor>(visitor: &mut V, children: &[ModelNode]) {
    for child in children {
        visitor.visit_node(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NameCollector {
        names: Vec<String>,
    }

    impl Visitor for NameCollector {
        fn visit_element(&mut self, element: &ModelNode) {
            self.names.push(element.name().to_string());
            walk_children(self, element.children());
        }

        fn visit_text(&mut self, text: &ModelNode) {
            self.names.push(format!("#{}", text.data().unwrap_or_default()));
        }
    }

    #[test]
    fn test_walks_in_document_order() {
        let tree = ModelNode::element("blockQuote")
            .with_child(ModelNode::element("paragraph").with_child(ModelNode::text("a")))
            .with_child(ModelNode::element("paragraph").with_child(ModelNode::text("b")));

        let mut collector = NameCollector::default();
        collector.visit_node(&tree);

        assert_eq!(collector.names, vec!["blockQuote", "paragraph", "#a", "paragraph", "#b"]);
    }
}
