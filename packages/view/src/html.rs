//! HTML serialization of view fragments (data pipeline output)

use crate::node::{ViewElement, ViewNode};

/// Render a sequence of view nodes to HTML
pub fn stringify(nodes: &[ViewNode]) -> String {
    let mut output = String::new();
    for node in nodes {
        write_node(node, &mut output);
    }
    output
}

/// Render an element including its own tag
pub fn stringify_element(element: &ViewElement) -> String {
    let mut output = String::new();
    write_element(element, &mut output);
    output
}

fn write_node(node: &ViewNode, output: &mut String) {
    match node {
        ViewNode::Element(element) => write_element(element, output),
        ViewNode::Text { data } => output.push_str(&escape_html(data)),
    }
}

fn write_element(element: &ViewElement, output: &mut String) {
    output.push('<');
    output.push_str(&element.name);

    for (key, value) in &element.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_html(value));
        output.push('"');
    }

    output.push('>');
    if is_void(&element.name) {
        return;
    }

    for child in &element.children {
        write_node(child, output);
    }

    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "input" | "br" | "hr" | "meta" | "link" | "area" | "base" | "col" | "embed" | "source" | "track" | "wbr"
    )
}
