//! # Conversion Events
//!
//! Event names are colon-separated namespaces:
//!
//! | Direction     | Event                        |
//! |---------------|------------------------------|
//! | model → view  | `insert:<name>`              |
//! | model → view  | `remove:<name>`              |
//! | model → view  | `attribute:<key>:<name>`     |
//! | model → view  | `selection`                  |
//! | view → model  | `element:<name>`             |
//! | view → model  | `text`                       |
//!
//! Firing `insert:paragraph` also reaches listeners of `insert`, and
//! `attribute:alignment:paragraph` reaches `attribute:alignment` and
//! `attribute`.
//!
//! Names and keys that contain a colon themselves (`o:p`, `xlink:href`) are
//! escaped as `\:` so they stay a single segment.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventName(String);

impl EventName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn insert(item: &str) -> Self {
        Self(format!("insert:{}", escape(item)))
    }

    pub fn remove(item: &str) -> Self {
        Self(format!("remove:{}", escape(item)))
    }

    pub fn attribute(key: &str, item: &str) -> Self {
        Self(format!("attribute:{}:{}", escape(key), escape(item)))
    }

    /// `attribute:<key>` on any element
    pub fn any_attribute(key: &str) -> Self {
        Self(format!("attribute:{}", escape(key)))
    }

    pub fn selection() -> Self {
        Self("selection".to_string())
    }

    pub fn element(name: &str) -> Self {
        Self(format!("element:{}", escape(name)))
    }

    pub fn text() -> Self {
        Self("text".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name itself followed by every enclosing namespace, most specific first
    pub fn namespaces(&self) -> Vec<EventName> {
        let mut names = vec![self.clone()];
        let mut escaped = false;
        let mut boundaries = Vec::new();

        for (index, c) in self.0.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                ':' => boundaries.push(index),
                _ => {}
            }
        }

        for index in boundaries.into_iter().rev() {
            names.push(EventName(self.0[..index].to_string()));
        }
        names
    }
}

fn escape(segment: &str) -> String {
    if !segment.contains([':', '\\']) {
        return segment.to_string();
    }
    segment.replace('\\', "\\\\").replace(':', "\\:")
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Per-fire state handed to every listener
#[derive(Debug)]
pub struct EventInfo {
    name: EventName,
    stopped: bool,
}

impl EventInfo {
    pub fn new(name: EventName) -> Self {
        Self { name, stopped: false }
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// Halt dispatch: no listener after the current one runs for this fire
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces() {
        let names: Vec<String> = EventName::attribute("alignment", "paragraph")
            .namespaces()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        assert_eq!(names, vec!["attribute:alignment:paragraph", "attribute:alignment", "attribute"]);
        assert_eq!(EventName::selection().namespaces(), vec![EventName::selection()]);
    }

    #[test]
    fn test_colon_in_names_stays_one_segment() {
        let names = EventName::element("o:p").namespaces();
        assert_eq!(names, vec![EventName::from("element:o\\:p"), EventName::from("element")]);

        let names = EventName::attribute("xlink:href", "image").namespaces();
        assert_eq!(
            names,
            vec![
                EventName::from("attribute:xlink\\:href:image"),
                EventName::any_attribute("xlink:href"),
                EventName::from("attribute"),
            ]
        );
        assert_ne!(EventName::element("o:p"), EventName::element("o"));
    }

    #[test]
    fn test_generic_items_keep_their_prefix() {
        let names = EventName::insert("$text").namespaces();
        assert_eq!(names, vec![EventName::from("insert:$text"), EventName::from("insert")]);
    }
}
