//! # Schema Registry
//!
//! Holds one [`SchemaEntry`] per element type. Entries may extend a base type
//! and inherit its containment rules and attributes; a rule written against a
//! base as the parent context also accepts every type extending that base.
//!
//! Attributes granted by an `allow` rule hold only in that rule's context.
//! [`SchemaRegistry::is_valid`] ignores placement and accepts the union of
//! every context; [`SchemaRegistry::check_in_context`] does not.
//!
//! ## Built-in items
//!
//! - `$root`: the document root context
//! - `$block`: allowed inside `$root`
//! - `$inline`: allowed inside `$block`
//! - `$text`: extends `$inline`
//!
//! ## Conflicts
//!
//! - Re-registering a name with a different base fails with
//!   [`SchemaError::DuplicateType`].
//! - An `allow` and a `disallow` covering the same `(name, inside)` pair (or
//!   the same attribute there) fail with [`SchemaError::ConflictingRule`].

use crate::error::{SchemaError, SchemaViolation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const ROOT: &str = "$root";
pub const BLOCK: &str = "$block";
pub const INLINE: &str = "$inline";
pub const TEXT: &str = "$text";

/// Anything the schema can validate: a name plus a set of attribute keys
pub trait SchemaItem {
    fn item_name(&self) -> &str;

    fn attribute_names(&self) -> Vec<&str>;
}

/// Containment rule used by [`SchemaRegistry::allow`] and [`SchemaRegistry::disallow`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    pub inside: String,
}

impl Rule {
    pub fn new(name: impl Into<String>, inside: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            inside: inside.into(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }
}

/// Declaration of one element type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntry {
    pub name: String,
    pub base: Option<String>,
    /// Union of attributes allowed in any context
    pub allowed_attributes: BTreeSet<String>,
    pub required_attributes: BTreeSet<String>,
    /// Parent contexts this type may appear inside
    pub allowed_in: BTreeSet<String>,
    /// Parent context -> attributes allowed there
    pub attributes_in: BTreeMap<String, BTreeSet<String>>,
    /// Parent context -> attributes denied there (empty set denies the element itself)
    pub disallowed_in: BTreeMap<String, BTreeSet<String>>,
    pub is_object: bool,
}

impl SchemaEntry {
    fn new(name: &str, base: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            base: base.map(str::to_string),
            allowed_attributes: BTreeSet::new(),
            required_attributes: BTreeSet::new(),
            allowed_in: BTreeSet::new(),
            attributes_in: BTreeMap::new(),
            disallowed_in: BTreeMap::new(),
            is_object: false,
        }
    }

    fn denies_element_in(&self, context: &str) -> bool {
        self.disallowed_in
            .get(context)
            .map(|attributes| attributes.is_empty())
            .unwrap_or(false)
    }

    fn allows_attribute_in(&self, context: &str, attribute: &str) -> bool {
        self.required_attributes.contains(attribute)
            || self
                .attributes_in
                .get(context)
                .map(|attributes| attributes.contains(attribute))
                .unwrap_or(false)
    }

    fn denies_attribute_in(&self, context: &str, attribute: &str) -> bool {
        self.disallowed_in
            .get(context)
            .map(|attributes| attributes.contains(attribute))
            .unwrap_or(false)
    }
}

/// Registry of element types and containment rules
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    entries: BTreeMap<String, SchemaEntry>,
    sealed: bool,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Create a registry pre-populated with the built-in generic items
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();

        let root = SchemaEntry::new(ROOT, None);

        let mut block = SchemaEntry::new(BLOCK, None);
        block.allowed_in.insert(ROOT.to_string());

        let mut inline = SchemaEntry::new(INLINE, None);
        inline.allowed_in.insert(BLOCK.to_string());

        let text = SchemaEntry::new(TEXT, Some(INLINE));

        for entry in [root, block, inline, text] {
            entries.insert(entry.name.clone(), entry);
        }

        Self {
            entries,
            sealed: false,
        }
    }

    /// Declare a type. Repeated declarations of the same plain type are no-ops.
    pub fn register_type(&mut self, name: &str) -> Result<(), SchemaError> {
        self.register(name, None)
    }

    /// Declare a type inheriting rules and attributes from `base`
    pub fn register_type_extending(&mut self, name: &str, base: &str) -> Result<(), SchemaError> {
        if !self.entries.contains_key(base) {
            return Err(SchemaError::UnknownType(base.to_string()));
        }
        self.register(name, Some(base))
    }

    fn register(&mut self, name: &str, base: Option<&str>) -> Result<(), SchemaError> {
        self.ensure_writable()?;

        if let Some(existing) = self.entries.get(name) {
            if existing.base.as_deref() != base {
                return Err(SchemaError::DuplicateType {
                    name: name.to_string(),
                    existing: existing.base.clone().unwrap_or_else(|| "none".to_string()),
                    requested: base.unwrap_or("none").to_string(),
                });
            }
            return Ok(());
        }

        debug!(item = name, base = ?base, "Registering schema type");
        self.entries.insert(name.to_string(), SchemaEntry::new(name, base));
        Ok(())
    }

    /// Mark attributes as mandatory. Required attributes are implicitly allowed.
    pub fn require_attributes<I, S>(&mut self, name: &str, attributes: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_writable()?;
        let entry = self.entry_mut(name)?;

        for attribute in attributes {
            let attribute = attribute.into();
            entry.allowed_attributes.insert(attribute.clone());
            entry.required_attributes.insert(attribute);
        }
        Ok(())
    }

    /// Permit `rule.name` inside `rule.inside`, with `rule.attributes`
    pub fn allow(&mut self, rule: Rule) -> Result<(), SchemaError> {
        self.ensure_writable()?;
        self.ensure_registered(&rule.inside)?;

        let entry = self.entry_mut(&rule.name)?;

        if entry.denies_element_in(&rule.inside) {
            return Err(conflict(&rule, "element is disallowed in this context"));
        }
        if let Some(attribute) = rule
            .attributes
            .iter()
            .find(|attribute| entry.denies_attribute_in(&rule.inside, attribute))
        {
            return Err(conflict(&rule, &format!("attribute '{}' is disallowed in this context", attribute)));
        }

        debug!(item = %rule.name, inside = %rule.inside, attributes = ?rule.attributes, "Allowing schema rule");
        entry.allowed_in.insert(rule.inside.clone());
        entry.allowed_attributes.extend(rule.attributes.iter().cloned());
        entry.attributes_in.entry(rule.inside).or_default().extend(rule.attributes);
        Ok(())
    }

    /// Deny `rule.name` inside `rule.inside`. With attributes, only those attributes are denied.
    pub fn disallow(&mut self, rule: Rule) -> Result<(), SchemaError> {
        self.ensure_writable()?;
        self.ensure_registered(&rule.inside)?;

        let entry = self.entry_mut(&rule.name)?;

        if rule.attributes.is_empty() {
            if entry.allowed_in.contains(&rule.inside) {
                return Err(conflict(&rule, "element is explicitly allowed in this context"));
            }
        } else if let Some(granted) = entry.attributes_in.get(&rule.inside) {
            if let Some(attribute) = rule.attributes.iter().find(|attribute| granted.contains(*attribute)) {
                return Err(conflict(&rule, &format!("attribute '{}' is explicitly allowed in this context", attribute)));
            }
        }

        debug!(item = %rule.name, inside = %rule.inside, attributes = ?rule.attributes, "Disallowing schema rule");
        entry
            .disallowed_in
            .entry(rule.inside)
            .or_default()
            .extend(rule.attributes);
        Ok(())
    }

    /// Flag a type as an atomic object (embeds, widgets)
    pub fn mark_object(&mut self, name: &str) -> Result<(), SchemaError> {
        self.ensure_writable()?;
        self.entry_mut(name)?.is_object = true;
        Ok(())
    }

    /// Close the setup phase; further writes fail with [`SchemaError::Sealed`]
    pub fn seal(&mut self) {
        debug!(types = self.entries.len(), "Sealing schema");
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.get(name)
    }

    pub fn is_object(&self, name: &str) -> bool {
        self.lineage(name).iter().any(|entry| entry.is_object)
    }

    /// Attributes allowed on `name`, including inherited ones
    pub fn allowed_attributes(&self, name: &str) -> BTreeSet<&str> {
        self.lineage(name)
            .iter()
            .flat_map(|entry| entry.allowed_attributes.iter().map(String::as_str))
            .collect()
    }

    /// Attributes required on `name`, including inherited ones
    pub fn required_attributes(&self, name: &str) -> BTreeSet<&str> {
        self.lineage(name)
            .iter()
            .flat_map(|entry| entry.required_attributes.iter().map(String::as_str))
            .collect()
    }

    /// Whether an item named `child` may appear directly inside `parent`
    pub fn can_contain(&self, parent: &str, child: &str) -> bool {
        let parents = self.lineage(parent);
        let children = self.lineage(child);

        if parents.is_empty() || children.is_empty() {
            return false;
        }

        let denied = children.iter().any(|entry| {
            parents
                .iter()
                .any(|context| entry.denies_element_in(&context.name))
        });
        if denied {
            return false;
        }

        children.iter().any(|entry| {
            parents
                .iter()
                .any(|context| entry.allowed_in.contains(&context.name))
        })
    }

    /// Whether `attribute` may be set on `child` while it sits inside `parent`.
    /// Required attributes are allowed wherever the element is.
    pub fn is_attribute_allowed(&self, parent: &str, child: &str, attribute: &str) -> bool {
        let parents = self.lineage(parent);
        let children = self.lineage(child);

        let granted = children.iter().any(|entry| {
            parents
                .iter()
                .any(|context| entry.allows_attribute_in(&context.name, attribute))
        });
        if !granted {
            return false;
        }

        !children.iter().any(|entry| {
            parents
                .iter()
                .any(|context| entry.denies_attribute_in(&context.name, attribute))
        })
    }

    /// Context-free validity: type registered, required attributes present,
    /// every attribute allowed
    pub fn is_valid<I: SchemaItem + ?Sized>(&self, item: &I) -> bool {
        self.validate(item).is_ok()
    }

    /// Same as [`SchemaRegistry::is_valid`] but reports the first violation
    pub fn validate<I: SchemaItem + ?Sized>(&self, item: &I) -> Result<(), SchemaViolation> {
        let name = item.item_name();
        if !self.is_registered(name) {
            return Err(SchemaViolation::UnknownType(name.to_string()));
        }

        let attributes = item.attribute_names();

        if let Some(missing) = self
            .required_attributes(name)
            .into_iter()
            .find(|required| !attributes.contains(required))
        {
            return Err(SchemaViolation::MissingAttribute {
                name: name.to_string(),
                attribute: missing.to_string(),
            });
        }

        let allowed = self.allowed_attributes(name);
        if let Some(extra) = attributes.iter().find(|attribute| !allowed.contains(*attribute)) {
            return Err(SchemaViolation::AttributeNotAllowed {
                name: name.to_string(),
                attribute: extra.to_string(),
            });
        }

        Ok(())
    }

    /// Validate `item` as a direct child of `parent`
    pub fn check_in_context<I: SchemaItem + ?Sized>(&self, parent: &str, item: &I) -> Result<(), SchemaViolation> {
        self.validate(item)?;

        let name = item.item_name();
        if !self.can_contain(parent, name) {
            return Err(SchemaViolation::NotAllowedInside {
                child: name.to_string(),
                parent: parent.to_string(),
            });
        }

        if let Some(denied) = item
            .attribute_names()
            .into_iter()
            .find(|attribute| !self.is_attribute_allowed(parent, name, attribute))
        {
            return Err(SchemaViolation::AttributeNotAllowed {
                name: name.to_string(),
                attribute: denied.to_string(),
            });
        }

        Ok(())
    }

    /// `name` followed by its base chain
    fn lineage(&self, name: &str) -> Vec<&SchemaEntry> {
        let mut chain = Vec::new();
        let mut current = self.entries.get(name);

        while let Some(entry) = current {
            chain.push(entry);
            current = entry.base.as_deref().and_then(|base| self.entries.get(base));
        }

        chain
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut SchemaEntry, SchemaError> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    fn ensure_registered(&self, name: &str) -> Result<(), SchemaError> {
        if self.entries.contains_key(name) {
            Ok(())
        } else {
            Err(SchemaError::UnknownType(name.to_string()))
        }
    }

    fn ensure_writable(&self) -> Result<(), SchemaError> {
        if self.sealed {
            Err(SchemaError::Sealed)
        } else {
            Ok(())
        }
    }
}

fn conflict(rule: &Rule, detail: &str) -> SchemaError {
    SchemaError::ConflictingRule {
        name: rule.name.clone(),
        inside: rule.inside.clone(),
        detail: detail.to_string(),
    }
}
