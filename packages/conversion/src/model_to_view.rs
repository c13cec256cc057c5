//! # Model → View
//!
//! Turns committed model changes into view mutations.
//!
//! ## Event order
//!
//! ```text
//! Change::Insert    → per node, pre-order:
//!                       insert:<name>
//!                       attribute:<key>:<name>   (one per attribute)
//!                       ...children
//! Change::Remove    → remove:<name> per node, last node first
//! Change::Attribute → attribute:<key>:<name>
//!                       unclaimed → element re-converted from its snapshot
//! selection         → selection
//! ```
//!
//! Removal always leaves the view in sync: if no listener claimed a
//! `remove` event, the mapped view nodes are dropped structurally.

use crate::consumable::{attribute_aspect, Consumable};
use crate::dispatcher::{Dispatcher, ListenerId};
use crate::event::{EventInfo, EventName};
use crate::mapper::Mapper;
use crate::report::ConversionReport;
use crate::widget::WidgetRegistry;
use crate::ConversionError;
use std::rc::Rc;
use tracing::{debug, warn};
use vellum_common::Priority;
use vellum_model::{Change, ModelDocument, ModelNode, Position, Selection};
use vellum_schema::{SchemaRegistry, TEXT};
use vellum_view::{ViewDocument, ViewElement, ViewNode, ViewSelection};

pub type ModelHandler =
    Rc<dyn Fn(&mut EventInfo, &mut ModelToViewData, &mut ModelConversionApi<'_>) -> Result<(), ConversionError>>;

pub type ModelToViewDispatcher = Dispatcher<ModelHandler>;

/// Aspect of an inserted node
pub const INSERT: &str = "insert";

/// Aspect of a removed node
pub const REMOVE: &str = "remove";

/// Consumable key: one aspect of the node after a model position
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Aspect {
    pub position: Position,
    pub kind: String,
}

impl Aspect {
    pub fn new(position: &Position, kind: &str) -> Self {
        Self {
            position: position.clone(),
            kind: kind.to_string(),
        }
    }
}

/// Payload of a model → view event
#[derive(Debug, Clone, PartialEq)]
pub enum ModelToViewData {
    Insert {
        item: ModelNode,
        position: Position,
    },
    Remove {
        item: ModelNode,
        position: Position,
    },
    Attribute {
        item: ModelNode,
        position: Position,
        key: String,
        old: Option<String>,
        new: Option<String>,
    },
    Selection {
        selection: Option<Selection>,
    },
}

impl Dispatcher<ModelHandler> {
    /// Register a model → view listener
    pub fn on<F>(&mut self, pattern: impl Into<EventName>, priority: Priority, handler: F) -> ListenerId
    where
        F: Fn(&mut EventInfo, &mut ModelToViewData, &mut ModelConversionApi<'_>) -> Result<(), ConversionError>
            + 'static,
    {
        self.register(pattern, priority, Rc::new(handler))
    }
}

/// Everything a model → view listener may touch
pub struct ModelConversionApi<'a> {
    dispatcher: &'a ModelToViewDispatcher,
    pub view: &'a mut ViewDocument,
    pub mapper: &'a mut Mapper,
    /// Model state after the whole batch
    pub model: &'a ModelDocument,
    pub schema: &'a SchemaRegistry,
    pub widgets: &'a WidgetRegistry,
    pub consumable: Consumable<Aspect>,
    report: ConversionReport,
}

impl<'a> ModelConversionApi<'a> {
    pub fn new(
        dispatcher: &'a ModelToViewDispatcher,
        view: &'a mut ViewDocument,
        mapper: &'a mut Mapper,
        model: &'a ModelDocument,
        schema: &'a SchemaRegistry,
        widgets: &'a WidgetRegistry,
    ) -> Self {
        Self {
            dispatcher,
            view,
            mapper,
            model,
            schema,
            widgets,
            consumable: Consumable::new(),
            report: ConversionReport::default(),
        }
    }

    pub fn consume(&mut self, position: &Position, kind: &str) -> bool {
        self.consumable.consume(&Aspect::new(position, kind))
    }

    pub fn test(&self, position: &Position, kind: &str) -> bool {
        self.consumable.is_available(&Aspect::new(position, kind))
    }

    /// Whether the model position has a place in the view
    pub fn is_mapped(&self, position: &Position) -> bool {
        self.mapper.view_position(position).is_some()
    }

    /// Insert the view produced for the node after `position` and bind it in the mapper
    pub fn insert_view(
        &mut self,
        position: &Position,
        nodes: Vec<ViewNode>,
        container: Option<Vec<usize>>,
    ) -> Result<(), ConversionError> {
        let view_position = self
            .mapper
            .view_position(position)
            .ok_or_else(|| ConversionError::Unmapped(position.clone()))?;

        let produced = nodes.len();
        self.view.insert(&view_position, nodes)?;
        self.mapper.bind(position, produced, container);
        Ok(())
    }

    /// Remove the view of the node after `position`. Returns the number of view nodes removed.
    pub fn remove_view(&mut self, position: &Position) -> Result<usize, ConversionError> {
        let produced = self.mapper.produced(position);
        if produced == 0 {
            return Ok(0);
        }

        let view_position = self
            .mapper
            .view_position(position)
            .ok_or_else(|| ConversionError::Unmapped(position.clone()))?;

        self.view.remove(&view_position, produced)?;
        self.mapper.bind(position, 0, None);
        Ok(produced)
    }

    /// First view element produced by the node after `position`
    pub fn view_element(&self, position: &Position) -> Option<&ViewElement> {
        if self.mapper.produced(position) == 0 {
            return None;
        }
        let view_position = self.mapper.view_position(position)?;
        self.view.element_at(&view_position.root, &view_position.path)
    }

    pub fn view_element_mut(&mut self, position: &Position) -> Option<&mut ViewElement> {
        if self.mapper.produced(position) == 0 {
            return None;
        }
        let view_position = self.mapper.view_position(position)?;
        self.view.element_at_mut(&view_position.root, &view_position.path)
    }

    /// Convert the change records of one committed batch, in order
    pub fn convert_changes(&mut self, changes: &[Change]) {
        for change in changes {
            match change {
                Change::Insert { position, nodes } => self.convert_insert(position, nodes),
                Change::Remove { position, nodes } => self.convert_remove(position, nodes),
                Change::Attribute {
                    position,
                    key,
                    old,
                    new,
                    node,
                } => self.convert_attribute(position, key, old.clone(), new.clone(), node),
            }
        }
    }

    pub fn convert_insert(&mut self, position: &Position, nodes: &[ModelNode]) {
        if !self.mapper.insert(position, nodes) {
            warn!(%position, "Insert outside the mapped tree, view left unchanged");
            return;
        }

        for (index, node) in nodes.iter().enumerate() {
            self.convert_node(&position.shifted(index), node);
        }
    }

    pub fn convert_remove(&mut self, position: &Position, nodes: &[ModelNode]) {
        for (index, node) in nodes.iter().enumerate().rev() {
            let at = position.shifted(index);
            self.consumable.add(Aspect::new(&at, REMOVE));

            let name = EventName::remove(node.name());
            self.fire(
                &name,
                ModelToViewData::Remove {
                    item: node.clone(),
                    position: at.clone(),
                },
            );

            if self.test(&at, REMOVE) {
                debug!(event = %name, position = %at, "Remove not claimed, dropping mapped view");
                if let Err(e) = self.remove_view(&at) {
                    warn!(position = %at, error = %e, "Failed to drop view of removed node");
                }
            }
            self.mapper.remove(&at);
        }
    }

    pub fn convert_attribute(
        &mut self,
        position: &Position,
        key: &str,
        old: Option<String>,
        new: Option<String>,
        node: &ModelNode,
    ) {
        let aspect = attribute_aspect(key);
        self.consumable.add(Aspect::new(position, &aspect));

        let name = EventName::attribute(key, node.name());
        self.fire(
            &name,
            ModelToViewData::Attribute {
                item: node.clone(),
                position: position.clone(),
                key: key.to_string(),
                old,
                new,
            },
        );

        if self.test(position, &aspect) {
            debug!(event = %name, %position, "No attribute converter, re-converting element");
            self.reconvert(position, node);
        }
    }

    pub fn convert_selection(&mut self, selection: Option<Selection>) {
        self.view.set_selection(None);
        self.fire(&EventName::selection(), ModelToViewData::Selection { selection });
    }

    pub fn into_report(self) -> ConversionReport {
        self.report
    }

    fn convert_node(&mut self, position: &Position, node: &ModelNode) {
        self.consumable.add(Aspect::new(position, INSERT));
        for key in node.attributes().keys() {
            self.consumable.add(Aspect::new(position, &attribute_aspect(key)));
        }

        let name = EventName::insert(node.name());
        self.fire(
            &name,
            ModelToViewData::Insert {
                item: node.clone(),
                position: position.clone(),
            },
        );
        self.check_consumed(name, position, INSERT);

        for (key, value) in node.attributes() {
            let name = EventName::attribute(key, node.name());
            self.fire(
                &name,
                ModelToViewData::Attribute {
                    item: node.clone(),
                    position: position.clone(),
                    key: key.clone(),
                    old: None,
                    new: Some(value.clone()),
                },
            );
            self.check_consumed(name, position, &attribute_aspect(key));
        }

        for (index, child) in node.children().iter().enumerate() {
            self.convert_node(&position.child(index), child);
        }
    }

    fn reconvert(&mut self, position: &Position, node: &ModelNode) {
        if let Err(e) = self.remove_view(position) {
            warn!(%position, error = %e, "Failed to drop view before re-conversion");
            return;
        }
        self.mapper.reset(position, node);
        self.convert_node(position, node);
    }

    fn check_consumed(&mut self, name: EventName, position: &Position, kind: &str) {
        if self.test(position, kind) {
            debug!(event = %name, %position, "No converter claimed event");
            self.report.miss(name);
        }
    }

    fn fire(&mut self, name: &EventName, mut data: ModelToViewData) {
        let dispatcher = self.dispatcher;
        let outcome = dispatcher.fire_with(name, |handler, info| handler(info, &mut data, &mut *self));
        self.report.record(outcome);
    }
}

/// Register the converters every model → view pipeline needs
pub(crate) fn register_defaults(dispatcher: &mut ModelToViewDispatcher) {
    dispatcher.on(EventName::insert(TEXT), Priority::Normal, convert_text);
    dispatcher.on("remove", Priority::Low, convert_remove);
}

/// Plain range selection
pub(crate) fn register_range_selection(dispatcher: &mut ModelToViewDispatcher) {
    dispatcher.on(EventName::selection(), Priority::Normal, convert_range_selection);
}

fn convert_text(
    _: &mut EventInfo,
    data: &mut ModelToViewData,
    api: &mut ModelConversionApi<'_>,
) -> Result<(), ConversionError> {
    let ModelToViewData::Insert { item, position } = data else {
        return Ok(());
    };
    if !api.is_mapped(position) || !api.consume(position, INSERT) {
        return Ok(());
    }

    let text = ViewNode::text(item.data().unwrap_or_default());
    api.insert_view(position, vec![text], None)
}

fn convert_remove(
    _: &mut EventInfo,
    data: &mut ModelToViewData,
    api: &mut ModelConversionApi<'_>,
) -> Result<(), ConversionError> {
    let ModelToViewData::Remove { position, .. } = data else {
        return Ok(());
    };
    if !api.consume(position, REMOVE) {
        return Ok(());
    }

    api.remove_view(position)?;
    Ok(())
}

fn convert_range_selection(
    _: &mut EventInfo,
    data: &mut ModelToViewData,
    api: &mut ModelConversionApi<'_>,
) -> Result<(), ConversionError> {
    let ModelToViewData::Selection { selection } = data else {
        return Ok(());
    };

    let projected = selection.as_ref().and_then(|selection| {
        let anchor = api.mapper.view_position(&selection.anchor)?;
        let focus = api.mapper.view_position(&selection.focus)?;
        Some(ViewSelection::Range { anchor, focus })
    });

    api.view.set_selection(projected);
    Ok(())
}
