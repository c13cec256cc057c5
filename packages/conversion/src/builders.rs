//! # Converter Builders
//!
//! Fluent helpers that turn a "from X to Y" rule into one dispatcher listener.
//!
//! ```ignore
//! model_converter(editing.dispatcher_mut())
//!     .from_element("paragraph")
//!     .to_element(|_| ViewElement::new("p"));
//!
//! view_converter(data.view_to_model_mut())
//!     .from_element("p")
//!     .to_element(|_| Some(ModelNode::element("paragraph")));
//! ```
//!
//! Each call registers exactly one listener and returns its id; builders hold
//! nothing beyond the dispatcher borrow.
//!
//! Element converters consume the node and do not stop the event, so
//! attribute converters registered at lower priority still see it.

use crate::consumable::attribute_aspect;
use crate::dispatcher::ListenerId;
use crate::event::EventName;
use crate::model_to_view::{ModelToViewData, ModelToViewDispatcher, INSERT};
use crate::view_to_model::{ViewToModelDispatcher, NAME};
use vellum_common::Priority;
use vellum_model::ModelNode;
use vellum_view::ViewElement;

/// Start a model → view rule
pub fn model_converter(dispatcher: &mut ModelToViewDispatcher) -> ModelConverterBuilder<'_> {
    ModelConverterBuilder {
        dispatcher,
        priority: Priority::Normal,
    }
}

/// Start a view → model rule
pub fn view_converter(dispatcher: &mut ViewToModelDispatcher) -> ViewConverterBuilder<'_> {
    ViewConverterBuilder {
        dispatcher,
        priority: None,
    }
}

pub struct ModelConverterBuilder<'d> {
    dispatcher: &'d mut ModelToViewDispatcher,
    priority: Priority,
}

impl<'d> ModelConverterBuilder<'d> {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn from_element(self, name: &str) -> ModelElementRule<'d> {
        ModelElementRule {
            dispatcher: self.dispatcher,
            priority: self.priority,
            name: name.to_string(),
        }
    }

    pub fn from_attribute(self, key: &str) -> ModelAttributeRule<'d> {
        ModelAttributeRule {
            dispatcher: self.dispatcher,
            priority: self.priority,
            key: key.to_string(),
            element: None,
        }
    }
}

pub struct ModelElementRule<'d> {
    dispatcher: &'d mut ModelToViewDispatcher,
    priority: Priority,
    name: String,
}

impl ModelElementRule<'_> {
    /// Render the model element as the element returned by `transform`; its
    /// children are converted into that element
    pub fn to_element<F>(self, transform: F) -> ListenerId
    where
        F: Fn(&ModelNode) -> ViewElement + 'static,
    {
        self.dispatcher
            .on(EventName::insert(&self.name), self.priority, move |_, data, api| {
                let ModelToViewData::Insert { item, position } = data else {
                    return Ok(());
                };
                if !api.is_mapped(position) || !api.consume(position, INSERT) {
                    return Ok(());
                }

                let element = transform(item);
                api.insert_view(position, vec![element.into()], Some(Vec::new()))
            })
    }
}

pub struct ModelAttributeRule<'d> {
    dispatcher: &'d mut ModelToViewDispatcher,
    priority: Priority,
    key: String,
    element: Option<String>,
}

impl ModelAttributeRule<'_> {
    /// Only handle the attribute on elements named `name`
    pub fn on_element(mut self, name: &str) -> Self {
        self.element = Some(name.to_string());
        self
    }

    /// Mirror the model attribute onto the mapped view element as `view_key`.
    /// `transform` maps the value. A value it cannot map is left unconsumed,
    /// so the conversion reports it as a miss.
    pub fn to_attribute<F>(self, view_key: &str, transform: F) -> ListenerId
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        let pattern = match &self.element {
            Some(element) => EventName::attribute(&self.key, element),
            None => EventName::any_attribute(&self.key),
        };
        let aspect = attribute_aspect(&self.key);
        let view_key = view_key.to_string();

        self.dispatcher.on(pattern, self.priority, move |_, data, api| {
            let ModelToViewData::Attribute { position, new, .. } = data else {
                return Ok(());
            };
            if !api.test(position, &aspect) {
                return Ok(());
            }
            let Some(element) = api.view_element_mut(position) else {
                return Ok(());
            };

            let Some(new) = new.as_deref() else {
                element.remove_attribute(&view_key);
                api.consume(position, &aspect);
                return Ok(());
            };

            match transform(new) {
                Some(value) => {
                    element.set_attribute(view_key.clone(), value);
                    api.consume(position, &aspect);
                }
                None => {
                    element.remove_attribute(&view_key);
                }
            }
            Ok(())
        })
    }
}

pub struct ViewConverterBuilder<'d> {
    dispatcher: &'d mut ViewToModelDispatcher,
    priority: Option<Priority>,
}

impl<'d> ViewConverterBuilder<'d> {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn from_element(self, name: &str) -> ViewElementRule<'d> {
        ViewElementRule {
            dispatcher: self.dispatcher,
            priority: self.priority.unwrap_or(Priority::Normal),
            name: name.to_string(),
        }
    }

    /// Attribute rules default to `low` so they run after element converters
    pub fn from_attribute(self, view_key: &str) -> ViewAttributeRule<'d> {
        ViewAttributeRule {
            dispatcher: self.dispatcher,
            priority: self.priority.unwrap_or(Priority::Low),
            view_key: view_key.to_string(),
        }
    }
}

pub struct ViewElementRule<'d> {
    dispatcher: &'d mut ViewToModelDispatcher,
    priority: Priority,
    name: String,
}

impl ViewElementRule<'_> {
    /// Produce the model node for a matching view element; returning `None`
    /// leaves the element to other converters.
    ///
    /// Children are converted into the produced node unless the schema marks
    /// it as an object.
    pub fn to_element<F>(self, transform: F) -> ListenerId
    where
        F: Fn(&ViewElement) -> Option<ModelNode> + 'static,
    {
        self.dispatcher
            .on(EventName::element(&self.name), self.priority, move |_, data, api| {
                let Some(element) = data.input.as_element() else {
                    return Ok(());
                };
                if !api.test(&data.path, NAME) {
                    return Ok(());
                }
                let Some(mut node) = transform(element) else {
                    return Ok(());
                };
                api.consume(&data.path, NAME);

                if node.is_element() && !api.schema.is_object(node.name()) {
                    let children = api.convert_children(&element.children, node.name(), &data.path);
                    if let Some(slot) = node.children_mut() {
                        slot.extend(children);
                    }
                }

                if api.accept(&node, data) {
                    data.output.push(node);
                }
                Ok(())
            })
    }
}

pub struct ViewAttributeRule<'d> {
    dispatcher: &'d mut ViewToModelDispatcher,
    priority: Priority,
    view_key: String,
}

impl ViewAttributeRule<'_> {
    /// Copy the view attribute onto the produced model elements as `model_key`,
    /// where the schema allows it. `transform` maps the value; `None` skips it.
    /// A value the schema allows on none of them is flagged `SchemaRejected`.
    pub fn to_attribute<F>(self, model_key: &str, transform: F) -> ListenerId
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        let view_key = self.view_key;
        let model_key = model_key.to_string();
        let aspect = attribute_aspect(&view_key);

        self.dispatcher.on("element", self.priority, move |_, data, api| {
            let Some(value) = data
                .input
                .as_element()
                .and_then(|element| element.attribute(&view_key))
            else {
                return Ok(());
            };
            if !api.test(&data.path, &aspect) {
                return Ok(());
            }
            let Some(value) = transform(value) else {
                return Ok(());
            };

            let context = api.context().to_string();
            let mut applied = false;
            for node in data.output.iter_mut().filter(|node| node.is_element()) {
                if api.schema.is_attribute_allowed(&context, node.name(), &model_key) {
                    node.attributes_mut().insert(model_key.clone(), value.clone());
                    applied = true;
                }
            }

            if applied {
                api.consume(&data.path, &aspect);
            } else if data.output.iter().any(|node| node.is_element()) {
                api.reject_partially(data);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::mapper::Mapper;
    use crate::model_to_view::ModelConversionApi;
    use crate::view_to_model::ViewConversionApi;
    use crate::widget::WidgetRegistry;
    use vellum_model::{Batch, ModelDocument, Position, MAIN_ROOT};
    use vellum_schema::{Rule, SchemaRegistry, BLOCK, ROOT};
    use vellum_view::{ViewDocument, ViewNode};

    fn schema() -> SchemaRegistry {
        let mut schema = SchemaRegistry::new();
        schema.register_type_extending("paragraph", BLOCK).unwrap();
        schema
            .allow(Rule::new("paragraph", ROOT).with_attributes(["alignment"]))
            .unwrap();
        schema.seal();
        schema
    }

    fn at(path: &[usize]) -> Position {
        Position::new(MAIN_ROOT, path.to_vec())
    }

    #[test]
    fn test_attribute_rule_updates_view_in_place() {
        let schema = schema();
        let mut dispatcher: ModelToViewDispatcher = Dispatcher::new("test");
        crate::model_to_view::register_defaults(&mut dispatcher);
        model_converter(&mut dispatcher)
            .from_element("paragraph")
            .to_element(|_| ViewElement::new("p"));
        model_converter(&mut dispatcher)
            .from_attribute("alignment")
            .on_element("paragraph")
            .to_attribute("data-align", |value| Some(value.to_string()));

        let widgets = WidgetRegistry::new();
        let mut model = ModelDocument::with_roots([MAIN_ROOT]).unwrap();
        let mut view = ViewDocument::new();
        view.create_root(MAIN_ROOT).unwrap();
        let mut mapper = Mapper::new();
        mapper.create_root(MAIN_ROOT);

        let mut batch = Batch::new();
        batch.insert(
            at(&[0]),
            ModelNode::element("paragraph")
                .with_attr("alignment", "center")
                .with_child(ModelNode::text("x")),
        );
        let applied = model.apply(&batch, &schema).unwrap();
        let mut api = ModelConversionApi::new(&dispatcher, &mut view, &mut mapper, &model, &schema, &widgets);
        api.convert_changes(&applied.changes);
        assert!(api.into_report().is_clean());
        assert_eq!(view.element_at(MAIN_ROOT, &[0]).unwrap().attribute("data-align"), Some("center"));

        let mut batch = Batch::new();
        batch.remove_attribute(at(&[0]), "alignment");
        let applied = model.apply(&batch, &schema).unwrap();
        let mut api = ModelConversionApi::new(&dispatcher, &mut view, &mut mapper, &model, &schema, &widgets);
        api.convert_changes(&applied.changes);
        let report = api.into_report();

        // Handled in place: one event, no re-conversion
        assert_eq!(report.fired, 1);
        let paragraph = view.element_at(MAIN_ROOT, &[0]).unwrap();
        assert_eq!(paragraph.attribute("data-align"), None);
        assert_eq!(paragraph.descendant(&[0]).and_then(ViewNode::data), Some("x"));
    }

    #[test]
    fn test_view_attribute_rule_respects_schema() {
        let schema = schema();
        let mut dispatcher: ViewToModelDispatcher = Dispatcher::new("test");
        crate::view_to_model::register_defaults(&mut dispatcher);
        view_converter(&mut dispatcher)
            .from_element("p")
            .to_element(|_| Some(ModelNode::element("paragraph")));
        view_converter(&mut dispatcher)
            .from_attribute("data-align")
            .to_attribute("alignment", |value| Some(value.to_string()));
        view_converter(&mut dispatcher)
            .from_attribute("data-id")
            .to_attribute("id", |value| Some(value.to_string()));

        let fragment: Vec<ViewNode> = vec![ViewElement::new("p")
            .with_attr("data-align", "right")
            .with_attr("data-id", "p1")
            .with_child(ViewNode::text("x"))
            .into()];

        let mut api = ViewConversionApi::new(&dispatcher, &schema, ROOT);
        let nodes = api.convert_fragment(&fragment);
        let result = api.finish(nodes);

        assert_eq!(
            result.nodes,
            vec![ModelNode::element("paragraph")
                .with_attr("alignment", "right")
                .with_child(ModelNode::text("x"))]
        );
        // `id` is not allowed on paragraphs, so the element is kept without it
        assert_eq!(result.unrecognized.len(), 1);
        assert_eq!(result.unrecognized[0].path, vec![0]);
        assert_eq!(result.unrecognized[0].name, "p");
        assert_eq!(result.unrecognized[0].reason, crate::report::UnrecognizedReason::SchemaRejected);
    }

    #[test]
    fn test_unmappable_attribute_value_is_a_miss() {
        let schema = schema();
        let mut dispatcher: ModelToViewDispatcher = Dispatcher::new("test");
        crate::model_to_view::register_defaults(&mut dispatcher);
        model_converter(&mut dispatcher)
            .from_element("paragraph")
            .to_element(|_| ViewElement::new("p"));
        model_converter(&mut dispatcher)
            .from_attribute("alignment")
            .on_element("paragraph")
            .to_attribute("data-align", |value| (value != "diagonal").then(|| value.to_string()));

        let widgets = WidgetRegistry::new();
        let mut model = ModelDocument::with_roots([MAIN_ROOT]).unwrap();
        let mut view = ViewDocument::new();
        view.create_root(MAIN_ROOT).unwrap();
        let mut mapper = Mapper::new();
        mapper.create_root(MAIN_ROOT);

        let mut batch = Batch::new();
        batch.insert(at(&[0]), ModelNode::element("paragraph").with_attr("alignment", "diagonal"));
        let applied = model.apply(&batch, &schema).unwrap();
        let mut api = ModelConversionApi::new(&dispatcher, &mut view, &mut mapper, &model, &schema, &widgets);
        api.convert_changes(&applied.changes);
        let report = api.into_report();

        assert_eq!(report.misses, vec![EventName::attribute("alignment", "paragraph")]);
        assert_eq!(view.element_at(MAIN_ROOT, &[0]).unwrap().attribute("data-align"), None);
    }

    #[test]
    fn test_element_rule_may_decline() {
        let schema = schema();
        let mut dispatcher: ViewToModelDispatcher = Dispatcher::new("test");
        view_converter(&mut dispatcher)
            .from_element("div")
            .to_element(|element| {
                element
                    .has_class("para")
                    .then(|| ModelNode::element("paragraph"))
            });

        let fragment: Vec<ViewNode> = vec![
            ViewElement::new("div").with_class("para").into(),
            ViewElement::new("div").into(),
        ];

        let mut api = ViewConversionApi::new(&dispatcher, &schema, ROOT);
        let nodes = api.convert_fragment(&fragment);
        let result = api.finish(nodes);

        assert_eq!(result.nodes, vec![ModelNode::element("paragraph")]);
        assert_eq!(result.unrecognized.len(), 1);
        assert_eq!(result.unrecognized[0].path, vec![1]);
    }
}
