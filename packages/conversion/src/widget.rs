//! # Widgets
//!
//! A widget is a view element rendered as one atomic, selectable unit. The
//! wrapper marks it non-editable, tags it with the `widget` class and a
//! [`WidgetMarker`], and the fake selection converter draws a labelled
//! selection around it whenever the model selection sits on or next to it.
//!
//! Labels come from per-kind providers. A provider that fails or returns an
//! empty label yields the fallback label instead; labelling never fails the
//! selection conversion.

use crate::event::{EventInfo, EventName};
use crate::feature::{Feature, FeatureContext};
use crate::model_to_view::{ModelConversionApi, ModelToViewData};
use crate::ConversionError;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};
use vellum_common::Priority;
use vellum_model::{ModelDocument, Position, Selection};
use vellum_schema::SchemaRegistry;
use vellum_view::{ViewElement, ViewPosition, ViewSelection, WidgetMarker, WIDGET_CLASS};

/// Label used when no provider yields one
pub const DEFAULT_FAKE_SELECTION_LABEL: &str = "widget";

pub type LabelProvider = Rc<dyn Fn(&ViewElement) -> Result<String, ConversionError>>;

/// Decorate `element` as a widget of `kind`
pub fn to_widget(mut element: ViewElement, kind: &str) -> ViewElement {
    element.set_editable(false);
    element.add_class(WIDGET_CLASS);
    element.widget = Some(WidgetMarker {
        kind: kind.to_string(),
    });
    element
}

/// Build the fake selection for a widget sitting right after `position`
pub fn attach_fake_selection(element: &ViewElement, position: ViewPosition, widgets: &WidgetRegistry) -> ViewSelection {
    ViewSelection::WidgetFake {
        label: widgets.label_for(element),
        widget: position,
    }
}

#[derive(Clone)]
pub struct WidgetRegistry {
    providers: BTreeMap<String, LabelProvider>,
    fallback_label: String,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self {
            providers: BTreeMap::new(),
            fallback_label: DEFAULT_FAKE_SELECTION_LABEL.to_string(),
        }
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("kinds", &self.providers.keys().collect::<Vec<_>>())
            .field("fallback_label", &self.fallback_label)
            .finish()
    }
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_label_provider<F>(&mut self, kind: &str, provider: F)
    where
        F: Fn(&ViewElement) -> Result<String, ConversionError> + 'static,
    {
        debug!(kind, "Registering widget label provider");
        self.providers.insert(kind.to_string(), Rc::new(provider));
    }

    /// Replace the fallback label; blank labels keep the built-in one
    pub fn set_fallback_label(&mut self, label: &str) {
        self.fallback_label = if label.trim().is_empty() {
            DEFAULT_FAKE_SELECTION_LABEL.to_string()
        } else {
            label.to_string()
        };
    }

    pub fn fallback_label(&self) -> &str {
        &self.fallback_label
    }

    /// Label for a widget element; never empty
    pub fn label_for(&self, element: &ViewElement) -> String {
        let Some(marker) = &element.widget else {
            return self.fallback_label.clone();
        };
        let Some(provider) = self.providers.get(&marker.kind) else {
            return self.fallback_label.clone();
        };

        match provider(element) {
            Ok(label) if !label.trim().is_empty() => label,
            Ok(_) => self.fallback_label.clone(),
            Err(e) => {
                warn!(kind = %marker.kind, error = %e, "Widget label provider failed, using fallback");
                self.fallback_label.clone()
            }
        }
    }
}

/// Model position right before the object the selection is on or around.
///
/// Either the selection spans exactly one object node, or it is collapsed
/// with an object right after it (preferred) or right before it.
pub fn widget_position(model: &ModelDocument, schema: &SchemaRegistry, selection: &Selection) -> Option<Position> {
    if let Some(node) = model.selected_element(selection) {
        return schema
            .is_object(node.name())
            .then(|| selection.start().clone());
    }
    if !selection.is_collapsed() {
        return None;
    }

    let position = &selection.focus;
    let is_object = |name: &str| schema.is_object(name);

    if model.node_after(position).is_some_and(|node| is_object(node.name())) {
        return Some(position.clone());
    }
    if model.node_before(position).is_some_and(|node| is_object(node.name())) {
        return Some(position.with_offset(position.offset() - 1));
    }
    None
}

/// Selection converter replacing the range selection with a fake one around widgets
fn convert_fake_selection(
    _: &mut EventInfo,
    data: &mut ModelToViewData,
    api: &mut ModelConversionApi<'_>,
) -> Result<(), ConversionError> {
    let ModelToViewData::Selection {
        selection: Some(selection),
    } = data
    else {
        return Ok(());
    };

    let Some(model_position) = widget_position(api.model, api.schema, selection) else {
        return Ok(());
    };
    let Some(view_position) = api.mapper.view_position(&model_position) else {
        return Ok(());
    };
    let Some(element) = api.view_element(&model_position).filter(|element| element.is_widget()) else {
        return Ok(());
    };

    let fake = attach_fake_selection(element, view_position, api.widgets);
    debug!(label = fake.fake_label().unwrap_or_default(), "Rendering fake selection around widget");
    api.view.set_selection(Some(fake));
    Ok(())
}

/// Registers the widget fake selection on the editing pipeline
#[derive(Debug, Default)]
pub struct WidgetEngine;

impl Feature for WidgetEngine {
    fn name(&self) -> &'static str {
        "widget"
    }

    fn init(&self, context: &mut FeatureContext<'_>) -> Result<(), ConversionError> {
        // Runs after the range selection converter and overrides it
        context
            .editing
            .dispatcher_mut()
            .on(EventName::selection(), Priority::Lowest, convert_fake_selection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::model_converter;
    use crate::controller::{DataController, EditingController};
    use vellum_model::{Batch, ModelNode, MAIN_ROOT};
    use vellum_schema::{Rule, BLOCK, ROOT};

    fn schema() -> SchemaRegistry {
        let mut schema = SchemaRegistry::new();
        schema.register_type_extending("paragraph", BLOCK).unwrap();
        schema.register_type("image").unwrap();
        schema.require_attributes("image", ["src"]).unwrap();
        schema
            .allow(Rule::new("image", ROOT).with_attributes(["alt", "src"]))
            .unwrap();
        schema.mark_object("image").unwrap();
        schema.seal();
        schema
    }

    fn image_view(node: &ModelNode) -> ViewElement {
        let mut img = ViewElement::new("img");
        for key in ["src", "alt"] {
            if let Some(value) = node.attribute(key) {
                img.set_attribute(key, value);
            }
        }
        to_widget(ViewElement::new("figure").with_class("image").with_child(img), "image")
    }

    fn alt_label(element: &ViewElement) -> Result<String, ConversionError> {
        Ok(element
            .find_child("img")
            .and_then(|img| img.attribute("alt"))
            .unwrap_or_default()
            .to_string())
    }

    fn editing() -> EditingController {
        let mut editing = EditingController::new();
        editing.create_root(MAIN_ROOT).unwrap();
        model_converter(editing.dispatcher_mut())
            .from_element("paragraph")
            .to_element(|_| ViewElement::new("p"));
        model_converter(editing.dispatcher_mut())
            .from_element("image")
            .to_element(image_view);
        editing.widgets_mut().register_label_provider("image", alt_label);

        let mut scratch = SchemaRegistry::new();
        let mut data = DataController::new();
        let mut context = FeatureContext {
            schema: &mut scratch,
            editing: &mut editing,
            data: &mut data,
        };
        WidgetEngine.init(&mut context).unwrap();
        editing
    }

    fn at(path: &[usize]) -> Position {
        Position::new(MAIN_ROOT, path.to_vec())
    }

    fn run(editing: &mut EditingController, model: &mut ModelDocument, schema: &SchemaRegistry, batch: &Batch) {
        let applied = model.apply(batch, schema).unwrap();
        let report = editing.convert(model, schema, &applied);
        assert!(report.faults.is_empty(), "{:?}", report.faults);
    }

    #[test]
    fn test_to_widget_decorates_element() {
        let widget = to_widget(ViewElement::new("figure").with_class("image"), "image");

        assert!(widget.is_widget());
        assert!(!widget.is_editable());
        assert_eq!(widget.attribute("class"), Some("image widget"));
        assert_eq!(widget.widget.as_ref().map(|marker| marker.kind.as_str()), Some("image"));
    }

    #[test]
    fn test_label_fallbacks() {
        let mut widgets = WidgetRegistry::new();
        widgets.register_label_provider("image", alt_label);
        widgets.register_label_provider("broken", |_: &ViewElement| -> Result<String, ConversionError> {
            Err(ConversionError::from("no label today"))
        });

        let labelled = to_widget(
            ViewElement::new("figure").with_child(ViewElement::new("img").with_attr("alt", "Example")),
            "image",
        );
        let unlabelled = to_widget(ViewElement::new("figure").with_child(ViewElement::new("img")), "image");
        let broken = to_widget(ViewElement::new("div"), "broken");
        let unknown = to_widget(ViewElement::new("div"), "video");

        assert_eq!(widgets.label_for(&labelled), "Example");
        assert_eq!(widgets.label_for(&unlabelled), DEFAULT_FAKE_SELECTION_LABEL);
        assert_eq!(widgets.label_for(&broken), DEFAULT_FAKE_SELECTION_LABEL);
        assert_eq!(widgets.label_for(&unknown), DEFAULT_FAKE_SELECTION_LABEL);

        widgets.set_fallback_label("Embedded object");
        assert_eq!(widgets.label_for(&unlabelled), "Embedded object");
        widgets.set_fallback_label("  ");
        assert_eq!(widgets.fallback_label(), DEFAULT_FAKE_SELECTION_LABEL);
    }

    #[test]
    fn test_widget_position_rules() {
        let schema = schema();
        let mut model = ModelDocument::with_roots([MAIN_ROOT]).unwrap();
        let mut batch = Batch::new();
        batch.insert_nodes(
            at(&[0]),
            vec![
                ModelNode::element("paragraph"),
                ModelNode::element("image").with_attr("src", "a.png"),
                ModelNode::element("paragraph"),
            ],
        );
        model.apply(&batch, &schema).unwrap();

        let around = Selection::range(at(&[1]), at(&[2]));
        assert_eq!(widget_position(&model, &schema, &around), Some(at(&[1])));

        // Collapsed before and after the image
        assert_eq!(widget_position(&model, &schema, &Selection::collapsed(at(&[1]))), Some(at(&[1])));
        assert_eq!(widget_position(&model, &schema, &Selection::collapsed(at(&[2]))), Some(at(&[1])));

        // Around a paragraph, or far from the image
        assert_eq!(widget_position(&model, &schema, &Selection::range(at(&[0]), at(&[1]))), None);
        assert_eq!(widget_position(&model, &schema, &Selection::collapsed(at(&[3]))), None);
        assert_eq!(widget_position(&model, &schema, &Selection::range(at(&[0]), at(&[2]))), None);
    }

    #[test]
    fn test_fake_selection_uses_alt_label() {
        let schema = schema();
        let mut editing = editing();
        let mut model = ModelDocument::with_roots([MAIN_ROOT]).unwrap();

        let mut batch = Batch::new();
        batch
            .insert(at(&[0]), ModelNode::element("image").with_attr("src", "a.png").with_attr("alt", "Example"))
            .set_selection(Selection::range(at(&[0]), at(&[1])));
        run(&mut editing, &mut model, &schema, &batch);

        assert_eq!(
            editing.view().selection(),
            Some(&ViewSelection::WidgetFake {
                label: "Example".to_string(),
                widget: ViewPosition::new(MAIN_ROOT, vec![0]),
            })
        );
    }

    #[test]
    fn test_fake_selection_without_alt_uses_fallback() {
        let schema = schema();
        let mut editing = editing();
        let mut model = ModelDocument::with_roots([MAIN_ROOT]).unwrap();

        let mut batch = Batch::new();
        batch
            .insert(at(&[0]), ModelNode::element("paragraph"))
            .insert(at(&[1]), ModelNode::element("image").with_attr("src", "a.png"))
            .set_selection(Selection::collapsed(at(&[2])));
        run(&mut editing, &mut model, &schema, &batch);

        let selection = editing.view().selection().unwrap();
        assert_eq!(selection.fake_label(), Some(DEFAULT_FAKE_SELECTION_LABEL));
    }

    #[test]
    fn test_selection_away_from_widget_is_a_range() {
        let schema = schema();
        let mut editing = editing();
        let mut model = ModelDocument::with_roots([MAIN_ROOT]).unwrap();

        let mut batch = Batch::new();
        batch
            .insert(at(&[0]), ModelNode::element("paragraph").with_child(ModelNode::text("ab")))
            .insert(at(&[1]), ModelNode::element("image").with_attr("src", "a.png"))
            .set_selection(Selection::collapsed(at(&[0, 1])));
        run(&mut editing, &mut model, &schema, &batch);

        assert!(matches!(editing.view().selection(), Some(ViewSelection::Range { .. })));
    }
}
