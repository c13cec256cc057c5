//! # Image
//!
//! `image` is a root-level object with a required `src` and an optional
//! `alt`. The data pipeline renders it as a plain figure; the editing
//! pipeline renders the same figure as a widget, labelled by its `alt` text.
//!
//! ```text
//! <figure class="image"><img src="..." alt="..."></figure>
//! ```

use tracing::debug;
use vellum_conversion::builders::view_converter;
use vellum_conversion::{
    attribute_aspect, to_widget, ConversionError, EventName, Feature, FeatureContext, ModelConversionApi,
    ModelToViewData, WidgetEngine, INSERT,
};
use vellum_common::Priority;
use vellum_model::ModelNode;
use vellum_schema::{Rule, ROOT};
use vellum_view::ViewElement;

pub const IMAGE: &str = "image";

const SRC: &str = "src";
const ALT: &str = "alt";
const FIGURE_CLASS: &str = "image";

#[derive(Debug, Default)]
pub struct Image;

impl Feature for Image {
    fn name(&self) -> &'static str {
        IMAGE
    }

    fn requires(&self) -> Vec<Box<dyn Feature>> {
        vec![Box::new(WidgetEngine)]
    }

    fn init(&self, context: &mut FeatureContext<'_>) -> Result<(), ConversionError> {
        let schema = &mut *context.schema;
        schema.register_type(IMAGE)?;
        schema.require_attributes(IMAGE, [SRC])?;
        schema.allow(Rule::new(IMAGE, ROOT).with_attributes([ALT, SRC]))?;
        schema.mark_object(IMAGE)?;

        context
            .data
            .model_to_view_mut()
            .on(EventName::insert(IMAGE), Priority::Normal, |_, data, api| {
                insert_image(data, api, image_view)
            });

        context
            .editing
            .dispatcher_mut()
            .on(EventName::insert(IMAGE), Priority::Normal, |_, data, api| {
                insert_image(data, api, |node| to_widget(image_view(node), IMAGE))
            });
        context.editing.widgets_mut().register_label_provider(IMAGE, image_label);

        view_converter(context.data.view_to_model_mut())
            .from_element("figure")
            .to_element(image_from_view);

        Ok(())
    }
}

/// Data view of an image node
pub fn image_view(node: &ModelNode) -> ViewElement {
    let mut img = ViewElement::new("img");
    for key in [SRC, ALT] {
        if let Some(value) = node.attribute(key) {
            img.set_attribute(key, value);
        }
    }
    ViewElement::new("figure").with_class(FIGURE_CLASS).with_child(img)
}

/// Fake selection label of an image widget: the `alt` text of its `img`
pub fn image_label(widget: &ViewElement) -> Result<String, ConversionError> {
    let img = widget
        .find_child("img")
        .ok_or_else(|| ConversionError::Converter("image widget without img".to_string()))?;
    Ok(img.attribute(ALT).unwrap_or_default().to_string())
}

fn insert_image(
    data: &mut ModelToViewData,
    api: &mut ModelConversionApi<'_>,
    render: impl Fn(&ModelNode) -> ViewElement,
) -> Result<(), ConversionError> {
    let ModelToViewData::Insert { item, position } = data else {
        return Ok(());
    };
    if !api.is_mapped(position) || !api.consume(position, INSERT) {
        return Ok(());
    }

    // src and alt are rendered on the img here
    for key in [SRC, ALT] {
        api.consume(position, &attribute_aspect(key));
    }

    api.insert_view(position, vec![render(item).into()], None)
}

/// A `figure.image` becomes an image carrying the attributes of its `img`.
/// The schema rejects it if the `img` has no `src`.
fn image_from_view(figure: &ViewElement) -> Option<ModelNode> {
    if !figure.has_class(FIGURE_CLASS) {
        return None;
    }
    let img = figure.find_child("img")?;

    let mut node = ModelNode::element(IMAGE);
    for key in [SRC, ALT] {
        if let Some(value) = img.attribute(key) {
            node = node.with_attr(key, value);
        }
    }
    debug!(src = img.attribute(SRC).unwrap_or_default(), "Converted figure to image");
    Some(node)
}
