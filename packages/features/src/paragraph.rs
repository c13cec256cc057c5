use tracing::debug;
use vellum_conversion::builders::{model_converter, view_converter};
use vellum_conversion::{ConversionError, Feature, FeatureContext};
use vellum_model::ModelNode;
use vellum_schema::BLOCK;
use vellum_view::ViewElement;

pub const PARAGRAPH: &str = "paragraph";

#[derive(Debug, Default)]
pub struct Paragraph;

impl Feature for Paragraph {
    fn name(&self) -> &'static str {
        PARAGRAPH
    }

    fn init(&self, context: &mut FeatureContext<'_>) -> Result<(), ConversionError> {
        context.schema.register_type_extending(PARAGRAPH, BLOCK)?;

        for dispatcher in [context.editing.dispatcher_mut(), context.data.model_to_view_mut()] {
            model_converter(dispatcher)
                .from_element(PARAGRAPH)
                .to_element(|_| ViewElement::new("p"));
        }

        view_converter(context.data.view_to_model_mut())
            .from_element("p")
            .to_element(|_| Some(ModelNode::element(PARAGRAPH)));

        debug!("Paragraph converters registered");
        Ok(())
    }
}
