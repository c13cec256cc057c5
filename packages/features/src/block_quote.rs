use vellum_conversion::builders::{model_converter, view_converter};
use vellum_conversion::{ConversionError, Feature, FeatureContext};
use vellum_model::ModelNode;
use vellum_schema::{Rule, BLOCK, ROOT};
use vellum_view::ViewElement;

pub const BLOCK_QUOTE: &str = "blockQuote";

/// Quotation holding block content; quotes do not nest
#[derive(Debug, Default)]
pub struct BlockQuote;

impl Feature for BlockQuote {
    fn name(&self) -> &'static str {
        BLOCK_QUOTE
    }

    fn init(&self, context: &mut FeatureContext<'_>) -> Result<(), ConversionError> {
        context.schema.register_type(BLOCK_QUOTE)?;
        context.schema.allow(Rule::new(BLOCK_QUOTE, ROOT))?;
        context.schema.allow(Rule::new(BLOCK, BLOCK_QUOTE))?;

        for dispatcher in [context.editing.dispatcher_mut(), context.data.model_to_view_mut()] {
            model_converter(dispatcher)
                .from_element(BLOCK_QUOTE)
                .to_element(|_| ViewElement::new("blockquote"));
        }

        view_converter(context.data.view_to_model_mut())
            .from_element("blockquote")
            .to_element(|_| Some(ModelNode::element(BLOCK_QUOTE)));

        Ok(())
    }
}
