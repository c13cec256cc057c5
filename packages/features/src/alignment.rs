//! Block alignment stored as the `alignment` attribute of root-level
//! paragraphs. Changes update the `data-align` attribute in place instead of
//! re-rendering the paragraph.

use crate::paragraph::{Paragraph, PARAGRAPH};
use vellum_conversion::builders::{model_converter, view_converter};
use vellum_conversion::{ConversionError, Feature, FeatureContext};
use vellum_schema::{Rule, ROOT};

pub const ALIGNMENT: &str = "alignment";

pub const DATA_ALIGN: &str = "data-align";

pub const ALIGNMENT_VALUES: [&str; 4] = ["left", "center", "right", "justify"];

fn supported(value: &str) -> Option<String> {
    ALIGNMENT_VALUES.contains(&value).then(|| value.to_string())
}

#[derive(Debug, Default)]
pub struct Alignment;

impl Feature for Alignment {
    fn name(&self) -> &'static str {
        ALIGNMENT
    }

    fn requires(&self) -> Vec<Box<dyn Feature>> {
        vec![Box::new(Paragraph)]
    }

    fn init(&self, context: &mut FeatureContext<'_>) -> Result<(), ConversionError> {
        context
            .schema
            .allow(Rule::new(PARAGRAPH, ROOT).with_attributes([ALIGNMENT]))?;

        for dispatcher in [context.editing.dispatcher_mut(), context.data.model_to_view_mut()] {
            model_converter(dispatcher)
                .from_attribute(ALIGNMENT)
                .on_element(PARAGRAPH)
                .to_attribute(DATA_ALIGN, supported);
        }

        view_converter(context.data.view_to_model_mut())
            .from_attribute(DATA_ALIGN)
            .to_attribute(ALIGNMENT, supported);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_values() {
        assert_eq!(supported("center"), Some("center".to_string()));
        assert_eq!(supported("diagonal"), None);
        assert_eq!(supported(""), None);
    }
}
