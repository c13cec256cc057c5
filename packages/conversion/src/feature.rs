use crate::controller::{DataController, EditingController};
use crate::ConversionError;
use vellum_schema::SchemaRegistry;

/// Everything a feature may register against during setup
pub struct FeatureContext<'a> {
    pub schema: &'a mut SchemaRegistry,
    pub editing: &'a mut EditingController,
    pub data: &'a mut DataController,
}

/// A unit of editor functionality: schema items plus the converters for them.
///
/// Features run once, in order, before the schema is sealed. Required
/// features are initialized first; a feature name is only ever initialized once.
pub trait Feature {
    fn name(&self) -> &'static str;

    fn requires(&self) -> Vec<Box<dyn Feature>> {
        Vec::new()
    }

    fn init(&self, context: &mut FeatureContext<'_>) -> Result<(), ConversionError>;
}
