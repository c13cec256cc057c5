//! # Vellum Conversion
//!
//! Event-driven conversion between the model and the view.
//!
//! ## Pipelines
//!
//! ```text
//!                 ┌──────────── editing ────────────┐
//! AppliedBatch ──▶│ insert / remove / attribute     │──▶ live ViewDocument
//!                 │ selection (range or widget fake)│
//!                 └─────────────────────────────────┘
//!                 ┌───────────── data ──────────────┐
//! ModelDocument ─▶│ model → view (detached)         │──▶ HTML
//! view fragment ─▶│ view → model + schema gate      │──▶ ModelNode[]
//!                 └─────────────────────────────────┘
//! ```
//!
//! Converters are listeners registered on a [`Dispatcher`] under a
//! namespaced event name and a [`Priority`](vellum_common::Priority). Each
//! aspect of a converted item (its insertion, every attribute) is a
//! consumable: the first listener to consume it owns it, later listeners
//! skip it. Anything left unconsumed is reported as a miss.

pub mod builders;
mod consumable;
mod controller;
mod dispatcher;
mod error;
mod event;
mod feature;
mod mapper;
mod model_to_view;
mod report;
mod selection;
mod view_to_model;
pub mod widget;

pub use consumable::{attribute_aspect, Consumable};
pub use controller::{DataController, EditingController};
pub use dispatcher::{Dispatcher, FireOutcome, ListenerId};
pub use error::ConversionError;
pub use event::{EventInfo, EventName};
pub use feature::{Feature, FeatureContext};
pub use mapper::Mapper;
pub use model_to_view::{
    Aspect, ModelConversionApi, ModelHandler, ModelToViewData, ModelToViewDispatcher, INSERT, REMOVE,
};
pub use report::{ConversionReport, ConverterFault, Unrecognized, UnrecognizedReason};
pub use selection::{ProjectorState, SelectionProjector};
pub use view_to_model::{
    ConversionResult, ViewAspect, ViewConversionApi, ViewHandler, ViewToModelData, ViewToModelDispatcher, NAME,
};
pub use widget::{to_widget, WidgetEngine, WidgetRegistry, DEFAULT_FAKE_SELECTION_LABEL};
