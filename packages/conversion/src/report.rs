use crate::dispatcher::{FireOutcome, ListenerId};
use crate::event::EventName;
use crate::ConversionError;
use serde::Serialize;

/// A listener that failed during dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterFault {
    pub event: EventName,
    pub listener: ListenerId,
    pub error: ConversionError,
}

/// Bookkeeping of one conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    /// Events fired
    pub fired: usize,
    /// Events no listener claimed
    pub misses: Vec<EventName>,
    pub faults: Vec<ConverterFault>,
}

impl ConversionReport {
    pub fn record(&mut self, outcome: FireOutcome) {
        self.fired += 1;
        self.faults.extend(outcome.faults);
    }

    pub fn miss(&mut self, name: EventName) {
        self.misses.push(name);
    }

    pub fn merge(&mut self, other: ConversionReport) {
        self.fired += other.fired;
        self.misses.extend(other.misses);
        self.faults.extend(other.faults);
    }

    pub fn is_clean(&self) -> bool {
        self.misses.is_empty() && self.faults.is_empty()
    }
}

/// Why a view fragment did not make it into the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnrecognizedReason {
    /// No converter claimed the fragment
    NoConverter,
    /// A converter produced a node the schema rejected in this context
    SchemaRejected,
}

/// View fragment dropped, in whole or in part, during view → model conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unrecognized {
    /// Path of the fragment inside the converted input
    pub path: Vec<usize>,
    /// View element name, or `#text`
    pub name: String,
    pub reason: UnrecognizedReason,
}
