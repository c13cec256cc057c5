//! # Dispatcher
//!
//! An event bus holding listeners per event pattern. Each pattern keeps an
//! insertion-ordered list of `(priority, sequence, handler)` registrations;
//! firing merges the lists of every namespace the event belongs to and runs
//! them by descending priority, earliest registration first on ties.
//!
//! A listener returning `Err` is logged and recorded as a fault; dispatch
//! moves on to the next listener.

use crate::event::{EventInfo, EventName};
use crate::report::ConverterFault;
use crate::ConversionError;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use vellum_common::Priority;

pub type ListenerId = u64;

#[derive(Debug, Clone)]
struct Registration<H> {
    id: ListenerId,
    priority: i32,
    handler: H,
}

/// Result of one `fire`
#[derive(Debug, Default)]
pub struct FireOutcome {
    pub invoked: usize,
    pub faults: Vec<ConverterFault>,
    pub stopped: bool,
}

#[derive(Debug, Clone)]
pub struct Dispatcher<H> {
    label: String,
    listeners: BTreeMap<EventName, Vec<Registration<H>>>,
    next_id: ListenerId,
}

impl<H: Clone> Dispatcher<H> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Register a handler for `pattern`
    pub fn register(&mut self, pattern: impl Into<EventName>, priority: Priority, handler: H) -> ListenerId {
        let pattern = pattern.into();
        let id = self.next_id;
        self.next_id += 1;

        debug!(dispatcher = %self.label, event = %pattern, %priority, listener = id, "Registering listener");

        self.listeners.entry(pattern).or_default().push(Registration {
            id,
            priority: priority.value(),
            handler,
        });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for registrations in self.listeners.values_mut() {
            let before = registrations.len();
            registrations.retain(|registration| registration.id != id);
            removed |= registrations.len() != before;
        }
        self.listeners.retain(|_, registrations| !registrations.is_empty());
        removed
    }

    /// Handlers reached by firing `name`, in invocation order
    pub fn listeners(&self, name: &EventName) -> Vec<(ListenerId, H)> {
        let mut matched: Vec<&Registration<H>> = name
            .namespaces()
            .iter()
            .filter_map(|pattern| self.listeners.get(pattern))
            .flatten()
            .collect();

        matched.sort_by_key(|registration| (Reverse(registration.priority), registration.id));

        matched
            .into_iter()
            .map(|registration| (registration.id, registration.handler.clone()))
            .collect()
    }

    pub fn has_listeners(&self, name: &EventName) -> bool {
        name.namespaces()
            .iter()
            .any(|pattern| self.listeners.contains_key(pattern))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Run every listener of `name` through `invoke` until one stops the event
    pub fn fire_with<F>(&self, name: &EventName, mut invoke: F) -> FireOutcome
    where
        F: FnMut(&H, &mut EventInfo) -> Result<(), ConversionError>,
    {
        let mut info = EventInfo::new(name.clone());
        let mut outcome = FireOutcome::default();

        for (id, handler) in self.listeners(name) {
            outcome.invoked += 1;

            if let Err(error) = invoke(&handler, &mut info) {
                warn!(dispatcher = %self.label, event = %name, listener = id, error = %error, "Converter failed");
                outcome.faults.push(ConverterFault {
                    event: name.clone(),
                    listener: id,
                    error,
                });
            }

            if info.is_stopped() {
                outcome.stopped = true;
                break;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Recorder = Rc<dyn Fn(&mut EventInfo, &mut Vec<String>) -> Result<(), ConversionError>>;

    fn recorder(tag: &'static str) -> Recorder {
        Rc::new(move |_: &mut EventInfo, log: &mut Vec<String>| -> Result<(), ConversionError> {
            log.push(tag.to_string());
            Ok(())
        })
    }

    fn fire(dispatcher: &Dispatcher<Recorder>, name: &str) -> (Vec<String>, FireOutcome) {
        let mut log = Vec::new();
        let outcome = dispatcher.fire_with(&EventName::from(name), |handler, info| handler(info, &mut log));
        (log, outcome)
    }

    #[test]
    fn test_priority_then_registration_order() {
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new("test");

        dispatcher.register("insert:image", Priority::Normal, recorder("normal-1"));
        dispatcher.register("insert:image", Priority::Low, recorder("low"));
        dispatcher.register("insert:image", Priority::Highest, recorder("highest"));
        dispatcher.register("insert:image", Priority::Normal, recorder("normal-2"));
        dispatcher.register("insert:image", Priority::Custom(5), recorder("custom"));
        dispatcher.register("insert:image", Priority::Normal, recorder("normal-3"));

        let (log, outcome) = fire(&dispatcher, "insert:image");

        assert_eq!(log, vec!["highest", "custom", "normal-1", "normal-2", "normal-3", "low"]);
        assert_eq!(outcome.invoked, 6);
        assert!(!outcome.stopped);
    }

    #[test]
    fn test_many_equal_priority_listeners_keep_registration_order() {
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new("test");
        let tags: Vec<&'static str> = vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];

        for (index, tag) in tags.iter().enumerate() {
            // Alternate between the specific and the generic pattern
            let pattern = if index % 2 == 0 { "insert:paragraph" } else { "insert" };
            dispatcher.register(pattern, Priority::Normal, recorder(tag));
        }

        let (log, _) = fire(&dispatcher, "insert:paragraph");
        assert_eq!(log, tags);
    }

    #[test]
    fn test_namespaced_listeners() {
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new("test");
        dispatcher.register("insert", Priority::Low, recorder("any insert"));
        dispatcher.register("insert:paragraph", Priority::Normal, recorder("paragraph"));
        dispatcher.register("insert:image", Priority::Normal, recorder("image"));

        let (log, _) = fire(&dispatcher, "insert:paragraph");
        assert_eq!(log, vec!["paragraph", "any insert"]);

        let (log, _) = fire(&dispatcher, "remove:paragraph");
        assert!(log.is_empty());
        assert!(!dispatcher.has_listeners(&EventName::from("remove:paragraph")));
    }

    #[test]
    fn test_stop_halts_dispatch() {
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new("test");
        dispatcher.register("selection", Priority::High, recorder("first"));
        dispatcher.register(
            "selection",
            Priority::Normal,
            Rc::new(|info: &mut EventInfo, log: &mut Vec<String>| -> Result<(), ConversionError> {
                log.push("stopper".to_string());
                info.stop();
                Ok(())
            }),
        );
        dispatcher.register("selection", Priority::Low, recorder("never"));

        let (log, outcome) = fire(&dispatcher, "selection");

        assert_eq!(log, vec!["first", "stopper"]);
        assert!(outcome.stopped);
        assert_eq!(outcome.invoked, 2);
    }

    #[test]
    fn test_failing_listener_does_not_break_dispatch() {
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new("test");
        let failing = dispatcher.register(
            "insert:image",
            Priority::High,
            Rc::new(|_: &mut EventInfo, _: &mut Vec<String>| -> Result<(), ConversionError> {
                Err(ConversionError::from("broken converter"))
            }),
        );
        dispatcher.register("insert:image", Priority::Normal, recorder("second"));

        let (log, outcome) = fire(&dispatcher, "insert:image");

        assert_eq!(log, vec!["second"]);
        assert_eq!(outcome.invoked, 2);
        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].listener, failing);
        assert_eq!(outcome.faults[0].error, ConversionError::Converter("broken converter".to_string()));
    }

    #[test]
    fn test_off_removes_listener() {
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new("test");
        let first = dispatcher.register("text", Priority::Normal, recorder("first"));
        dispatcher.register("text", Priority::Normal, recorder("second"));

        assert!(dispatcher.off(first));
        assert!(!dispatcher.off(first));
        assert_eq!(dispatcher.listener_count(), 1);

        let (log, _) = fire(&dispatcher, "text");
        assert_eq!(log, vec!["second"]);
    }

    #[test]
    fn test_listeners_may_share_state() {
        let counter = Rc::new(RefCell::new(0));
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new("test");

        for _ in 0..3 {
            let counter = Rc::clone(&counter);
            dispatcher.register(
                "text",
                Priority::Normal,
                Rc::new(move |_: &mut EventInfo, _: &mut Vec<String>| -> Result<(), ConversionError> {
                    *counter.borrow_mut() += 1;
                    Ok(())
                }),
            );
        }

        fire(&dispatcher, "text");
        assert_eq!(*counter.borrow(), 3);
    }
}
