//! # Selection Projector
//!
//! Re-renders the view selection whenever the model selection changes.
//!
//! ```text
//!   Idle ──notify──▶ Projecting ──render(latest)──▶ Idle
//!                        │  ▲
//!            notify ─────┘  └── pending? render again
//! ```
//!
//! Notifications arriving while a render is running are parked in a single
//! pending slot (the newest wins) and rendered once the current render
//! returns, so nested notifications never render against a half-built view.

use std::cell::{Cell, RefCell};
use tracing::debug;
use vellum_model::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectorState {
    Idle,
    Projecting,
}

#[derive(Debug)]
pub struct SelectionProjector {
    state: Cell<ProjectorState>,
    pending: RefCell<Option<Option<Selection>>>,
    renders: Cell<u64>,
}

impl Default for SelectionProjector {
    fn default() -> Self {
        Self {
            state: Cell::new(ProjectorState::Idle),
            pending: RefCell::new(None),
            renders: Cell::new(0),
        }
    }
}

impl SelectionProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProjectorState {
        self.state.get()
    }

    /// Total renders performed
    pub fn renders(&self) -> u64 {
        self.renders.get()
    }

    /// Queue a selection for rendering. Returns true if it will be picked up
    /// by a projection already in progress.
    pub fn notify(&self, selection: Option<Selection>) -> bool {
        let replaced = self.pending.borrow_mut().replace(selection).is_some();
        if replaced {
            debug!("Coalescing pending selection notification");
        }
        self.state.get() == ProjectorState::Projecting
    }

    /// Notify and, unless a projection is already running, render until no
    /// notification is pending
    pub fn project<F>(&self, selection: Option<Selection>, mut render: F)
    where
        F: FnMut(Option<Selection>),
    {
        if self.notify(selection) {
            return;
        }

        self.state.set(ProjectorState::Projecting);
        loop {
            let next = self.pending.borrow_mut().take();
            let Some(selection) = next else {
                break;
            };
            render(selection);
            self.renders.set(self.renders.get() + 1);
        }
        self.state.set(ProjectorState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use vellum_model::Position;

    fn collapsed(offset: usize) -> Option<Selection> {
        Some(Selection::collapsed(Position::new("main", vec![offset])))
    }

    #[test]
    fn test_single_notification_renders_once() {
        let projector = SelectionProjector::new();
        let mut rendered = Vec::new();

        projector.project(collapsed(1), |selection| rendered.push(selection));

        assert_eq!(rendered, vec![collapsed(1)]);
        assert_eq!(projector.renders(), 1);
        assert_eq!(projector.state(), ProjectorState::Idle);
    }

    #[test]
    fn test_reentrant_notifications_coalesce() {
        let projector = Rc::new(SelectionProjector::new());
        let mut rendered = Vec::new();

        let inner = Rc::clone(&projector);
        projector.project(collapsed(0), |selection| {
            if selection == collapsed(0) {
                assert_eq!(inner.state(), ProjectorState::Projecting);
                // Three changes land while the first render runs; only the last one renders
                for offset in 1..=3 {
                    inner.project(collapsed(offset), |_| panic!("nested render"));
                }
            }
            rendered.push(selection);
        });

        assert_eq!(rendered, vec![collapsed(0), collapsed(3)]);
        assert_eq!(projector.renders(), 2);
        assert_eq!(projector.state(), ProjectorState::Idle);
    }

    #[test]
    fn test_cleared_selection_is_rendered() {
        let projector = SelectionProjector::new();
        let mut rendered = Vec::new();

        projector.project(None, |selection| rendered.push(selection));
        assert_eq!(rendered, vec![None]);
    }
}
