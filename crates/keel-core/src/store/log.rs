//! The append-only event log.
//!
//! The log is the single source of truth: an ordered sequence of immutable
//! events whose only mutation is appending at the tail. It is owned
//! exclusively by the [`EventStore`](super::EventStore); nothing else can
//! reach it mutably.

use crate::event::{Entity, Event};

/// Ordered, append-only event history.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// An empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append a batch at the tail in array order, returning the index of
    /// the first appended event.
    pub fn append(&mut self, events: Vec<Event>) -> usize {
        let start = self.events.len();
        self.events.extend(events);
        start
    }

    /// The full ordered log.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Read-only snapshot of the full log, in log order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// Ordered subsequence for one aggregate, optionally narrowed by
    /// entity, preserving log order.
    #[must_use]
    pub fn for_aggregate(&self, aggregate_id: &str, entity: Option<Entity>) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .filter(|e| entity.is_none_or(|wanted| e.entity == wanted))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event. Test-isolation only, reached through
    /// [`EventStore::reset`](super::EventStore::reset).
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
