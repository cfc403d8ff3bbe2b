//! Event-log view projection: the activity feed.
//!
//! Not aggregate-keyed — simply the full event list, newest first. The
//! live increment is a prepend. Interested in every event type.

use std::collections::VecDeque;

use crate::event::{Event, EventType};

use super::{Projection, ProjectionError};

/// The full event history, newest first.
#[derive(Debug, Default)]
pub struct EventFeed {
    entries: VecDeque<Event>,
}

impl EventFeed {
    /// Newest-first entries, truncated to `limit` when given.
    #[must_use]
    pub fn entries(&self, limit: Option<usize>) -> Vec<Event> {
        let take = limit.unwrap_or(self.entries.len());
        self.entries.iter().take(take).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Projection for EventFeed {
    const NAME: &'static str = "feed";

    fn interests() -> &'static [EventType] {
        &EventType::ALL
    }

    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        self.entries.push_front(event.clone());
        Ok(())
    }
}
