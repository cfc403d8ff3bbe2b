//! Tag index projection.
//!
//! Set-valued: `aggregate id -> set of tags`, with idempotent add/remove.
//! Adding a tag twice is a no-op, removing an absent tag is a no-op, and a
//! key whose set drains to empty is dropped.

use std::collections::{BTreeMap, BTreeSet};

use crate::event::{Event, EventPayload, EventType};

use super::{Projection, ProjectionError};

/// Tags per radar item.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: BTreeMap<String, BTreeSet<String>>,
}

impl TagIndex {
    /// Tags attached to one aggregate; empty when none were ever added.
    #[must_use]
    pub fn for_aggregate(&self, aggregate_id: &str) -> BTreeSet<String> {
        self.tags.get(aggregate_id).cloned().unwrap_or_default()
    }

    /// The full index.
    #[must_use]
    pub const fn all(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.tags
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Projection for TagIndex {
    const NAME: &'static str = "tags";

    fn interests() -> &'static [EventType] {
        &[EventType::TagAdded, EventType::TagRemoved]
    }

    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        match (&event.event_type, &event.payload) {
            (EventType::TagAdded, EventPayload::TagAdded(p)) => {
                self.tags
                    .entry(event.aggregate_id.clone())
                    .or_default()
                    .insert(p.tag.clone());
                Ok(())
            }
            (EventType::TagRemoved, EventPayload::TagRemoved(p)) => {
                if let Some(set) = self.tags.get_mut(&event.aggregate_id) {
                    set.remove(&p.tag);
                    if set.is_empty() {
                        self.tags.remove(&event.aggregate_id);
                    }
                }
                Ok(())
            }
            (EventType::TagAdded | EventType::TagRemoved, _) => {
                Err(ProjectionError::PayloadMismatch {
                    projection: Self::NAME,
                    event_type: event.event_type,
                })
            }
            _ => Err(ProjectionError::UnexpectedEventType {
                projection: Self::NAME,
                event_type: event.event_type,
            }),
        }
    }
}
