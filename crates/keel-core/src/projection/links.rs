//! Initiative link index projection.
//!
//! Set-valued, like the tag index: `initiative id -> set of related radar
//! item ids`, with idempotent add/remove semantics.

use std::collections::{BTreeMap, BTreeSet};

use crate::event::{Event, EventPayload, EventType};

use super::{Projection, ProjectionError};

/// Related radar items per initiative.
#[derive(Debug, Default)]
pub struct LinkIndex {
    links: BTreeMap<String, BTreeSet<String>>,
}

impl LinkIndex {
    /// Items linked to one initiative; empty when none were ever linked.
    #[must_use]
    pub fn for_aggregate(&self, aggregate_id: &str) -> BTreeSet<String> {
        self.links.get(aggregate_id).cloned().unwrap_or_default()
    }

    /// The full index.
    #[must_use]
    pub const fn all(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.links
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Projection for LinkIndex {
    const NAME: &'static str = "links";

    fn interests() -> &'static [EventType] {
        &[EventType::LinkAdded, EventType::LinkRemoved]
    }

    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        match (&event.event_type, &event.payload) {
            (EventType::LinkAdded, EventPayload::LinkAdded(p)) => {
                self.links
                    .entry(event.aggregate_id.clone())
                    .or_default()
                    .insert(p.target_id.clone());
                Ok(())
            }
            (EventType::LinkRemoved, EventPayload::LinkRemoved(p)) => {
                if let Some(set) = self.links.get_mut(&event.aggregate_id) {
                    set.remove(&p.target_id);
                    if set.is_empty() {
                        self.links.remove(&event.aggregate_id);
                    }
                }
                Ok(())
            }
            (EventType::LinkAdded | EventType::LinkRemoved, _) => {
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
