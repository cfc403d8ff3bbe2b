//! Kanban status mapping projection.
//!
//! Keyed by board-element id, not by the board aggregate. An add inserts
//! the element with its initial status; a move patches the status only if
//! the element already exists — a move for an unknown element is logged
//! and ignored, not an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::{Event, EventPayload, EventType};
use crate::model::KanbanStatus;

use super::{Projection, ProjectionError};

/// Current kanban position of one board element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanEntry {
    pub element_id: String,
    /// The board aggregate the element was added to.
    pub board_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: KanbanStatus,
    pub added_at: DateTime<Utc>,
    /// Timestamp of the last move; equals `added_at` until the first move.
    pub moved_at: DateTime<Utc>,
}

/// All board elements, keyed by element id.
#[derive(Debug, Default)]
pub struct KanbanStatusMap {
    entries: BTreeMap<String, KanbanEntry>,
}

impl KanbanStatusMap {
    /// All entries in element-id order.
    #[must_use]
    pub fn all(&self) -> Vec<KanbanEntry> {
        self.entries.values().cloned().collect()
    }

    /// Look up one element.
    #[must_use]
    pub fn by_element(&self, element_id: &str) -> Option<&KanbanEntry> {
        self.entries.get(element_id)
    }

    /// Entries on one board, element-id order.
    #[must_use]
    pub fn for_board(&self, board_id: &str) -> Vec<KanbanEntry> {
        self.entries
            .values()
            .filter(|entry| entry.board_id == board_id)
            .cloned()
            .collect()
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

impl Projection for KanbanStatusMap {
    const NAME: &'static str = "kanban";

    fn interests() -> &'static [EventType] {
        &[EventType::ElementAdded, EventType::ElementMoved]
    }

    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        match (&event.event_type, &event.payload) {
            (EventType::ElementAdded, EventPayload::ElementAdded(p)) => {
                if self.entries.contains_key(&p.element_id) {
                    tracing::debug!(
                        element = %p.element_id,
                        "duplicate board.element-added ignored"
                    );
                    return Ok(());
                }
                self.entries.insert(
                    p.element_id.clone(),
                    KanbanEntry {
                        element_id: p.element_id.clone(),
                        board_id: event.aggregate_id.clone(),
                        title: p.title.clone(),
                        status: p.status,
                        added_at: event.timestamp,
                        moved_at: event.timestamp,
                    },
                );
                Ok(())
            }
            (EventType::ElementMoved, EventPayload::ElementMoved(p)) => {
                let Some(entry) = self.entries.get_mut(&p.element_id) else {
                    tracing::warn!(
                        element = %p.element_id,
                        board = %event.aggregate_id,
                        to_status = %p.to_status,
                        "move for unknown board element ignored"
                    );
                    return Ok(());
                };
                entry.status = p.to_status;
                entry.moved_at = event.timestamp;
                Ok(())
            }
            (EventType::ElementAdded | EventType::ElementMoved, _) => {
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
