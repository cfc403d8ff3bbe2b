//! Append-path batch validation.
//!
//! Validation runs before any mutation: a rejected batch leaves the log and
//! every projection untouched. Handler failures after a successful append
//! are a separate concern and never surface here.

use super::{Entity, Event, EventType};
use crate::error::ErrorCode;

/// Caller-visible error for a malformed append batch.
///
/// The `index` fields refer to the offending event's position within the
/// submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEventError {
    /// `append` requires a non-empty batch.
    #[error("append batch is empty")]
    EmptyBatch,

    /// An event was submitted without an aggregate id.
    #[error("event {index} ({event_type}) has an empty aggregate id")]
    MissingAggregateId {
        index: usize,
        event_type: EventType,
    },

    /// An event's declared `entity` disagrees with its event type.
    #[error(
        "event {index} ({event_type}) declares entity '{found}' but the type belongs to '{expected}'"
    )]
    EntityMismatch {
        index: usize,
        event_type: EventType,
        expected: Entity,
        found: Entity,
    },

    /// An event carries a payload variant for a different event type.
    #[error("event {index} ({event_type}) carries a {payload_type} payload")]
    PayloadMismatch {
        index: usize,
        event_type: EventType,
        payload_type: EventType,
    },
}

impl InvalidEventError {
    /// Stable machine-readable code for this rejection.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyBatch => ErrorCode::EmptyAppendBatch,
            Self::MissingAggregateId { .. } => ErrorCode::MissingAggregateId,
            Self::EntityMismatch { .. } => ErrorCode::EntityMismatch,
            Self::PayloadMismatch { .. } => ErrorCode::PayloadMismatch,
        }
    }
}

/// Validate an append batch, returning the first violation found.
///
/// # Errors
///
/// Returns an [`InvalidEventError`] if the batch is empty or any event has
/// an empty aggregate id, an entity that disagrees with its type, or a
/// payload tagged for a different type.
pub fn validate_batch(events: &[Event]) -> Result<(), InvalidEventError> {
    if events.is_empty() {
        return Err(InvalidEventError::EmptyBatch);
    }

    for (index, event) in events.iter().enumerate() {
        if event.aggregate_id.trim().is_empty() {
            return Err(InvalidEventError::MissingAggregateId {
                index,
                event_type: event.event_type,
            });
        }

        let expected = event.event_type.entity();
        if event.entity != expected {
            return Err(InvalidEventError::EntityMismatch {
                index,
                event_type: event.event_type,
                expected,
                found: event.entity,
            });
        }

        let payload_type = event.payload.event_type();
        if payload_type != event.event_type {
            return Err(InvalidEventError::PayloadMismatch {
                index,
                event_type: event.event_type,
                payload_type,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::payload::{EventPayload, TagPayload, TeamCreatedPayload};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn team_created(id: &str) -> Event {
        Event::new(
            EventType::TeamCreated,
            id,
            Utc.timestamp_opt(1_709_280_000, 0).single().expect("ts"),
            EventPayload::TeamCreated(TeamCreatedPayload {
                name: "Platform".into(),
                level: 1,
                mission: None,
                extra: BTreeMap::new(),
            }),
        )
    }

    #[test]
    fn accepts_well_formed_batch() {
        let batch = vec![team_created("team-1"), team_created("team-2")];
        assert!(validate_batch(&batch).is_ok());
    }

    #[test]
    fn rejects_empty_batch() {
        let err = validate_batch(&[]).unwrap_err();
        assert_eq!(err, InvalidEventError::EmptyBatch);
        assert_eq!(err.code(), ErrorCode::EmptyAppendBatch);
    }

    #[test]
    fn rejects_blank_aggregate_id() {
        let batch = vec![team_created("team-1"), team_created("  ")];
        let err = validate_batch(&batch).unwrap_err();
        assert_eq!(
            err,
            InvalidEventError::MissingAggregateId {
                index: 1,
                event_type: EventType::TeamCreated,
            }
        );
        assert_eq!(err.code(), ErrorCode::MissingAggregateId);
    }

    #[test]
    fn rejects_entity_mismatch() {
        let mut event = team_created("team-1");
        event.entity = Entity::Company;
        let err = validate_batch(&[event]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EntityMismatch);
        assert!(err.to_string().contains("company"));
        assert!(err.to_string().contains("team"));
    }

    #[test]
    fn rejects_payload_tag_mismatch() {
        let mut event = team_created("team-1");
        event.payload = EventPayload::TagAdded(TagPayload {
            tag: "ml".into(),
            extra: BTreeMap::new(),
        });
        let err = validate_batch(&[event]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PayloadMismatch);
        assert!(err.to_string().contains("item.tag-added"));
    }

    #[test]
    fn validation_reports_first_violation_only() {
        let mut bad_entity = team_created("team-2");
        bad_entity.entity = Entity::Item;
        let batch = vec![team_created(""), bad_entity];
        // Index 0 fails first.
        assert!(matches!(
            validate_batch(&batch).unwrap_err(),
            InvalidEventError::MissingAggregateId { index: 0, .. }
        ));
    }
}
