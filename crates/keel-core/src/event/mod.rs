//! Event data model for the keel event log.
//!
//! This module defines the core `Event` struct, the `EventType` enum
//! covering all 15 event types, typed payload structs, and the entity
//! catalog shared by the log and the projections.
//!
//! # Event schema
//!
//! Events serialize as one camelCase JSON object:
//!
//! ```text
//! { "type": "team.created", "entity": "team", "aggregateId": "team-1",
//!   "timestamp": "2024-03-01T09:00:00Z", "payload": { ... },
//!   "metadata": { ... } }
//! ```
//!
//! The `payload` schema is fixed per `type`; because the discriminant is
//! external to the payload object, `Event` carries a custom `Deserialize`
//! impl that parses the payload through
//! [`EventPayload::deserialize_for`].

pub mod payload;
pub mod types;
pub mod validate;

pub use payload::{
    CompanyCreatedPayload, CompanyUpdatedPayload, ElementAddedPayload, ElementMovedPayload,
    EventPayload, InitiativeCreatedPayload, InitiativeDeletedPayload, InitiativeUpdatedPayload,
    LinkPayload, PayloadParseError, StrategyCreatedPayload, StrategyUpdatedPayload, TagPayload,
    TeamCreatedPayload, TeamUpdatedPayload,
};
pub use types::{EventType, UnknownEventType};
pub use validate::InvalidEventError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// The aggregate kinds tracked by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Team,
    Company,
    Strategy,
    Initiative,
    /// A kanban board; its events carry the moved element in the payload.
    Board,
    /// A radar item.
    Item,
}

impl Entity {
    /// Return the lowercase string form used in the event schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Company => "company",
            Self::Strategy => "strategy",
            Self::Initiative => "initiative",
            Self::Board => "board",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entity {
    type Err = crate::model::InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team" => Ok(Self::Team),
            "company" => Ok(Self::Company),
            "strategy" => Ok(Self::Strategy),
            "initiative" => Ok(Self::Initiative),
            "board" => Ok(Self::Board),
            "item" => Ok(Self::Item),
            _ => Err(crate::model::InvalidEnumValue {
                kind: "entity",
                raw: s.to_string(),
                expected: "team, company, strategy, initiative, board, item",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A single event in the keel event log.
///
/// Events are immutable facts: once appended they are never mutated or
/// removed, and deletions are themselves events
/// ([`EventType::InitiativeDeleted`]), not removals from the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// The mutation this event represents.
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// The aggregate kind; must agree with `event_type`'s entity mapping.
    pub entity: Entity,

    /// Identifies which instance of the entity the event belongs to.
    pub aggregate_id: String,

    /// ISO-8601 timestamp. Within one aggregate, events apply in timestamp
    /// order; ties are broken by log append order.
    pub timestamp: DateTime<Utc>,

    /// Typed payload specific to the event type.
    pub payload: EventPayload,

    /// Auxiliary identifiers not central to the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// Auxiliary identifiers carried next to the payload so projections that
/// need them (e.g. the link index) do not re-derive them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Initiative related to this event, when it is not the aggregate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_id: Option<String>,
    /// Radar item related to this event, when it is not the aggregate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Unknown fields, preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        /// Two-pass deserialization: read the `type` tag first, then use it
        /// to deserialize the payload object.
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct EventRaw {
            #[serde(rename = "type")]
            event_type: EventType,
            entity: Entity,
            aggregate_id: String,
            timestamp: DateTime<Utc>,
            payload: serde_json::Value,
            #[serde(default)]
            metadata: Option<EventMetadata>,
        }

        let raw = EventRaw::deserialize(deserializer)?;
        let payload_json = raw.payload.to_string();
        let payload = EventPayload::deserialize_for(raw.event_type, &payload_json)
            .map_err(serde::de::Error::custom)?;

        Ok(Self {
            event_type: raw.event_type,
            entity: raw.entity,
            aggregate_id: raw.aggregate_id,
            timestamp: raw.timestamp,
            payload,
            metadata: raw.metadata,
        })
    }
}

impl Event {
    /// Build an event with `entity` derived from the event type.
    #[must_use]
    pub fn new(
        event_type: EventType,
        aggregate_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_type,
            entity: event_type.entity(),
            aggregate_id: aggregate_id.into(),
            timestamp,
            payload,
            metadata: None,
        }
    }

    /// Attach metadata, builder style.
    #[must_use]
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.timestamp.to_rfc3339(),
            self.event_type,
            self.aggregate_id,
            self.payload,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
