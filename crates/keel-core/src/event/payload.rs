//! Typed payload structs for each event type.
//!
//! Each event type has a corresponding payload struct defining its JSON
//! schema. Field names are camelCase on the wire, matching the dashboard
//! event schema. Unknown fields are preserved via `#[serde(flatten)]` for
//! forward compatibility.

use crate::model::{KanbanStatus, StrategyState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::types::EventType;

// ---------------------------------------------------------------------------
// EventPayload — the unified payload enum
// ---------------------------------------------------------------------------

/// Typed payload for an event. The discriminant comes from [`EventType`],
/// not from the payload JSON itself (it is an external tag in the event
/// schema).
///
/// **Serde note:** `EventPayload` implements `Serialize` manually
/// (dispatching to the inner struct) but does **not** implement
/// `Deserialize` directly. Use [`EventPayload::deserialize_for`] with the
/// known [`EventType`]. The [`Event`](super::Event) struct handles this in
/// its custom `Deserialize` impl.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Payload for `team.created`.
    TeamCreated(TeamCreatedPayload),
    /// Payload for `team.updated`.
    TeamUpdated(TeamUpdatedPayload),
    /// Payload for `company.created`.
    CompanyCreated(CompanyCreatedPayload),
    /// Payload for `company.updated`.
    CompanyUpdated(CompanyUpdatedPayload),
    /// Payload for `strategy.created`.
    StrategyCreated(StrategyCreatedPayload),
    /// Payload for `strategy.updated`.
    StrategyUpdated(StrategyUpdatedPayload),
    /// Payload for `initiative.created`.
    InitiativeCreated(InitiativeCreatedPayload),
    /// Payload for `initiative.updated`.
    InitiativeUpdated(InitiativeUpdatedPayload),
    /// Payload for `initiative.deleted`.
    InitiativeDeleted(InitiativeDeletedPayload),
    /// Payload for `board.element-added`.
    ElementAdded(ElementAddedPayload),
    /// Payload for `board.element-moved`.
    ElementMoved(ElementMovedPayload),
    /// Payload for `item.tag-added`.
    TagAdded(TagPayload),
    /// Payload for `item.tag-removed`.
    TagRemoved(TagPayload),
    /// Payload for `initiative.link-added`.
    LinkAdded(LinkPayload),
    /// Payload for `initiative.link-removed`.
    LinkRemoved(LinkPayload),
}

impl EventPayload {
    /// Deserialize a JSON string into the correct `EventPayload` variant
    /// based on the event type.
    ///
    /// This is the primary deserialization entry point since the type
    /// discriminant lives in a separate event field, not in the payload
    /// JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadParseError`] if the JSON is malformed or does not
    /// match the expected schema for the given event type.
    pub fn deserialize_for(event_type: EventType, json: &str) -> Result<Self, PayloadParseError> {
        let result = match event_type {
            EventType::TeamCreated => {
                serde_json::from_str::<TeamCreatedPayload>(json).map(EventPayload::TeamCreated)
            }
            EventType::TeamUpdated => {
                serde_json::from_str::<TeamUpdatedPayload>(json).map(EventPayload::TeamUpdated)
            }
            EventType::CompanyCreated => serde_json::from_str::<CompanyCreatedPayload>(json)
                .map(EventPayload::CompanyCreated),
            EventType::CompanyUpdated => serde_json::from_str::<CompanyUpdatedPayload>(json)
                .map(EventPayload::CompanyUpdated),
            EventType::StrategyCreated => serde_json::from_str::<StrategyCreatedPayload>(json)
                .map(EventPayload::StrategyCreated),
            EventType::StrategyUpdated => serde_json::from_str::<StrategyUpdatedPayload>(json)
                .map(EventPayload::StrategyUpdated),
            EventType::InitiativeCreated => serde_json::from_str::<InitiativeCreatedPayload>(json)
                .map(EventPayload::InitiativeCreated),
            EventType::InitiativeUpdated => serde_json::from_str::<InitiativeUpdatedPayload>(json)
                .map(EventPayload::InitiativeUpdated),
            EventType::InitiativeDeleted => serde_json::from_str::<InitiativeDeletedPayload>(json)
                .map(EventPayload::InitiativeDeleted),
            EventType::ElementAdded => {
                serde_json::from_str::<ElementAddedPayload>(json).map(EventPayload::ElementAdded)
            }
            EventType::ElementMoved => {
                serde_json::from_str::<ElementMovedPayload>(json).map(EventPayload::ElementMoved)
            }
            EventType::TagAdded => {
                serde_json::from_str::<TagPayload>(json).map(EventPayload::TagAdded)
            }
            EventType::TagRemoved => {
                serde_json::from_str::<TagPayload>(json).map(EventPayload::TagRemoved)
            }
            EventType::LinkAdded => {
                serde_json::from_str::<LinkPayload>(json).map(EventPayload::LinkAdded)
            }
            EventType::LinkRemoved => {
                serde_json::from_str::<LinkPayload>(json).map(EventPayload::LinkRemoved)
            }
        };

        result.map_err(|source| PayloadParseError { event_type, source })
    }

    /// The event type this payload variant belongs to.
    ///
    /// Append validation rejects events whose payload tag disagrees with
    /// their declared `event_type`.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::TeamCreated(_) => EventType::TeamCreated,
            Self::TeamUpdated(_) => EventType::TeamUpdated,
            Self::CompanyCreated(_) => EventType::CompanyCreated,
            Self::CompanyUpdated(_) => EventType::CompanyUpdated,
            Self::StrategyCreated(_) => EventType::StrategyCreated,
            Self::StrategyUpdated(_) => EventType::StrategyUpdated,
            Self::InitiativeCreated(_) => EventType::InitiativeCreated,
            Self::InitiativeUpdated(_) => EventType::InitiativeUpdated,
            Self::InitiativeDeleted(_) => EventType::InitiativeDeleted,
            Self::ElementAdded(_) => EventType::ElementAdded,
            Self::ElementMoved(_) => EventType::ElementMoved,
            Self::TagAdded(_) => EventType::TagAdded,
            Self::TagRemoved(_) => EventType::TagRemoved,
            Self::LinkAdded(_) => EventType::LinkAdded,
            Self::LinkRemoved(_) => EventType::LinkRemoved,
        }
    }

    /// Serialize the payload to a [`serde_json::Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the inner struct fails to serialize (should not
    /// happen with well-formed data).
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::TeamCreated(p) => serde_json::to_value(p),
            Self::TeamUpdated(p) => serde_json::to_value(p),
            Self::CompanyCreated(p) => serde_json::to_value(p),
            Self::CompanyUpdated(p) => serde_json::to_value(p),
            Self::StrategyCreated(p) => serde_json::to_value(p),
            Self::StrategyUpdated(p) => serde_json::to_value(p),
            Self::InitiativeCreated(p) => serde_json::to_value(p),
            Self::InitiativeUpdated(p) => serde_json::to_value(p),
            Self::InitiativeDeleted(p) => serde_json::to_value(p),
            Self::ElementAdded(p) => serde_json::to_value(p),
            Self::ElementMoved(p) => serde_json::to_value(p),
            Self::TagAdded(p) | Self::TagRemoved(p) => serde_json::to_value(p),
            Self::LinkAdded(p) | Self::LinkRemoved(p) => serde_json::to_value(p),
        }
    }
}

impl Serialize for EventPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::TeamCreated(p) => p.serialize(serializer),
            Self::TeamUpdated(p) => p.serialize(serializer),
            Self::CompanyCreated(p) => p.serialize(serializer),
            Self::CompanyUpdated(p) => p.serialize(serializer),
            Self::StrategyCreated(p) => p.serialize(serializer),
            Self::StrategyUpdated(p) => p.serialize(serializer),
            Self::InitiativeCreated(p) => p.serialize(serializer),
            Self::InitiativeUpdated(p) => p.serialize(serializer),
            Self::InitiativeDeleted(p) => p.serialize(serializer),
            Self::ElementAdded(p) => p.serialize(serializer),
            Self::ElementMoved(p) => p.serialize(serializer),
            Self::TagAdded(p) | Self::TagRemoved(p) => p.serialize(serializer),
            Self::LinkAdded(p) | Self::LinkRemoved(p) => p.serialize(serializer),
        }
    }
}

/// Error produced when a payload fails to deserialize for its event type.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse {event_type} payload: {source}")]
pub struct PayloadParseError {
    /// The event type whose schema was expected.
    pub event_type: EventType,
    /// The underlying serde error.
    #[source]
    pub source: serde_json::Error,
}

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// Payload for `team.created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCreatedPayload {
    /// Display name of the team.
    pub name: String,
    /// Depth in the org hierarchy; 0 is the top level.
    pub level: u32,
    /// Optional mission statement shown on the team card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    /// Unknown fields, preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `team.updated`. Absent fields leave the projected value
/// untouched; a field is never cleared by omission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamUpdatedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `company.created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCreatedPayload {
    /// Display name of the company.
    pub name: String,
    /// Optional market segment label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `company.updated`. Patch semantics as for teams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdatedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `strategy.created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyCreatedPayload {
    /// Display name of the strategy.
    pub name: String,
    /// Initial lifecycle state; defaults to `draft` when omitted.
    #[serde(default)]
    pub state: StrategyState,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `strategy.updated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyUpdatedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StrategyState>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `initiative.created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeCreatedPayload {
    /// Display name of the initiative.
    pub name: String,
    /// Owning team. The catalog snapshots the team's name/level from this
    /// at creation time.
    pub team_id: String,
    /// Strategy this initiative contributes to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `initiative.updated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeUpdatedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Re-point the initiative at a different strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `initiative.deleted` (soft delete).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeDeletedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `board.element-added`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAddedPayload {
    /// Board element being placed; the kanban projection is keyed by this.
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column the element starts in; defaults to `NEW` when omitted.
    #[serde(default)]
    pub status: KanbanStatus,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `board.element-moved`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMovedPayload {
    pub element_id: String,
    pub to_status: KanbanStatus,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `item.tag-added` / `item.tag-removed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPayload {
    pub tag: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload for `initiative.link-added` / `initiative.link-removed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    /// The related radar item.
    pub target_id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl fmt::Display for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TeamCreated(p) => write!(f, "create team: {}", p.name),
            Self::TeamUpdated(_) => f.write_str("update team"),
            Self::CompanyCreated(p) => write!(f, "create company: {}", p.name),
            Self::CompanyUpdated(_) => f.write_str("update company"),
            Self::StrategyCreated(p) => write!(f, "create strategy: {} ({})", p.name, p.state),
            Self::StrategyUpdated(_) => f.write_str("update strategy"),
            Self::InitiativeCreated(p) => write!(f, "create initiative: {}", p.name),
            Self::InitiativeUpdated(_) => f.write_str("update initiative"),
            Self::InitiativeDeleted(_) => f.write_str("delete initiative"),
            Self::ElementAdded(p) => write!(f, "add {} ({})", p.element_id, p.status),
            Self::ElementMoved(p) => write!(f, "move {} -> {}", p.element_id, p.to_status),
            Self::TagAdded(p) => write!(f, "tag +{}", p.tag),
            Self::TagRemoved(p) => write!(f, "tag -{}", p.tag),
            Self::LinkAdded(p) => write!(f, "link +{}", p.target_id),
            Self::LinkRemoved(p) => write!(f, "link -{}", p.target_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
