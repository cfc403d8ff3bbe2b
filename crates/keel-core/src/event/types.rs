//! Event type enum covering the 15 domain event types.
//!
//! Each event type corresponds to one mutation of a dashboard aggregate.
//! The string representation uses the `<entity>.<verb>` dotted format used
//! in the JSON event log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Entity;

/// The 15 event types in the keel event catalog.
///
/// String representation follows the `<entity>.<verb>` convention of the
/// JSON event schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Create a new team.
    TeamCreated,
    /// Patch fields of an existing team.
    TeamUpdated,
    /// Create a new company.
    CompanyCreated,
    /// Patch fields of an existing company.
    CompanyUpdated,
    /// Create a new strategy.
    StrategyCreated,
    /// Patch fields (including lifecycle state) of a strategy.
    StrategyUpdated,
    /// Create a new initiative under a team.
    InitiativeCreated,
    /// Patch fields of an initiative.
    InitiativeUpdated,
    /// Soft-delete an initiative (tombstone).
    InitiativeDeleted,
    /// Place a board element on a kanban board with an initial status.
    ElementAdded,
    /// Move a board element to a new kanban status.
    ElementMoved,
    /// Attach a tag to a radar item.
    TagAdded,
    /// Detach a tag from a radar item.
    TagRemoved,
    /// Relate an initiative to a radar item.
    LinkAdded,
    /// Remove an initiative/radar-item relation.
    LinkRemoved,
}

/// Error returned when parsing an unknown event type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event type '{}': expected one of team.created, team.updated, \
             company.created, company.updated, strategy.created, strategy.updated, \
             initiative.created, initiative.updated, initiative.deleted, \
             board.element-added, board.element-moved, item.tag-added, \
             item.tag-removed, initiative.link-added, initiative.link-removed",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventType {}

impl EventType {
    /// All known event types in catalog order.
    pub const ALL: [Self; 15] = [
        Self::TeamCreated,
        Self::TeamUpdated,
        Self::CompanyCreated,
        Self::CompanyUpdated,
        Self::StrategyCreated,
        Self::StrategyUpdated,
        Self::InitiativeCreated,
        Self::InitiativeUpdated,
        Self::InitiativeDeleted,
        Self::ElementAdded,
        Self::ElementMoved,
        Self::TagAdded,
        Self::TagRemoved,
        Self::LinkAdded,
        Self::LinkRemoved,
    ];

    /// Return the canonical `<entity>.<verb>` string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TeamCreated => "team.created",
            Self::TeamUpdated => "team.updated",
            Self::CompanyCreated => "company.created",
            Self::CompanyUpdated => "company.updated",
            Self::StrategyCreated => "strategy.created",
            Self::StrategyUpdated => "strategy.updated",
            Self::InitiativeCreated => "initiative.created",
            Self::InitiativeUpdated => "initiative.updated",
            Self::InitiativeDeleted => "initiative.deleted",
            Self::ElementAdded => "board.element-added",
            Self::ElementMoved => "board.element-moved",
            Self::TagAdded => "item.tag-added",
            Self::TagRemoved => "item.tag-removed",
            Self::LinkAdded => "initiative.link-added",
            Self::LinkRemoved => "initiative.link-removed",
        }
    }

    /// The aggregate kind this event type mutates.
    ///
    /// Every event carries its `entity` explicitly in the log; append
    /// validation rejects events whose `entity` disagrees with this mapping.
    #[must_use]
    pub const fn entity(self) -> Entity {
        match self {
            Self::TeamCreated | Self::TeamUpdated => Entity::Team,
            Self::CompanyCreated | Self::CompanyUpdated => Entity::Company,
            Self::StrategyCreated | Self::StrategyUpdated => Entity::Strategy,
            Self::InitiativeCreated
            | Self::InitiativeUpdated
            | Self::InitiativeDeleted
            | Self::LinkAdded
            | Self::LinkRemoved => Entity::Initiative,
            Self::ElementAdded | Self::ElementMoved => Entity::Board,
            Self::TagAdded | Self::TagRemoved => Entity::Item,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team.created" => Ok(Self::TeamCreated),
            "team.updated" => Ok(Self::TeamUpdated),
            "company.created" => Ok(Self::CompanyCreated),
            "company.updated" => Ok(Self::CompanyUpdated),
            "strategy.created" => Ok(Self::StrategyCreated),
            "strategy.updated" => Ok(Self::StrategyUpdated),
            "initiative.created" => Ok(Self::InitiativeCreated),
            "initiative.updated" => Ok(Self::InitiativeUpdated),
            "initiative.deleted" => Ok(Self::InitiativeDeleted),
            "board.element-added" => Ok(Self::ElementAdded),
            "board.element-moved" => Ok(Self::ElementMoved),
            "item.tag-added" => Ok(Self::TagAdded),
            "item.tag-removed" => Ok(Self::TagRemoved),
            "initiative.link-added" => Ok(Self::LinkAdded),
            "initiative.link-removed" => Ok(Self::LinkRemoved),
            _ => Err(UnknownEventType { raw: s.to_string() }),
        }
    }
}

// Custom serde: serialize as the `<entity>.<verb>` string.
impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_all_types() {
        let expected = [
            (EventType::TeamCreated, "team.created"),
            (EventType::TeamUpdated, "team.updated"),
            (EventType::CompanyCreated, "company.created"),
            (EventType::CompanyUpdated, "company.updated"),
            (EventType::StrategyCreated, "strategy.created"),
            (EventType::StrategyUpdated, "strategy.updated"),
            (EventType::InitiativeCreated, "initiative.created"),
            (EventType::InitiativeUpdated, "initiative.updated"),
            (EventType::InitiativeDeleted, "initiative.deleted"),
            (EventType::ElementAdded, "board.element-added"),
            (EventType::ElementMoved, "board.element-moved"),
            (EventType::TagAdded, "item.tag-added"),
            (EventType::TagRemoved, "item.tag-removed"),
            (EventType::LinkAdded, "initiative.link-added"),
            (EventType::LinkRemoved, "initiative.link-removed"),
        ];

        for (et, s) in expected {
            assert_eq!(et.to_string(), s);
            assert_eq!(et.as_str(), s);
        }
    }

    #[test]
    fn fromstr_all_types() {
        for et in EventType::ALL {
            let parsed: EventType = et.as_str().parse().expect("should parse");
            assert_eq!(parsed, et);
        }
    }

    #[test]
    fn fromstr_rejects_unknown() {
        let err = "team.exploded".parse::<EventType>().unwrap_err();
        assert_eq!(err.raw, "team.exploded");
        assert!(err.to_string().contains("team.exploded"));
        assert!(err.to_string().contains("expected one of"));
    }

    #[test]
    fn fromstr_rejects_bare_verb() {
        // Must use full "<entity>.<verb>" format
        assert!("created".parse::<EventType>().is_err());
        assert!("".parse::<EventType>().is_err());
    }

    #[test]
    fn serde_json_roundtrip() {
        for et in EventType::ALL {
            let json = serde_json::to_string(&et).expect("serialize");
            let expected = format!("\"{}\"", et.as_str());
            assert_eq!(json, expected);

            let deser: EventType = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(deser, et);
        }
    }

    #[test]
    fn serde_rejects_unknown_type() {
        let result = serde_json::from_str::<EventType>("\"team.renamed\"");
        assert!(result.is_err());
    }

    #[test]
    fn entity_mapping_is_total() {
        for et in EventType::ALL {
            // Entity strings round-trip through the enum as well.
            let entity = et.entity();
            assert_eq!(entity.as_str().parse::<Entity>().expect("parse"), entity);
        }
    }

    #[test]
    fn all_contains_exactly_15_types() {
        assert_eq!(EventType::ALL.len(), 15);
    }

    #[test]
    fn error_display_includes_valid_options() {
        let err = UnknownEventType { raw: "nope".into() };
        let msg = err.to_string();
        for et in EventType::ALL {
            assert!(msg.contains(et.as_str()), "missing {}", et.as_str());
        }
    }
}
