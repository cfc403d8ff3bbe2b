//! Team directory projection.
//!
//! Folds `team.created` / `team.updated` into one [`Team`] row per
//! aggregate. Updates patch only the fields present in the payload; an
//! omitted field never clears the projected value.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::{Event, EventPayload, EventType};

use super::{Projection, ProjectionError};

/// Materialized view of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Depth in the org hierarchy; 0 is the top level.
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All teams, keyed by aggregate id.
#[derive(Debug, Default)]
pub struct TeamDirectory {
    teams: BTreeMap<String, Team>,
}

impl TeamDirectory {
    /// All teams in id order.
    #[must_use]
    pub fn all(&self) -> Vec<Team> {
        self.teams.values().cloned().collect()
    }

    /// Look up one team by aggregate id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Team> {
        self.teams.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl Projection for TeamDirectory {
    const NAME: &'static str = "teams";

    fn interests() -> &'static [EventType] {
        &[EventType::TeamCreated, EventType::TeamUpdated]
    }

    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        match (&event.event_type, &event.payload) {
            (EventType::TeamCreated, EventPayload::TeamCreated(p)) => {
                if self.teams.contains_key(&event.aggregate_id) {
                    // First create wins; replays of merged logs can carry dupes.
                    tracing::debug!(team = %event.aggregate_id, "duplicate team.created ignored");
                    return Ok(());
                }
                self.teams.insert(
                    event.aggregate_id.clone(),
                    Team {
                        id: event.aggregate_id.clone(),
                        name: p.name.clone(),
                        level: p.level,
                        mission: p.mission.clone(),
                        created_at: event.timestamp,
                        updated_at: event.timestamp,
                    },
                );
                Ok(())
            }
            (EventType::TeamUpdated, EventPayload::TeamUpdated(p)) => {
                let Some(team) = self.teams.get_mut(&event.aggregate_id) else {
                    tracing::debug!(
                        team = %event.aggregate_id,
                        "team.updated for unknown team ignored"
                    );
                    return Ok(());
                };
                if let Some(name) = &p.name {
                    team.name.clone_from(name);
                }
                if let Some(level) = p.level {
                    team.level = level;
                }
                if let Some(mission) = &p.mission {
                    team.mission = Some(mission.clone());
                }
                team.updated_at = event.timestamp;
                Ok(())
            }
            (EventType::TeamCreated | EventType::TeamUpdated, _) => {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::payload::{TagPayload, TeamCreatedPayload, TeamUpdatedPayload};
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_709_280_000 + secs, 0).single().expect("ts")
    }

    fn created(id: &str, name: &str, level: u32, secs: i64) -> Event {
        Event::new(
            EventType::TeamCreated,
            id,
            ts(secs),
            EventPayload::TeamCreated(TeamCreatedPayload {
                name: name.into(),
                level,
                mission: None,
                extra: BTreeMap::new(),
            }),
        )
    }

    fn updated(id: &str, payload: TeamUpdatedPayload, secs: i64) -> Event {
        Event::new(
            EventType::TeamUpdated,
            id,
            ts(secs),
            EventPayload::TeamUpdated(payload),
        )
    }

    #[test]
    fn created_inserts_row() {
        let mut dir = TeamDirectory::default();
        dir.apply(&created("team-1", "CEO", 0, 0)).expect("apply");

        let team = dir.by_id("team-1").expect("present");
        assert_eq!(team.name, "CEO");
        assert_eq!(team.level, 0);
        assert_eq!(team.created_at, ts(0));
        assert_eq!(team.updated_at, ts(0));
    }

    #[test]
    fn updated_patches_present_fields_only() {
        let mut dir = TeamDirectory::default();
        dir.apply(&created("team-1", "CEO", 0, 0)).expect("apply");
        dir.apply(&updated(
            "team-1",
            TeamUpdatedPayload {
                name: Some("Chief Exec".into()),
                level: None,
                mission: None,
                extra: BTreeMap::new(),
            },
            60,
        ))
        .expect("apply");

        let team = dir.by_id("team-1").expect("present");
        // Name patched, level preserved.
        assert_eq!(team.name, "Chief Exec");
        assert_eq!(team.level, 0);
        assert_eq!(team.created_at, ts(0));
        assert_eq!(team.updated_at, ts(60));
    }

    #[test]
    fn omitted_field_never_clears() {
        let mut dir = TeamDirectory::default();
        let mut create = created("team-1", "CEO", 0, 0);
        if let EventPayload::TeamCreated(p) = &mut create.payload {
            p.mission = Some("Set direction".into());
        }
        dir.apply(&create).expect("apply");
        dir.apply(&updated(
            "team-1",
            TeamUpdatedPayload {
                name: Some("Chief Exec".into()),
                level: None,
                mission: None,
                extra: BTreeMap::new(),
            },
            60,
        ))
        .expect("apply");

        assert_eq!(
            dir.by_id("team-1").expect("present").mission.as_deref(),
            Some("Set direction")
        );
    }

    #[test]
    fn duplicate_create_keeps_first() {
        let mut dir = TeamDirectory::default();
        dir.apply(&created("team-1", "CEO", 0, 0)).expect("apply");
        dir.apply(&created("team-1", "Impostor", 3, 60)).expect("apply");

        let team = dir.by_id("team-1").expect("present");
        assert_eq!(team.name, "CEO");
        assert_eq!(team.level, 0);
    }

    #[test]
    fn update_for_unknown_team_is_ignored() {
        let mut dir = TeamDirectory::default();
        dir.apply(&updated(
            "team-ghost",
            TeamUpdatedPayload::default(),
            0,
        ))
        .expect("apply");
        assert!(dir.is_empty());
    }

    #[test]
    fn mismatched_payload_is_an_error() {
        let mut dir = TeamDirectory::default();
        let mut event = created("team-1", "CEO", 0, 0);
        event.payload = EventPayload::TagAdded(TagPayload {
            tag: "x".into(),
            extra: BTreeMap::new(),
        });
        let err = dir.apply(&event).unwrap_err();
        assert!(matches!(err, ProjectionError::PayloadMismatch { .. }));
    }

    #[test]
    fn all_returns_id_order() {
        let mut dir = TeamDirectory::default();
        dir.apply(&created("team-b", "B", 1, 0)).expect("apply");
        dir.apply(&created("team-a", "A", 1, 1)).expect("apply");
        let ids: Vec<String> = dir.all().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["team-a", "team-b"]);
    }
}
