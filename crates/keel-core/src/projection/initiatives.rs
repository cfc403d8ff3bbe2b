//! Initiative catalog projection.
//!
//! A denormalized join: each row carries a snapshot of the owning team's
//! name/level taken at creation time, plus the live strategy name/state.
//! The team and strategy metadata live in side caches maintained
//! independently by their own event types, so the catalog registers for
//! seven event types across three entities.
//!
//! Deletion is a tombstone (`deleted_at`), never a row removal; the
//! default read excludes tombstoned rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::{Event, EventPayload, EventType};
use crate::model::StrategyState;

use super::{Projection, ProjectionError};

/// Materialized catalog row for one initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeRow {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning team.
    pub team_id: String,
    /// Team name as it was when the initiative was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Team level as it was when the initiative was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_state: Option<StrategyState>,
    /// Soft-delete tombstone; the row is kept, the default read hides it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InitiativeRow {
    /// Whether the tombstone is set.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone)]
struct TeamMeta {
    name: String,
    level: u32,
}

#[derive(Debug, Clone)]
struct StrategyMeta {
    name: String,
    state: StrategyState,
}

/// The initiative catalog plus its team/strategy side caches.
#[derive(Debug, Default)]
pub struct InitiativeCatalog {
    rows: BTreeMap<String, InitiativeRow>,
    team_meta: BTreeMap<String, TeamMeta>,
    strategy_meta: BTreeMap<String, StrategyMeta>,
}

impl InitiativeCatalog {
    /// Rows in id order. `include_deleted` keeps tombstoned rows visible;
    /// the default catalog read passes `false`.
    #[must_use]
    pub fn all(&self, include_deleted: bool) -> Vec<InitiativeRow> {
        self.rows
            .values()
            .filter(|row| include_deleted || !row.is_deleted())
            .cloned()
            .collect()
    }

    /// Look up one row by aggregate id.
    #[must_use]
    pub fn by_id(&self, id: &str, include_deleted: bool) -> Option<&InitiativeRow> {
        self.rows
            .get(id)
            .filter(|row| include_deleted || !row.is_deleted())
    }

    /// Non-tombstoned rows owned by one team.
    #[must_use]
    pub fn for_team(&self, team_id: &str) -> Vec<InitiativeRow> {
        self.rows
            .values()
            .filter(|row| !row.is_deleted() && row.team_id == team_id)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn apply_initiative_created(&mut self, event: &Event, p: &crate::event::InitiativeCreatedPayload) {
        if self.rows.contains_key(&event.aggregate_id) {
            tracing::debug!(
                initiative = %event.aggregate_id,
                "duplicate initiative.created ignored"
            );
            return;
        }
        let team = self.team_meta.get(&p.team_id);
        let strategy = p
            .strategy_id
            .as_ref()
            .and_then(|id| self.strategy_meta.get(id));
        self.rows.insert(
            event.aggregate_id.clone(),
            InitiativeRow {
                id: event.aggregate_id.clone(),
                name: p.name.clone(),
                description: p.description.clone(),
                team_id: p.team_id.clone(),
                team_name: team.map(|t| t.name.clone()),
                team_level: team.map(|t| t.level),
                strategy_id: p.strategy_id.clone(),
                strategy_name: strategy.map(|s| s.name.clone()),
                strategy_state: strategy.map(|s| s.state),
                deleted_at: None,
                created_at: event.timestamp,
                updated_at: event.timestamp,
            },
        );
    }

    /// Patch the strategy fields of every row pointing at `strategy_id`.
    fn repaint_strategy(&mut self, strategy_id: &str, ts: DateTime<Utc>) {
        let Some(meta) = self.strategy_meta.get(strategy_id) else {
            return;
        };
        let (name, state) = (meta.name.clone(), meta.state);
        for row in self
            .rows
            .values_mut()
            .filter(|row| row.strategy_id.as_deref() == Some(strategy_id))
        {
            row.strategy_name = Some(name.clone());
            row.strategy_state = Some(state);
            row.updated_at = ts;
        }
    }
}

impl Projection for InitiativeCatalog {
    const NAME: &'static str = "initiatives";

    fn interests() -> &'static [EventType] {
        &[
            EventType::InitiativeCreated,
            EventType::InitiativeUpdated,
            EventType::InitiativeDeleted,
            EventType::StrategyCreated,
            EventType::StrategyUpdated,
            EventType::TeamCreated,
            EventType::TeamUpdated,
        ]
    }

    #[allow(clippy::too_many_lines)]
    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        match (&event.event_type, &event.payload) {
            // -- side cache: team metadata ---------------------------------
            (EventType::TeamCreated, EventPayload::TeamCreated(p)) => {
                self.team_meta
                    .entry(event.aggregate_id.clone())
                    .or_insert_with(|| TeamMeta {
                        name: p.name.clone(),
                        level: p.level,
                    });
                Ok(())
            }
            (EventType::TeamUpdated, EventPayload::TeamUpdated(p)) => {
                if let Some(meta) = self.team_meta.get_mut(&event.aggregate_id) {
                    if let Some(name) = &p.name {
                        meta.name.clone_from(name);
                    }
                    if let Some(level) = p.level {
                        meta.level = level;
                    }
                }
                Ok(())
            }

            // -- side cache + row repaint: strategy metadata ---------------
            (EventType::StrategyCreated, EventPayload::StrategyCreated(p)) => {
                self.strategy_meta
                    .entry(event.aggregate_id.clone())
                    .or_insert_with(|| StrategyMeta {
                        name: p.name.clone(),
                        state: p.state,
                    });
                self.repaint_strategy(&event.aggregate_id, event.timestamp);
                Ok(())
            }
            (EventType::StrategyUpdated, EventPayload::StrategyUpdated(p)) => {
                if let Some(meta) = self.strategy_meta.get_mut(&event.aggregate_id) {
                    if let Some(name) = &p.name {
                        meta.name.clone_from(name);
                    }
                    if let Some(state) = p.state {
                        meta.state = state;
                    }
                } else {
                    tracing::debug!(
                        strategy = %event.aggregate_id,
                        "strategy.updated for unknown strategy ignored"
                    );
                    return Ok(());
                }
                self.repaint_strategy(&event.aggregate_id, event.timestamp);
                Ok(())
            }

            // -- catalog rows ----------------------------------------------
            (EventType::InitiativeCreated, EventPayload::InitiativeCreated(p)) => {
                self.apply_initiative_created(event, p);
                Ok(())
            }
            (EventType::InitiativeUpdated, EventPayload::InitiativeUpdated(p)) => {
                // Read the strategy meta before borrowing a row mutably.
                let strategy = p
                    .strategy_id
                    .as_ref()
                    .and_then(|id| self.strategy_meta.get(id))
                    .map(|meta| (meta.name.clone(), meta.state));
                let Some(row) = self.rows.get_mut(&event.aggregate_id) else {
                    tracing::debug!(
                        initiative = %event.aggregate_id,
                        "initiative.updated for unknown initiative ignored"
                    );
                    return Ok(());
                };
                if let Some(name) = &p.name {
                    row.name.clone_from(name);
                }
                if let Some(description) = &p.description {
                    row.description = Some(description.clone());
                }
                if let Some(strategy_id) = &p.strategy_id {
                    row.strategy_id = Some(strategy_id.clone());
                    let (name, state) = strategy
                        .map_or((None, None), |(n, s)| (Some(n), Some(s)));
                    row.strategy_name = name;
                    row.strategy_state = state;
                }
                row.updated_at = event.timestamp;
                Ok(())
            }
            (EventType::InitiativeDeleted, EventPayload::InitiativeDeleted(_)) => {
                let Some(row) = self.rows.get_mut(&event.aggregate_id) else {
                    tracing::debug!(
                        initiative = %event.aggregate_id,
                        "initiative.deleted for unknown initiative ignored"
                    );
                    return Ok(());
                };
                // First delete wins; repeated deletes keep the original stamp.
                if row.deleted_at.is_none() {
                    row.deleted_at = Some(event.timestamp);
                    row.updated_at = event.timestamp;
                }
                Ok(())
            }

            (
                EventType::InitiativeCreated
                | EventType::InitiativeUpdated
                | EventType::InitiativeDeleted
                | EventType::StrategyCreated
                | EventType::StrategyUpdated
                | EventType::TeamCreated
                | EventType::TeamUpdated,
                _,
            ) => Err(ProjectionError::PayloadMismatch {
                projection: Self::NAME,
                event_type: event.event_type,
            }),
            _ => Err(ProjectionError::UnexpectedEventType {
                projection: Self::NAME,
                event_type: event.event_type,
            }),
        }
    }
}
