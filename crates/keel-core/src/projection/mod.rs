//! Projection framework: the fold trait and the cache lifecycle.
//!
//! Each domain slice implements [`Projection`] — a fold from events to a
//! materialized read model — and is hosted in a [`SliceCache`], which owns
//! the lifecycle required of every projection:
//!
//! - **cold-start bootstrap**: the first read replays the full log,
//! - **live incremental update**: dispatched events mutate the model in
//!   place,
//! - **explicit empty**: an operator action that answers reads as empty
//!   until the next rebuild,
//! - **full rebuild**: forced replay, discarding prior contents.
//!
//! The same [`Projection::apply`] drives both the live path and replay, so
//! a projection built by replaying the log from empty is observationally
//! equivalent to one maintained incrementally. Replay filters the log to
//! the slice's interests and stable-sorts by timestamp, so ties keep log
//! append order.

pub mod companies;
pub mod feed;
pub mod initiatives;
pub mod kanban;
pub mod links;
pub mod tags;
pub mod teams;

pub use companies::{Company, CompanyDirectory};
pub use feed::EventFeed;
pub use initiatives::{InitiativeCatalog, InitiativeRow};
pub use kanban::{KanbanEntry, KanbanStatusMap};
pub use links::LinkIndex;
pub use tags::TagIndex;
pub use teams::{Team, TeamDirectory};

use crate::error::ErrorCode;
use crate::event::{Event, EventType};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error raised by a fold function and absorbed by its caller.
///
/// Projection errors never unwind an append and never fail a rebuild: the
/// dispatcher and the replay loop log them and move on. A projection that
/// accumulated errors on the live path is recovered by rebuilding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// The event's payload variant does not match its declared type.
    ///
    /// Append validation rejects such events, so this is only reachable
    /// for handlers registered against a foreign store or in tests that
    /// bypass validation.
    #[error("{projection}: event {event_type} carried a mismatched payload")]
    PayloadMismatch {
        projection: &'static str,
        event_type: EventType,
    },

    /// The slice received an event type it never registered for.
    #[error("{projection}: not interested in {event_type}")]
    UnexpectedEventType {
        projection: &'static str,
        event_type: EventType,
    },
}

impl ProjectionError {
    /// Stable machine-readable code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PayloadMismatch { .. } => ErrorCode::PayloadMismatch,
            Self::UnexpectedEventType { .. } => ErrorCode::StaleProjection,
        }
    }
}

// ---------------------------------------------------------------------------
// Projection trait
// ---------------------------------------------------------------------------

/// A fold from events to a materialized read model.
///
/// `Default` is the empty model. Implementations must be pure with respect
/// to the event sequence: the same events in the same order always produce
/// the same model, regardless of whether they arrive live or by replay.
pub trait Projection: Default + Send + Sync + 'static {
    /// Stable slice name, used as the handler identity for registration
    /// dedup and in log output.
    const NAME: &'static str;

    /// The event types this slice folds. All other types are never routed
    /// here, and replay filters the log down to these.
    fn interests() -> &'static [EventType];

    /// Fold one event into the model.
    ///
    /// Events that do not apply (unknown aggregate, duplicate create) are
    /// skipped internally with a debug log and are **not** errors; the
    /// accumulator passes through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] only for events that should never have
    /// been routed here (mismatched payload, foreign event type).
    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError>;
}

// ---------------------------------------------------------------------------
// Cache lifecycle
// ---------------------------------------------------------------------------

/// Observable lifecycle state of a projection cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never built; the next read triggers a cold-start bootstrap.
    Uninitialized,
    /// Holds a materialized model, kept current by live dispatch.
    Populated,
    /// Explicitly emptied by an operator; reads answer empty until rebuilt.
    EmptiedExplicit,
}

impl CacheState {
    /// Lowercase label for reports and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Populated => "populated",
            Self::EmptiedExplicit => "emptied",
        }
    }
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host for one slice's model, implementing the lifecycle state machine.
///
/// State transitions:
///
/// ```text
/// Uninitialized --read--> Populated          (bootstrap)
/// Populated --live event--> Populated        (incremental)
/// any --empty()--> EmptiedExplicit
/// any --rebuild()--> Populated
/// any --reset()--> Uninitialized             (test-only, via the store)
/// ```
#[derive(Debug)]
pub struct SliceCache<P: Projection> {
    model: Option<P>,
    emptied: bool,
}

impl<P: Projection> Default for SliceCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Projection> SliceCache<P> {
    /// A cache in the `Uninitialized` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            model: None,
            emptied: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> CacheState {
        if self.emptied {
            CacheState::EmptiedExplicit
        } else if self.model.is_some() {
            CacheState::Populated
        } else {
            CacheState::Uninitialized
        }
    }

    /// Read through the cache, bootstrapping from `log` on first use.
    ///
    /// While explicitly emptied, the closure observes an empty model and no
    /// bootstrap happens. The caller's write lock makes concurrent
    /// cold-start calls single-flight.
    pub fn with<R>(&mut self, log: &[Event], f: impl FnOnce(&P) -> R) -> R {
        if self.emptied {
            return f(&P::default());
        }
        let model = self.model.get_or_insert_with(|| {
            tracing::debug!(projection = P::NAME, events = log.len(), "cold-start bootstrap");
            Self::replay(log)
        });
        f(model)
    }

    /// Apply one live event to the model, initializing an empty model first
    /// if no read has triggered bootstrap yet.
    ///
    /// # Errors
    ///
    /// Propagates the fold's [`ProjectionError`]; the dispatcher absorbs
    /// and logs it.
    pub fn apply_live(&mut self, event: &Event) -> Result<(), ProjectionError> {
        self.model.get_or_insert_with(P::default).apply(event)
    }

    /// Operator action: answer reads as empty until the next rebuild.
    pub fn empty(&mut self) {
        self.model = None;
        self.emptied = true;
    }

    /// Forced full replay from `log`, leaving the cache `Populated`.
    pub fn rebuild(&mut self, log: &[Event]) {
        let model = Self::replay(log);
        self.model = Some(model);
        self.emptied = false;
        tracing::info!(projection = P::NAME, events = log.len(), "projection rebuilt");
    }

    /// Drop everything and return to `Uninitialized`.
    pub fn reset(&mut self) {
        self.model = None;
        self.emptied = false;
    }

    /// Replay `log` through the fold: filter to interests, stable-sort by
    /// timestamp (ties keep log order), fold left to right. Events the fold
    /// rejects are logged and skipped, never fatal.
    fn replay(log: &[Event]) -> P {
        let interests = P::interests();
        let mut selected: Vec<&Event> = log
            .iter()
            .filter(|e| interests.contains(&e.event_type))
            .collect();
        selected.sort_by_key(|e| e.timestamp);

        let mut model = P::default();
        for event in selected {
            if let Err(error) = model.apply(event) {
                tracing::warn!(
                    projection = P::NAME,
                    event_type = %event.event_type,
                    aggregate_id = %event.aggregate_id,
                    %error,
                    "skipping event during replay"
                );
            }
        }
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::payload::{EventPayload, TeamCreatedPayload, TeamUpdatedPayload};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn ts(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_709_280_000 + secs, 0).single().expect("ts")
    }

    fn team_created(id: &str, name: &str, level: u32, secs: i64) -> Event {
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

    fn team_renamed(id: &str, name: &str, secs: i64) -> Event {
        Event::new(
            EventType::TeamUpdated,
            id,
            ts(secs),
            EventPayload::TeamUpdated(TeamUpdatedPayload {
                name: Some(name.into()),
                level: None,
                mission: None,
                extra: BTreeMap::new(),
            }),
        )
    }

    #[test]
    fn starts_uninitialized() {
        let cache = SliceCache::<TeamDirectory>::new();
        assert_eq!(cache.status(), CacheState::Uninitialized);
    }

    #[test]
    fn read_bootstraps_from_log() {
        let log = vec![team_created("team-1", "CEO", 0, 0)];
        let mut cache = SliceCache::<TeamDirectory>::new();

        let names: Vec<String> = cache.with(&log, |d| {
            d.all().into_iter().map(|t| t.name).collect()
        });
        assert_eq!(names, vec!["CEO"]);
        assert_eq!(cache.status(), CacheState::Populated);
    }

    #[test]
    fn live_event_before_any_read_initializes_empty_model() {
        let mut cache = SliceCache::<TeamDirectory>::new();
        cache
            .apply_live(&team_created("team-1", "CEO", 0, 0))
            .expect("apply");
        assert_eq!(cache.status(), CacheState::Populated);

        // A later read must not re-bootstrap and clobber the live state:
        // the log passed here is deliberately empty.
        let count = cache.with(&[], |d| d.all().len());
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_answers_reads_as_empty_until_rebuild() {
        let log = vec![team_created("team-1", "CEO", 0, 0)];
        let mut cache = SliceCache::<TeamDirectory>::new();
        cache.rebuild(&log);

        cache.empty();
        assert_eq!(cache.status(), CacheState::EmptiedExplicit);
        assert_eq!(cache.with(&log, |d| d.all().len()), 0);
        // Reading while emptied does not flip the state back.
        assert_eq!(cache.status(), CacheState::EmptiedExplicit);

        cache.rebuild(&log);
        assert_eq!(cache.status(), CacheState::Populated);
        assert_eq!(cache.with(&log, |d| d.all().len()), 1);
    }

    #[test]
    fn rebuild_discards_prior_contents() {
        let mut cache = SliceCache::<TeamDirectory>::new();
        cache
            .apply_live(&team_created("team-9", "Ghost", 0, 0))
            .expect("apply");

        // Rebuild against a log that never contained team-9.
        let log = vec![team_created("team-1", "CEO", 0, 0)];
        cache.rebuild(&log);
        assert!(cache.with(&log, |d| d.by_id("team-9").is_none()));
        assert!(cache.with(&log, |d| d.by_id("team-1").is_some()));
    }

    #[test]
    fn replay_sorts_by_timestamp_with_stable_ties() {
        // The rename is earlier in the log but later by timestamp; replay
        // must apply it last.
        let log = vec![
            team_renamed("team-1", "Chief Exec", 10),
            team_created("team-1", "CEO", 0, 0),
        ];
        let mut cache = SliceCache::<TeamDirectory>::new();
        cache.rebuild(&log);
        let name = cache.with(&log, |d| {
            d.by_id("team-1").map(|t| t.name.clone())
        });
        assert_eq!(name.as_deref(), Some("Chief Exec"));
    }

    #[test]
    fn reset_returns_to_uninitialized() {
        let log = vec![team_created("team-1", "CEO", 0, 0)];
        let mut cache = SliceCache::<TeamDirectory>::new();
        cache.rebuild(&log);
        cache.reset();
        assert_eq!(cache.status(), CacheState::Uninitialized);
    }
}
