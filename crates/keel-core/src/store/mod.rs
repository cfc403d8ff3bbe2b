//! The event store: append path, dispatch wiring, and lifecycle.
//!
//! [`EventStore`] is an explicit object — no ambient globals. Tests and
//! embedders construct isolated stores; every component that needs the
//! store receives a reference. All state (log, registry, slice caches) is
//! private and reachable only through the documented operations.
//!
//! # Concurrency
//!
//! The store is `Send + Sync`. Interior mutability uses `RwLock` with a
//! fixed acquisition order — log, then registry, then slice cache — so the
//! append path (log write held across the dispatch loop) is one explicit
//! critical section and cold-start bootstrap is single-flighted by the
//! slice's write lock. Lock poisoning is recovered, never propagated:
//! fold functions do not panic, and a poisoned guard would otherwise take
//! the whole read path down with it.

pub mod log;
pub mod query;
pub mod registry;

pub use log::EventLog;
pub use query::{Slice, StoreStats, UnknownSlice};
pub use registry::{DispatchOutcome, EventHandler, HandlerRegistry};

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::StoreConfig;
use crate::event::{validate, Entity, Event, EventType, InvalidEventError};
use crate::projection::{
    CompanyDirectory, EventFeed, InitiativeCatalog, KanbanStatusMap, LinkIndex, Projection,
    ProjectionError, SliceCache, TagIndex, TeamDirectory,
};

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// AppendStats
// ---------------------------------------------------------------------------

/// Counters returned after a successful append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendStats {
    /// Events appended to the log.
    pub appended: usize,
    /// Handler invocations that succeeded across the batch.
    pub handled: usize,
    /// Handler invocations that failed (logged and absorbed; the affected
    /// projections recover on their next rebuild).
    pub handler_errors: usize,
}

// ---------------------------------------------------------------------------
// EventStore
// ---------------------------------------------------------------------------

/// The append-only event log plus the registry and the seven projection
/// caches it feeds.
#[derive(Debug)]
pub struct EventStore {
    config: StoreConfig,
    log: RwLock<EventLog>,
    registry: RwLock<HandlerRegistry>,
    teams: Arc<RwLock<SliceCache<TeamDirectory>>>,
    companies: Arc<RwLock<SliceCache<CompanyDirectory>>>,
    feed: Arc<RwLock<SliceCache<EventFeed>>>,
    initiatives: Arc<RwLock<SliceCache<InitiativeCatalog>>>,
    kanban: Arc<RwLock<SliceCache<KanbanStatusMap>>>,
    tags: Arc<RwLock<SliceCache<TagIndex>>>,
    links: Arc<RwLock<SliceCache<LinkIndex>>>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    /// A fresh store with default configuration and every built-in slice
    /// registered for live dispatch.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// A fresh store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let teams = Arc::new(RwLock::new(SliceCache::new()));
        let companies = Arc::new(RwLock::new(SliceCache::new()));
        let feed = Arc::new(RwLock::new(SliceCache::new()));
        let initiatives = Arc::new(RwLock::new(SliceCache::new()));
        let kanban = Arc::new(RwLock::new(SliceCache::new()));
        let tags = Arc::new(RwLock::new(SliceCache::new()));
        let links = Arc::new(RwLock::new(SliceCache::new()));

        let mut registry = HandlerRegistry::new();
        registry.register(SliceHandler::hook(&teams));
        registry.register(SliceHandler::hook(&companies));
        registry.register(SliceHandler::hook(&feed));
        registry.register(SliceHandler::hook(&initiatives));
        registry.register(SliceHandler::hook(&kanban));
        registry.register(SliceHandler::hook(&tags));
        registry.register(SliceHandler::hook(&links));

        Self {
            config,
            log: RwLock::new(EventLog::new()),
            registry: RwLock::new(registry),
            teams,
            companies,
            feed,
            initiatives,
            kanban,
            tags,
            links,
        }
    }

    /// The store's configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------------

    /// Append a batch to the log tail in array order, then synchronously
    /// dispatch each appended event to every registered handler, in array
    /// order.
    ///
    /// When `append` returns, every handler registered for any of the
    /// batch's event types has been invoked exactly once per
    /// (event, handler) pair. There is no partial-failure rollback: once
    /// validation passes the whole batch lands, and handler failures are
    /// absorbed into [`AppendStats::handler_errors`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEventError`] — before any mutation — if the batch
    /// is empty or any event is malformed.
    pub fn append(&self, events: Vec<Event>) -> Result<AppendStats, InvalidEventError> {
        validate::validate_batch(&events)?;
        let appended = events.len();

        // The log write lock is held across the dispatch loop: append plus
        // live update is one critical section, and no query can observe a
        // log that is ahead of the projections mid-append.
        let mut log = write_lock(&self.log);
        let start = log.append(events);

        let registry = read_lock(&self.registry);
        let mut handled = 0;
        let mut handler_errors = 0;
        for event in &log.events()[start..] {
            let outcome = registry.dispatch(event);
            handled += outcome.handled;
            handler_errors += outcome.errors;
        }

        Ok(AppendStats {
            appended,
            handled,
            handler_errors,
        })
    }

    // -----------------------------------------------------------------------
    // Log reads
    // -----------------------------------------------------------------------

    /// Read-only snapshot of the full log, in log order.
    #[must_use]
    pub fn all_events(&self) -> Vec<Event> {
        read_lock(&self.log).snapshot()
    }

    /// Ordered subsequence of events for one aggregate, optionally narrowed
    /// by entity, preserving log order.
    #[must_use]
    pub fn events_for(&self, aggregate_id: &str, entity: Option<Entity>) -> Vec<Event> {
        read_lock(&self.log).for_aggregate(aggregate_id, entity)
    }

    /// Number of events in the log.
    #[must_use]
    pub fn event_count(&self) -> usize {
        read_lock(&self.log).len()
    }

    // -----------------------------------------------------------------------
    // Handler registration
    // -----------------------------------------------------------------------

    /// Register an external handler for live dispatch.
    ///
    /// Returns `false` when a handler with the same id is already
    /// registered (the duplicate is ignored, never double-invoked).
    pub fn register_handler(&self, handler: Arc<dyn EventHandler>) -> bool {
        write_lock(&self.registry).register(handler)
    }

    /// Register a bare callback for one event type. Same dedup rules as
    /// [`register_handler`](Self::register_handler).
    pub fn register(
        &self,
        event_type: EventType,
        id: &'static str,
        f: impl Fn(&Event) -> Result<(), ProjectionError> + Send + Sync + 'static,
    ) -> bool {
        write_lock(&self.registry).register_fn(event_type, id, f)
    }

    // -----------------------------------------------------------------------
    // Test isolation
    // -----------------------------------------------------------------------

    /// Drop all events and return every cache to `Uninitialized`.
    ///
    /// Handler registrations survive; only state is cleared. Intended for
    /// test isolation.
    pub fn reset(&self) {
        write_lock(&self.log).clear();
        write_lock(&self.teams).reset();
        write_lock(&self.companies).reset();
        write_lock(&self.feed).reset();
        write_lock(&self.initiatives).reset();
        write_lock(&self.kanban).reset();
        write_lock(&self.tags).reset();
        write_lock(&self.links).reset();
    }
}

// ---------------------------------------------------------------------------
// SliceHandler — wires a SliceCache into the registry
// ---------------------------------------------------------------------------

/// Live-update adapter: routes dispatched events into a slice cache's
/// `apply_live`.
struct SliceHandler<P: Projection> {
    cache: Arc<RwLock<SliceCache<P>>>,
}

impl<P: Projection> SliceHandler<P> {
    fn hook(cache: &Arc<RwLock<SliceCache<P>>>) -> Arc<dyn EventHandler> {
        Arc::new(Self {
            cache: Arc::clone(cache),
        })
    }
}

impl<P: Projection> EventHandler for SliceHandler<P> {
    fn id(&self) -> &'static str {
        P::NAME
    }

    fn interests(&self) -> &[EventType] {
        P::interests()
    }

    fn on_event(&self, event: &Event) -> Result<(), ProjectionError> {
        write_lock(&self.cache).apply_live(event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Property tests: replay determinism
// ---------------------------------------------------------------------------

#[cfg(test)]
mod props {
    use super::*;
    use crate::event::payload::{
        CompanyCreatedPayload, CompanyUpdatedPayload, ElementAddedPayload, ElementMovedPayload,
        EventPayload, InitiativeCreatedPayload, InitiativeDeletedPayload, LinkPayload,
        StrategyCreatedPayload, StrategyUpdatedPayload, TagPayload, TeamCreatedPayload,
        TeamUpdatedPayload,
    };
    use crate::model::{KanbanStatus, StrategyState};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Map a (kind, id, aux) triple onto a concrete event. Small id pools
    /// force the interesting collisions: duplicate creates, updates and
    /// moves against unknown aggregates, repeated tag adds and removes.
    fn make_event(kind: u8, id: u8, aux: u8, seq: i64) -> Event {
        let ts = Utc
            .timestamp_opt(1_709_280_000 + seq, 0)
            .single()
            .expect("valid ts");
        let none = BTreeMap::new;
        match kind {
            0 => Event::new(
                EventType::TeamCreated,
                format!("team-{id}"),
                ts,
                EventPayload::TeamCreated(TeamCreatedPayload {
                    name: format!("Team {id}"),
                    level: u32::from(aux),
                    mission: None,
                    extra: none(),
                }),
            ),
            1 => Event::new(
                EventType::TeamUpdated,
                format!("team-{id}"),
                ts,
                EventPayload::TeamUpdated(TeamUpdatedPayload {
                    name: Some(format!("Team {id} v{aux}")),
                    level: None,
                    mission: None,
                    extra: none(),
                }),
            ),
            2 => Event::new(
                EventType::CompanyCreated,
                format!("co-{id}"),
                ts,
                EventPayload::CompanyCreated(CompanyCreatedPayload {
                    name: format!("Company {id}"),
                    segment: None,
                    extra: none(),
                }),
            ),
            3 => Event::new(
                EventType::CompanyUpdated,
                format!("co-{id}"),
                ts,
                EventPayload::CompanyUpdated(CompanyUpdatedPayload {
                    name: None,
                    segment: Some(format!("segment-{aux}")),
                    extra: none(),
                }),
            ),
            4 => Event::new(
                EventType::StrategyCreated,
                format!("strat-{id}"),
                ts,
                EventPayload::StrategyCreated(StrategyCreatedPayload {
                    name: format!("Strategy {id}"),
                    state: StrategyState::Draft,
                    extra: none(),
                }),
            ),
            5 => Event::new(
                EventType::StrategyUpdated,
                format!("strat-{id}"),
                ts,
                EventPayload::StrategyUpdated(StrategyUpdatedPayload {
                    name: None,
                    state: Some(if aux % 2 == 0 {
                        StrategyState::Active
                    } else {
                        StrategyState::Retired
                    }),
                    extra: none(),
                }),
            ),
            6 => Event::new(
                EventType::InitiativeCreated,
                format!("init-{id}"),
                ts,
                EventPayload::InitiativeCreated(InitiativeCreatedPayload {
                    name: format!("Initiative {id}"),
                    team_id: format!("team-{aux}"),
                    strategy_id: Some(format!("strat-{aux}")),
                    description: None,
                    extra: none(),
                }),
            ),
            7 => Event::new(
                EventType::InitiativeDeleted,
                format!("init-{id}"),
                ts,
                EventPayload::InitiativeDeleted(InitiativeDeletedPayload::default()),
            ),
            8 => Event::new(
                EventType::ElementAdded,
                format!("board-{aux}"),
                ts,
                EventPayload::ElementAdded(ElementAddedPayload {
                    element_id: format!("item-{id}"),
                    title: None,
                    status: KanbanStatus::New,
                    extra: none(),
                }),
            ),
            9 => Event::new(
                EventType::ElementMoved,
                format!("board-{aux}"),
                ts,
                EventPayload::ElementMoved(ElementMovedPayload {
                    element_id: format!("item-{id}"),
                    to_status: KanbanStatus::Done,
                    extra: none(),
                }),
            ),
            10 => Event::new(
                EventType::TagAdded,
                format!("item-{id}"),
                ts,
                EventPayload::TagAdded(TagPayload {
                    tag: format!("tag-{aux}"),
                    extra: none(),
                }),
            ),
            11 => Event::new(
                EventType::TagRemoved,
                format!("item-{id}"),
                ts,
                EventPayload::TagRemoved(TagPayload {
                    tag: format!("tag-{aux}"),
                    extra: none(),
                }),
            ),
            12 => Event::new(
                EventType::LinkAdded,
                format!("init-{id}"),
                ts,
                EventPayload::LinkAdded(LinkPayload {
                    target_id: format!("item-{aux}"),
                    extra: none(),
                }),
            ),
            _ => Event::new(
                EventType::LinkRemoved,
                format!("init-{id}"),
                ts,
                EventPayload::LinkRemoved(LinkPayload {
                    target_id: format!("item-{aux}"),
                    extra: none(),
                }),
            ),
        }
    }

    proptest! {
        /// For any event sequence, projections maintained live equal
        /// projections produced by full replay.
        #[test]
        fn live_apply_equals_rebuild(
            specs in proptest::collection::vec((0u8..14, 0u8..4, 0u8..4), 0..48)
        ) {
            let store = EventStore::new();
            for (seq, (kind, id, aux)) in specs.iter().enumerate() {
                let event = make_event(*kind, *id, *aux, i64::try_from(seq).expect("small"));
                store.append(vec![event]).expect("append");
            }

            let live = (
                store.teams(),
                store.companies(),
                store.initiatives(true),
                store.feed(Some(usize::MAX)),
                store.tag_index(),
                store.link_index(),
                (0u8..4).map(|b| store.board(&format!("board-{b}"))).collect::<Vec<_>>(),
            );

            store.rebuild_all();

            let rebuilt = (
                store.teams(),
                store.companies(),
                store.initiatives(true),
                store.feed(Some(usize::MAX)),
                store.tag_index(),
                store.link_index(),
                (0u8..4).map(|b| store.board(&format!("board-{b}"))).collect::<Vec<_>>(),
            );

            prop_assert_eq!(live, rebuilt);
        }

        /// Events for different aggregates can interleave freely without
        /// changing either aggregate's projected state.
        #[test]
        fn cross_aggregate_order_independence(swap in any::<bool>()) {
            let a = |seq| make_event(0, 0, 1, seq); // team-0 created
            let b = |seq| make_event(0, 1, 2, seq); // team-1 created

            let store = EventStore::new();
            let events = if swap {
                vec![b(0), a(1)]
            } else {
                vec![a(0), b(1)]
            };
            store.append(events).expect("append");

            let teams = store.teams();
            prop_assert_eq!(teams.len(), 2);
            let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
            prop_assert_eq!(names, vec!["Team 0", "Team 1"]);
        }
    }
}
