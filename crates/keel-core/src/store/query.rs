//! Read and lifecycle surface over the projection caches.
//!
//! Every read goes through the hosting [`SliceCache`]: an uninitialized
//! cache bootstraps from the log on first use, an explicitly emptied cache
//! answers empty until rebuilt. Lock order is always log before slice,
//! matching the append path.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::ErrorCode;
use crate::event::Event;
use crate::projection::{
    CacheState, Company, CompanyDirectory, InitiativeRow, KanbanEntry, KanbanStatusMap, Team,
    TeamDirectory,
};

use super::{read_lock, write_lock, EventStore};

// ---------------------------------------------------------------------------
// Slice
// ---------------------------------------------------------------------------

/// The seven projection slices, addressable for lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Teams,
    Companies,
    Feed,
    Initiatives,
    Kanban,
    Tags,
    Links,
}

impl Slice {
    /// All slices in catalog order.
    pub const ALL: [Self; 7] = [
        Self::Teams,
        Self::Companies,
        Self::Feed,
        Self::Initiatives,
        Self::Kanban,
        Self::Tags,
        Self::Links,
    ];

    /// Lowercase name, matching the slice's handler id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Teams => "teams",
            Self::Companies => "companies",
            Self::Feed => "feed",
            Self::Initiatives => "initiatives",
            Self::Kanban => "kanban",
            Self::Tags => "tags",
            Self::Links => "links",
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown slice name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown projection slice '{raw}': expected one of teams, companies, feed, initiatives, kanban, tags, links")]
pub struct UnknownSlice {
    /// The unrecognised input string.
    pub raw: String,
}

impl UnknownSlice {
    /// Stable machine-readable code for this rejection.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::UnknownSlice
    }
}

impl FromStr for Slice {
    type Err = UnknownSlice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teams" => Ok(Self::Teams),
            "companies" => Ok(Self::Companies),
            "feed" => Ok(Self::Feed),
            "initiatives" => Ok(Self::Initiatives),
            "kanban" => Ok(Self::Kanban),
            "tags" => Ok(Self::Tags),
            "links" => Ok(Self::Links),
            _ => Err(UnknownSlice { raw: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreStats
// ---------------------------------------------------------------------------

/// Operator report: log size, per-entity event counts, cache states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total events in the log.
    pub events: usize,
    /// Event counts keyed by entity string.
    pub by_entity: BTreeMap<String, usize>,
    /// Cache lifecycle state keyed by slice name.
    pub caches: BTreeMap<&'static str, CacheState>,
}

// ---------------------------------------------------------------------------
// Per-slice reads
// ---------------------------------------------------------------------------

impl EventStore {
    /// All teams, id order.
    #[must_use]
    pub fn teams(&self) -> Vec<Team> {
        let log = read_lock(&self.log);
        write_lock(&self.teams).with(log.events(), TeamDirectory::all)
    }

    /// One team by aggregate id.
    #[must_use]
    pub fn team(&self, id: &str) -> Option<Team> {
        let log = read_lock(&self.log);
        write_lock(&self.teams).with(log.events(), |d| d.by_id(id).cloned())
    }

    /// All companies, id order.
    #[must_use]
    pub fn companies(&self) -> Vec<Company> {
        let log = read_lock(&self.log);
        write_lock(&self.companies).with(log.events(), CompanyDirectory::all)
    }

    /// One company by aggregate id.
    #[must_use]
    pub fn company(&self, id: &str) -> Option<Company> {
        let log = read_lock(&self.log);
        write_lock(&self.companies).with(log.events(), |d| d.by_id(id).cloned())
    }

    /// The activity feed, newest first. `None` falls back to the
    /// configured default limit.
    #[must_use]
    pub fn feed(&self, limit: Option<usize>) -> Vec<Event> {
        let limit = limit.or(self.config.feed.default_limit);
        let log = read_lock(&self.log);
        write_lock(&self.feed).with(log.events(), |f| f.entries(limit))
    }

    /// The initiative catalog, id order. The default read
    /// (`include_deleted = false`) excludes tombstoned rows.
    #[must_use]
    pub fn initiatives(&self, include_deleted: bool) -> Vec<InitiativeRow> {
        let log = read_lock(&self.log);
        write_lock(&self.initiatives).with(log.events(), |c| c.all(include_deleted))
    }

    /// One catalog row by aggregate id.
    #[must_use]
    pub fn initiative(&self, id: &str, include_deleted: bool) -> Option<InitiativeRow> {
        let log = read_lock(&self.log);
        write_lock(&self.initiatives)
            .with(log.events(), |c| c.by_id(id, include_deleted).cloned())
    }

    /// Non-tombstoned initiatives owned by one team.
    #[must_use]
    pub fn initiatives_for_team(&self, team_id: &str) -> Vec<InitiativeRow> {
        let log = read_lock(&self.log);
        write_lock(&self.initiatives).with(log.events(), |c| c.for_team(team_id))
    }

    /// All kanban entries across every board, element-id order.
    #[must_use]
    pub fn kanban_entries(&self) -> Vec<KanbanEntry> {
        let log = read_lock(&self.log);
        write_lock(&self.kanban).with(log.events(), KanbanStatusMap::all)
    }

    /// Kanban entries for one board, element-id order.
    #[must_use]
    pub fn board(&self, board_id: &str) -> Vec<KanbanEntry> {
        let log = read_lock(&self.log);
        write_lock(&self.kanban).with(log.events(), |k| k.for_board(board_id))
    }

    /// One kanban entry by element id.
    #[must_use]
    pub fn kanban_entry(&self, element_id: &str) -> Option<KanbanEntry> {
        let log = read_lock(&self.log);
        write_lock(&self.kanban).with(log.events(), |k| k.by_element(element_id).cloned())
    }

    /// Tags attached to one aggregate.
    #[must_use]
    pub fn tags(&self, aggregate_id: &str) -> BTreeSet<String> {
        let log = read_lock(&self.log);
        write_lock(&self.tags).with(log.events(), |t| t.for_aggregate(aggregate_id))
    }

    /// The full tag index.
    #[must_use]
    pub fn tag_index(&self) -> BTreeMap<String, BTreeSet<String>> {
        let log = read_lock(&self.log);
        write_lock(&self.tags).with(log.events(), |t| t.all().clone())
    }

    /// Radar items linked to one initiative.
    #[must_use]
    pub fn links(&self, aggregate_id: &str) -> BTreeSet<String> {
        let log = read_lock(&self.log);
        write_lock(&self.links).with(log.events(), |l| l.for_aggregate(aggregate_id))
    }

    /// The full link index.
    #[must_use]
    pub fn link_index(&self) -> BTreeMap<String, BTreeSet<String>> {
        let log = read_lock(&self.log);
        write_lock(&self.links).with(log.events(), |l| l.all().clone())
    }

    // -----------------------------------------------------------------------
    // Slice lifecycle
    // -----------------------------------------------------------------------

    /// Force a full replay of one slice, discarding prior cache contents
    /// and leaving the cache `Populated`.
    pub fn rebuild_projection(&self, slice: Slice) {
        let log = read_lock(&self.log);
        let events = log.events();
        match slice {
            Slice::Teams => write_lock(&self.teams).rebuild(events),
            Slice::Companies => write_lock(&self.companies).rebuild(events),
            Slice::Feed => write_lock(&self.feed).rebuild(events),
            Slice::Initiatives => write_lock(&self.initiatives).rebuild(events),
            Slice::Kanban => write_lock(&self.kanban).rebuild(events),
            Slice::Tags => write_lock(&self.tags).rebuild(events),
            Slice::Links => write_lock(&self.links).rebuild(events),
        }
    }

    /// Rebuild every slice.
    pub fn rebuild_all(&self) {
        for slice in Slice::ALL {
            self.rebuild_projection(slice);
        }
    }

    /// Operator action: answer the slice's reads as empty until the next
    /// rebuild. Distinct from "never built".
    pub fn empty_projection(&self, slice: Slice) {
        match slice {
            Slice::Teams => write_lock(&self.teams).empty(),
            Slice::Companies => write_lock(&self.companies).empty(),
            Slice::Feed => write_lock(&self.feed).empty(),
            Slice::Initiatives => write_lock(&self.initiatives).empty(),
            Slice::Kanban => write_lock(&self.kanban).empty(),
            Slice::Tags => write_lock(&self.tags).empty(),
            Slice::Links => write_lock(&self.links).empty(),
        }
    }

    /// Current lifecycle state of one slice's cache.
    #[must_use]
    pub fn projection_status(&self, slice: Slice) -> CacheState {
        match slice {
            Slice::Teams => read_lock(&self.teams).status(),
            Slice::Companies => read_lock(&self.companies).status(),
            Slice::Feed => read_lock(&self.feed).status(),
            Slice::Initiatives => read_lock(&self.initiatives).status(),
            Slice::Kanban => read_lock(&self.kanban).status(),
            Slice::Tags => read_lock(&self.tags).status(),
            Slice::Links => read_lock(&self.links).status(),
        }
    }

    /// Operator report over the log and every cache.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let (events, by_entity) = {
            let log = read_lock(&self.log);
            let mut by_entity: BTreeMap<String, usize> = BTreeMap::new();
            for event in log.events() {
                *by_entity.entry(event.entity.to_string()).or_default() += 1;
            }
            (log.len(), by_entity)
        };

        let caches = Slice::ALL
            .into_iter()
            .map(|slice| (slice.as_str(), self.projection_status(slice)))
            .collect();

        StoreStats {
            events,
            by_entity,
            caches,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
