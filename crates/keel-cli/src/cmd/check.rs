//! `keel check` — verify replay determinism over the loaded log.
//!
//! Builds every projection through the live dispatch path (that already
//! happened while loading the fixture), snapshots the results, forces a
//! full rebuild of every slice, and compares. A divergence means a fold is
//! not replay-deterministic.

use anyhow::Result;
use keel_core::{Event, EventStore, InitiativeRow, KanbanEntry, Slice};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use crate::output::{OutputMode, print_json};

#[derive(Debug, PartialEq)]
struct Snapshot {
    teams: Vec<keel_core::Team>,
    companies: Vec<keel_core::Company>,
    initiatives: Vec<InitiativeRow>,
    feed: Vec<Event>,
    kanban: Vec<KanbanEntry>,
    tags: BTreeMap<String, BTreeSet<String>>,
    links: BTreeMap<String, BTreeSet<String>>,
}

impl Snapshot {
    fn capture(store: &EventStore) -> Self {
        Self {
            teams: store.teams(),
            companies: store.companies(),
            initiatives: store.initiatives(true),
            feed: store.feed(Some(usize::MAX)),
            kanban: store.kanban_entries(),
            tags: store.tag_index(),
            links: store.link_index(),
        }
    }

    fn diff(&self, other: &Self) -> Vec<&'static str> {
        let mut diverged = Vec::new();
        if self.teams != other.teams {
            diverged.push("teams");
        }
        if self.companies != other.companies {
            diverged.push("companies");
        }
        if self.initiatives != other.initiatives {
            diverged.push("initiatives");
        }
        if self.feed != other.feed {
            diverged.push("feed");
        }
        if self.kanban != other.kanban {
            diverged.push("kanban");
        }
        if self.tags != other.tags {
            diverged.push("tags");
        }
        if self.links != other.links {
            diverged.push("links");
        }
        diverged
    }
}

/// Run `keel check`. Returns `true` when every slice is deterministic.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn run_check(store: &EventStore, mode: OutputMode) -> Result<bool> {
    let live = Snapshot::capture(store);
    store.rebuild_all();
    let rebuilt = Snapshot::capture(store);

    let diverged = live.diff(&rebuilt);
    let ok = diverged.is_empty();

    if mode.is_json() {
        print_json(&json!({
            "events": store.event_count(),
            "deterministic": ok,
            "diverged": diverged,
        }))?;
        return Ok(ok);
    }

    for slice in Slice::ALL {
        let status = if diverged.contains(&slice.as_str()) {
            "DIVERGED"
        } else {
            "ok"
        };
        println!("{slice}: {status}");
    }
    if ok {
        println!("check: live apply matches full replay ({} events)", store.event_count());
    } else {
        println!("check: {} slice(s) diverged from replay", diverged.len());
    }
    Ok(ok)
}
