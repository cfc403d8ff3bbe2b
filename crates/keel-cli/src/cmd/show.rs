//! `keel show` — print one projection slice.

use anyhow::{Result, bail};
use clap::Args;
use keel_core::{EventStore, Slice};

use crate::output::{OutputMode, print_json};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Slice to show: teams, companies, feed, initiatives, kanban, tags,
    /// links.
    pub slice: Slice,

    /// Show a single row by aggregate/element id.
    #[arg(long)]
    pub id: Option<String>,

    /// Restrict kanban output to one board.
    #[arg(long)]
    pub board: Option<String>,

    /// Restrict tags/links output to one aggregate.
    #[arg(long)]
    pub aggregate: Option<String>,

    /// Include soft-deleted initiative rows.
    #[arg(long)]
    pub include_deleted: bool,

    /// Cap the number of feed entries shown.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Run `keel show`.
///
/// # Errors
///
/// Returns an error when a requested id does not exist or output fails.
#[allow(clippy::too_many_lines)]
pub fn run_show(store: &EventStore, args: &ShowArgs, mode: OutputMode) -> Result<()> {
    match args.slice {
        Slice::Teams => {
            if let Some(id) = &args.id {
                let Some(team) = store.team(id) else {
                    bail!("team '{id}' not found");
                };
                if mode.is_json() {
                    print_json(&team)?;
                } else {
                    println!("{}\t{} (level {})", team.id, team.name, team.level);
                }
            } else if mode.is_json() {
                print_json(&store.teams())?;
            } else {
                for team in store.teams() {
                    println!("{}\t{} (level {})", team.id, team.name, team.level);
                }
            }
        }
        Slice::Companies => {
            if mode.is_json() {
                print_json(&store.companies())?;
            } else {
                for company in store.companies() {
                    let segment = company.segment.as_deref().unwrap_or("-");
                    println!("{}\t{}\t{segment}", company.id, company.name);
                }
            }
        }
        Slice::Feed => {
            let entries = store.feed(args.limit);
            if mode.is_json() {
                print_json(&entries)?;
            } else {
                for event in entries {
                    println!("{event}");
                }
            }
        }
        Slice::Initiatives => {
            if let Some(id) = &args.id {
                let Some(row) = store.initiative(id, true) else {
                    bail!("initiative '{id}' not found");
                };
                if mode.is_json() {
                    print_json(&row)?;
                } else {
                    print_initiative(&row);
                }
            } else {
                let rows = store.initiatives(args.include_deleted);
                if mode.is_json() {
                    print_json(&rows)?;
                } else {
                    for row in rows {
                        print_initiative(&row);
                    }
                }
            }
        }
        Slice::Kanban => {
            let entries = args
                .board
                .as_ref()
                .map_or_else(|| store.kanban_entries(), |board| store.board(board));
            if mode.is_json() {
                print_json(&entries)?;
            } else {
                for entry in entries {
                    println!(
                        "{}\t{}\t{}",
                        entry.element_id, entry.board_id, entry.status
                    );
                }
            }
        }
        Slice::Tags => print_index(store, args, mode, true)?,
        Slice::Links => print_index(store, args, mode, false)?,
    }
    Ok(())
}

fn print_initiative(row: &keel_core::InitiativeRow) {
    let team = row.team_name.as_deref().unwrap_or(row.team_id.as_str());
    let strategy = row
        .strategy_state
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let tombstone = if row.is_deleted() { "\t(deleted)" } else { "" };
    println!(
        "{}\t{}\t[{team}]\tstrategy={strategy}{tombstone}",
        row.id, row.name
    );
}

fn print_index(store: &EventStore, args: &ShowArgs, mode: OutputMode, tags: bool) -> Result<()> {
    if let Some(aggregate) = &args.aggregate {
        let set = if tags {
            store.tags(aggregate)
        } else {
            store.links(aggregate)
        };
        if mode.is_json() {
            print_json(&set)?;
        } else {
            for member in set {
                println!("{member}");
            }
        }
        return Ok(());
    }

    let index = if tags {
        store.tag_index()
    } else {
        store.link_index()
    };
    if mode.is_json() {
        print_json(&index)?;
    } else {
        for (aggregate, members) in index {
            let joined: Vec<String> = members.into_iter().collect();
            println!("{aggregate}\t{}", joined.join(", "));
        }
    }
    Ok(())
}
