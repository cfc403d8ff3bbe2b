//! `keel stats` — event counts and cache states.

use anyhow::Result;
use keel_core::{EventStore, Slice};
use serde_json::json;

use crate::output::{OutputMode, print_json};

/// Run `keel stats`.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn run_stats(store: &EventStore, mode: OutputMode) -> Result<()> {
    let stats = store.stats();

    if mode.is_json() {
        let caches: serde_json::Map<String, serde_json::Value> = Slice::ALL
            .into_iter()
            .map(|slice| {
                (
                    slice.as_str().to_string(),
                    json!(store.projection_status(slice).as_str()),
                )
            })
            .collect();
        print_json(&json!({
            "events": stats.events,
            "byEntity": stats.by_entity,
            "caches": caches,
        }))?;
        return Ok(());
    }

    println!("events: {}", stats.events);
    for (entity, count) in &stats.by_entity {
        println!("  {entity}: {count}");
    }
    println!("caches:");
    for (slice, state) in &stats.caches {
        println!("  {slice}: {state}");
    }
    Ok(())
}
