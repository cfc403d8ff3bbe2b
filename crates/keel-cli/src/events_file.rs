//! JSON Lines event-log fixtures.
//!
//! One event per line, camelCase schema, `#` comment lines and blank lines
//! skipped. The store itself stays in-memory; this module only imports and
//! exports fixtures for inspection runs.

use anyhow::{Context, Result};
use keel_core::Event;
use std::path::Path;

/// Header comment written at the top of generated fixtures.
pub const FILE_HEADER: &str = "# keel event log v1";

/// Parse a fixture's content. Blank lines and `#` comments are skipped;
/// parse failures report the 1-based line number.
///
/// # Errors
///
/// Returns an error naming the offending line if any event fails to parse.
pub fn parse_lines(raw: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: Event = serde_json::from_str(trimmed)
            .with_context(|| format!("parse event at line {}", idx + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Load a fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any line fails to parse.
pub fn load(path: &Path) -> Result<Vec<Event>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read event log {}", path.display()))?;
    parse_lines(&raw).with_context(|| format!("in event log {}", path.display()))
}

/// Serialize events to fixture content, header included.
///
/// # Errors
///
/// Returns an error if an event fails to serialize (should not happen with
/// well-formed events).
pub fn to_lines(events: &[Event]) -> Result<String> {
    let mut out = String::from(FILE_HEADER);
    out.push('\n');
    for event in events {
        let line = serde_json::to_string(event).context("serialize event")?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Write a fixture file.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save(path: &Path, events: &[Event]) -> Result<()> {
    let content = to_lines(events)?;
    std::fs::write(path, content)
        .with_context(|| format!("write event log {}", path.display()))?;
    Ok(())
}
