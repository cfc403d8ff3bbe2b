//! `keel seed` — generate a deterministic demonstration event log.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use keel_core::event::payload::{
    CompanyCreatedPayload, ElementAddedPayload, ElementMovedPayload, EventPayload,
    InitiativeCreatedPayload, InitiativeDeletedPayload, LinkPayload, StrategyCreatedPayload,
    StrategyUpdatedPayload, TagPayload, TeamCreatedPayload, TeamUpdatedPayload,
};
use keel_core::{Event, EventType, KanbanStatus, StrategyState};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::events_file;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Write the fixture to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Run `keel seed`.
///
/// # Errors
///
/// Returns an error if serialization or the output write fails.
pub fn run_seed(args: &SeedArgs) -> Result<()> {
    let events = demo_events();
    if let Some(path) = &args.out {
        events_file::save(path, &events)?;
        println!("seed: wrote {} events to {}", events.len(), path.display());
    } else {
        print!("{}", events_file::to_lines(&events)?);
    }
    Ok(())
}

/// A fixed scenario touching every slice: an org, two strategies, three
/// initiatives (one soft-deleted), a kanban board, tags, and links.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn demo_events() -> Vec<Event> {
    let base = Utc
        .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid base timestamp");
    let at = |minutes: i64| -> DateTime<Utc> { base + Duration::minutes(minutes) };
    let none = BTreeMap::new;

    vec![
        Event::new(
            EventType::TeamCreated,
            "team-exec",
            at(0),
            EventPayload::TeamCreated(TeamCreatedPayload {
                name: "CEO".into(),
                level: 0,
                mission: Some("Set direction".into()),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::TeamCreated,
            "team-product",
            at(1),
            EventPayload::TeamCreated(TeamCreatedPayload {
                name: "Product".into(),
                level: 1,
                mission: None,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::TeamCreated,
            "team-platform",
            at(2),
            EventPayload::TeamCreated(TeamCreatedPayload {
                name: "Platform".into(),
                level: 1,
                mission: Some("Keep the lights on".into()),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::CompanyCreated,
            "co-acme",
            at(3),
            EventPayload::CompanyCreated(CompanyCreatedPayload {
                name: "Acme Corp".into(),
                segment: Some("enterprise".into()),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::StrategyCreated,
            "strat-upmarket",
            at(4),
            EventPayload::StrategyCreated(StrategyCreatedPayload {
                name: "Move up-market".into(),
                state: StrategyState::Draft,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::StrategyCreated,
            "strat-selfserve",
            at(5),
            EventPayload::StrategyCreated(StrategyCreatedPayload {
                name: "Self-serve growth".into(),
                state: StrategyState::Active,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::InitiativeCreated,
            "init-sso",
            at(6),
            EventPayload::InitiativeCreated(InitiativeCreatedPayload {
                name: "Enterprise SSO".into(),
                team_id: "team-platform".into(),
                strategy_id: Some("strat-upmarket".into()),
                description: Some("SAML and SCIM support".into()),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::InitiativeCreated,
            "init-onboarding",
            at(7),
            EventPayload::InitiativeCreated(InitiativeCreatedPayload {
                name: "Self-serve onboarding".into(),
                team_id: "team-product".into(),
                strategy_id: Some("strat-selfserve".into()),
                description: None,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::InitiativeCreated,
            "init-legacy",
            at(8),
            EventPayload::InitiativeCreated(InitiativeCreatedPayload {
                name: "Legacy importer".into(),
                team_id: "team-product".into(),
                strategy_id: None,
                description: None,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::ElementAdded,
            "board-product",
            at(9),
            EventPayload::ElementAdded(ElementAddedPayload {
                element_id: "item-sso".into(),
                title: Some("Enterprise SSO".into()),
                status: KanbanStatus::New,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::ElementAdded,
            "board-product",
            at(10),
            EventPayload::ElementAdded(ElementAddedPayload {
                element_id: "item-onboarding".into(),
                title: Some("Self-serve onboarding".into()),
                status: KanbanStatus::New,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::ElementMoved,
            "board-product",
            at(11),
            EventPayload::ElementMoved(ElementMovedPayload {
                element_id: "item-sso".into(),
                to_status: KanbanStatus::InProgress,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::TagAdded,
            "item-sso",
            at(12),
            EventPayload::TagAdded(TagPayload {
                tag: "security".into(),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::TagAdded,
            "item-sso",
            at(13),
            EventPayload::TagAdded(TagPayload {
                tag: "enterprise".into(),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::TagAdded,
            "item-onboarding",
            at(14),
            EventPayload::TagAdded(TagPayload {
                tag: "growth".into(),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::LinkAdded,
            "init-sso",
            at(15),
            EventPayload::LinkAdded(LinkPayload {
                target_id: "item-sso".into(),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::LinkAdded,
            "init-onboarding",
            at(16),
            EventPayload::LinkAdded(LinkPayload {
                target_id: "item-onboarding".into(),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::StrategyUpdated,
            "strat-upmarket",
            at(17),
            EventPayload::StrategyUpdated(StrategyUpdatedPayload {
                name: None,
                state: Some(StrategyState::Active),
                extra: none(),
            }),
        ),
        Event::new(
            EventType::TeamUpdated,
            "team-exec",
            at(18),
            EventPayload::TeamUpdated(TeamUpdatedPayload {
                name: Some("Chief Exec".into()),
                level: None,
                mission: None,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::ElementMoved,
            "board-product",
            at(19),
            EventPayload::ElementMoved(ElementMovedPayload {
                element_id: "item-sso".into(),
                to_status: KanbanStatus::Done,
                extra: none(),
            }),
        ),
        Event::new(
            EventType::InitiativeDeleted,
            "init-legacy",
            at(20),
            EventPayload::InitiativeDeleted(InitiativeDeletedPayload {
                reason: Some("Superseded by the onboarding work".into()),
                extra: none(),
            }),
        ),
    ]
}
