//! Replay throughput: append/dispatch vs full projection rebuild.

use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use keel_core::event::payload::{
    EventPayload, InitiativeCreatedPayload, TagPayload, TeamCreatedPayload,
};
use keel_core::{Event, EventStore, EventType, Slice};
use std::collections::BTreeMap;

fn sample_log(n: usize) -> Vec<Event> {
    (0..n)
        .map(|i| {
            let ts = Utc
                .timestamp_opt(1_709_280_000 + i64::try_from(i).expect("small"), 0)
                .single()
                .expect("valid ts");
            match i % 3 {
                0 => Event::new(
                    EventType::TeamCreated,
                    format!("team-{}", i % 50),
                    ts,
                    EventPayload::TeamCreated(TeamCreatedPayload {
                        name: format!("Team {i}"),
                        level: 1,
                        mission: None,
                        extra: BTreeMap::new(),
                    }),
                ),
                1 => Event::new(
                    EventType::InitiativeCreated,
                    format!("init-{i}"),
                    ts,
                    EventPayload::InitiativeCreated(InitiativeCreatedPayload {
                        name: format!("Initiative {i}"),
                        team_id: format!("team-{}", i % 50),
                        strategy_id: None,
                        description: None,
                        extra: BTreeMap::new(),
                    }),
                ),
                _ => Event::new(
                    EventType::TagAdded,
                    format!("item-{}", i % 100),
                    ts,
                    EventPayload::TagAdded(TagPayload {
                        tag: format!("tag-{}", i % 10),
                        extra: BTreeMap::new(),
                    }),
                ),
            }
        })
        .collect()
}

fn bench_append(c: &mut Criterion) {
    let events = sample_log(1_000);
    c.bench_function("append_1k_live_dispatch", |b| {
        b.iter(|| {
            let store = EventStore::new();
            store
                .append(black_box(events.clone()))
                .expect("valid batch");
            black_box(store.event_count())
        });
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let store = EventStore::new();
    store.append(sample_log(1_000)).expect("valid batch");
    c.bench_function("rebuild_initiatives_1k", |b| {
        b.iter(|| {
            store.rebuild_projection(black_box(Slice::Initiatives));
        });
    });
    c.bench_function("rebuild_all_1k", |b| {
        b.iter(|| {
            store.rebuild_all();
        });
    });
}

criterion_group!(benches, bench_append, bench_rebuild);
criterion_main!(benches);
