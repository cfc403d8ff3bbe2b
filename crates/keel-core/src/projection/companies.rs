//! Company directory projection.
//!
//! Same fold shape as the team directory: create inserts, update patches
//! present fields only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::{Event, EventPayload, EventType};

use super::{Projection, ProjectionError};

/// Materialized view of one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All companies, keyed by aggregate id.
#[derive(Debug, Default)]
pub struct CompanyDirectory {
    companies: BTreeMap<String, Company>,
}

impl CompanyDirectory {
    /// All companies in id order.
    #[must_use]
    pub fn all(&self) -> Vec<Company> {
        self.companies.values().cloned().collect()
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Company> {
        self.companies.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

impl Projection for CompanyDirectory {
    const NAME: &'static str = "companies";

    fn interests() -> &'static [EventType] {
        &[EventType::CompanyCreated, EventType::CompanyUpdated]
    }

    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        match (&event.event_type, &event.payload) {
            (EventType::CompanyCreated, EventPayload::CompanyCreated(p)) => {
                if self.companies.contains_key(&event.aggregate_id) {
                    tracing::debug!(
                        company = %event.aggregate_id,
                        "duplicate company.created ignored"
                    );
                    return Ok(());
                }
                self.companies.insert(
                    event.aggregate_id.clone(),
                    Company {
                        id: event.aggregate_id.clone(),
                        name: p.name.clone(),
                        segment: p.segment.clone(),
                        created_at: event.timestamp,
                        updated_at: event.timestamp,
                    },
                );
                Ok(())
            }
            (EventType::CompanyUpdated, EventPayload::CompanyUpdated(p)) => {
                let Some(company) = self.companies.get_mut(&event.aggregate_id) else {
                    tracing::debug!(
                        company = %event.aggregate_id,
                        "company.updated for unknown company ignored"
                    );
                    return Ok(());
                };
                if let Some(name) = &p.name {
                    company.name.clone_from(name);
                }
                if let Some(segment) = &p.segment {
                    company.segment = Some(segment.clone());
                }
                company.updated_at = event.timestamp;
                Ok(())
            }
            (EventType::CompanyCreated | EventType::CompanyUpdated, _) => {
                Err(ProjectionError::PayloadMismatch {
                    projection: Self::NAME,
                    event_type: event.event_type,
                })
            }
            _ => Err(ProjectionError::UnexpectedEventType {
                projection: Self::NAME,
                event_type: event.event_type,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::payload::{CompanyCreatedPayload, CompanyUpdatedPayload};
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_709_280_000 + secs, 0).single().expect("ts")
    }

    fn created(id: &str, name: &str, secs: i64) -> Event {
        Event::new(
            EventType::CompanyCreated,
            id,
            ts(secs),
            EventPayload::CompanyCreated(CompanyCreatedPayload {
                name: name.into(),
                segment: None,
                extra: BTreeMap::new(),
            }),
        )
    }

    #[test]
    fn created_then_updated() {
        let mut dir = CompanyDirectory::default();
        dir.apply(&created("co-1", "Acme", 0)).expect("apply");
        dir.apply(&Event::new(
            EventType::CompanyUpdated,
            "co-1",
            ts(60),
            EventPayload::CompanyUpdated(CompanyUpdatedPayload {
                name: None,
                segment: Some("enterprise".into()),
                extra: BTreeMap::new(),
            }),
        ))
        .expect("apply");

        let company = dir.by_id("co-1").expect("present");
        assert_eq!(company.name, "Acme");
        assert_eq!(company.segment.as_deref(), Some("enterprise"));
        assert_eq!(company.updated_at, ts(60));
    }

    #[test]
    fn update_for_unknown_company_is_ignored() {
        let mut dir = CompanyDirectory::default();
        dir.apply(&Event::new(
            EventType::CompanyUpdated,
            "co-ghost",
            ts(0),
            EventPayload::CompanyUpdated(CompanyUpdatedPayload::default()),
        ))
        .expect("apply");
        assert!(dir.is_empty());
    }

    #[test]
    fn duplicate_create_keeps_first() {
        let mut dir = CompanyDirectory::default();
        dir.apply(&created("co-1", "Acme", 0)).expect("apply");
        dir.apply(&created("co-1", "Acme Again", 60)).expect("apply");
        assert_eq!(dir.by_id("co-1").expect("present").name, "Acme");
        assert_eq!(dir.len(), 1);
    }
}
