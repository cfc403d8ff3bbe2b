//! keel-core: event log, handler registry, and projection caches.
//!
//! The write path is a single operation — [`EventStore::append`] — which
//! validates a batch, lands it on the append-only log, and synchronously
//! dispatches each event to the projections registered for its type. Reads
//! go through per-slice caches that bootstrap lazily from the log, stay
//! current via live dispatch, and can be explicitly emptied or rebuilt by
//! full replay.
//!
//! The store is deliberately in-memory and single-process: projections are
//! disposable, the log is the source of truth, and a rebuild is always a
//! correct recovery path.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` errors at the library boundary, each
//!   mapped to a stable [`ErrorCode`]; everything inside the dispatch/fold
//!   boundary is absorbed and logged.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod projection;
pub mod store;

pub use config::StoreConfig;
pub use error::ErrorCode;
pub use event::{Entity, Event, EventMetadata, EventPayload, EventType, InvalidEventError};
pub use model::{KanbanStatus, StrategyState};
pub use projection::{
    CacheState, Company, InitiativeRow, KanbanEntry, Projection, ProjectionError, Team,
};
pub use store::{AppendStats, EventHandler, EventStore, Slice, StoreStats};
