//! Projection handler registry and dispatcher.
//!
//! Maps event types to ordered handler lists. This decouples the write
//! path from the read models: each projection registers only for the event
//! types it folds, so adding a projection never touches the log or the
//! other projections.
//!
//! # Dedup
//!
//! Registration is deduplicated by handler identity: registering the same
//! handler id twice is ignored with a debug log, so a double module
//! initialization cannot double-apply events.
//!
//! # Isolation
//!
//! Each handler invocation is independent. A failing handler is logged and
//! counted; it never prevents the remaining handlers from running and
//! never unwinds the append that triggered the dispatch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::event::{Event, EventType};
use crate::projection::ProjectionError;

/// A live-update hook invoked for each appended event of an interesting
/// type.
pub trait EventHandler: Send + Sync {
    /// Stable identity used for registration dedup.
    fn id(&self) -> &'static str;

    /// The event types this handler wants.
    fn interests(&self) -> &[EventType];

    /// React to one event.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] when the event cannot be applied; the
    /// dispatcher absorbs and logs it.
    fn on_event(&self, event: &Event) -> Result<(), ProjectionError>;
}

/// Counters returned by one dispatch call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Handler invocations that succeeded.
    pub handled: usize,
    /// Handler invocations that failed (logged and absorbed).
    pub errors: usize,
}

/// Event-type → ordered handler list mapping.
#[derive(Default)]
pub struct HandlerRegistry {
    by_type: HashMap<EventType, Vec<Arc<dyn EventHandler>>>,
    registered: HashSet<&'static str>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every type in its interest list, preserving
    /// registration order per type.
    ///
    /// Returns `false` (and registers nothing) when a handler with the same
    /// id is already present.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) -> bool {
        if !self.registered.insert(handler.id()) {
            tracing::debug!(handler = handler.id(), "duplicate handler registration ignored");
            return false;
        }
        for &event_type in handler.interests() {
            self.by_type
                .entry(event_type)
                .or_default()
                .push(Arc::clone(&handler));
        }
        true
    }

    /// Register a bare callback for a single event type.
    ///
    /// Same dedup rules as [`register`](Self::register); the id is the
    /// handler identity.
    pub fn register_fn(
        &mut self,
        event_type: EventType,
        id: &'static str,
        f: impl Fn(&Event) -> Result<(), ProjectionError> + Send + Sync + 'static,
    ) -> bool {
        self.register(Arc::new(FnHandler {
            id,
            interest: [event_type],
            f: Box::new(f),
        }))
    }

    /// Whether a handler id is already registered.
    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.registered.contains(id)
    }

    /// Number of handlers registered for one event type.
    #[must_use]
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.by_type.get(&event_type).map_or(0, Vec::len)
    }

    /// Invoke every handler registered for the event's type, in
    /// registration order. No handlers is a no-op.
    pub fn dispatch(&self, event: &Event) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let Some(handlers) = self.by_type.get(&event.event_type) else {
            return outcome;
        };
        for handler in handlers {
            match handler.on_event(event) {
                Ok(()) => outcome.handled += 1,
                Err(error) => {
                    tracing::warn!(
                        handler = handler.id(),
                        event_type = %event.event_type,
                        aggregate_id = %event.aggregate_id,
                        code = %error.code(),
                        %error,
                        "handler failed during live dispatch"
                    );
                    outcome.errors += 1;
                }
            }
        }
        outcome
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.registered.len())
            .field("types", &self.by_type.len())
            .finish()
    }
}

/// Adapter turning a closure into an [`EventHandler`].
struct FnHandler {
    id: &'static str,
    interest: [EventType; 1],
    #[allow(clippy::type_complexity)]
    f: Box<dyn Fn(&Event) -> Result<(), ProjectionError> + Send + Sync>,
}

impl EventHandler for FnHandler {
    fn id(&self) -> &'static str {
        self.id
    }

    fn interests(&self) -> &[EventType] {
        &self.interest
    }

    fn on_event(&self, event: &Event) -> Result<(), ProjectionError> {
        (self.f)(event)
    }
}
