//! Where services send their domain events.

use std::sync::{Arc, Mutex};

use super::DomainEvent;

/// Receives events after a quote, policy or payment mutation commits.
///
/// `emit` runs on the request path: it must not block and it cannot fail.
/// A lost event never rolls back the mutation that produced it.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// Records emitted events in memory. Used by service tests.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Action names of the recorded events, oldest first.
    pub fn actions(&self) -> Vec<&'static str> {
        self.events().iter().map(DomainEvent::action).collect()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
