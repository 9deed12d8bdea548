//! Web domain event sink implementation.
//!
//! Receives domain events and hands them to a background worker that
//! writes them to the event log.

use std::sync::{Arc, Mutex};

use eventcover_core::{
    events::{DomainEvent, DomainEventSink},
    logs::LogRepositoryTrait,
};
use tokio::sync::mpsc;

use super::queue_worker::event_log_worker;

/// Domain event sink for the web server runtime.
///
/// # Two-Phase Initialization
///
/// Services need the sink at construction time, while the worker needs the
/// log repository. The sink is created first with `new()` and buffers events
/// until `start_worker()` spawns the worker.
pub struct EventLogSink {
    tx: mpsc::UnboundedSender<DomainEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<DomainEvent>>>,
}

impl EventLogSink {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Starts the background worker. Later calls are ignored.
    pub fn start_worker(&self, log_repository: Arc<dyn LogRepositoryTrait>) {
        let rx = match self.rx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match rx {
            Some(rx) => {
                tokio::spawn(event_log_worker(rx, log_repository));
            }
            None => tracing::warn!("Event log worker already started"),
        }
    }

    #[cfg(test)]
    pub fn with_sender(tx: mpsc::UnboundedSender<DomainEvent>) -> Self {
        Self {
            tx,
            rx: Mutex::new(None),
        }
    }
}

impl Default for EventLogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainEventSink for EventLogSink {
    fn emit(&self, event: DomainEvent) {
        // Best-effort: a closed channel only loses the log entry.
        if let Err(e) = self.tx.send(event) {
            tracing::warn!("Failed to emit domain event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_sends_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventLogSink::with_sender(tx);

        sink.emit(DomainEvent::policy_deleted("p1".to_string()));

        let event = rx.try_recv().unwrap();
        assert_eq!(event, DomainEvent::policy_deleted("p1".to_string()));
    }

    #[test]
    fn test_sink_preserves_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventLogSink::with_sender(tx);

        sink.emit(DomainEvent::quotes_expired(1));
        sink.emit(DomainEvent::quote_deleted("QI-19102026-000001".to_string()));

        assert_eq!(rx.try_recv().unwrap(), DomainEvent::quotes_expired(1));
        assert_eq!(rx.try_recv().unwrap().action(), "quote_deleted");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = EventLogSink::with_sender(tx);
        sink.emit(DomainEvent::quotes_expired(0));
    }
}
