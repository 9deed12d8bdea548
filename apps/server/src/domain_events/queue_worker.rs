//! Event queue worker.
//!
//! Drains the sink's channel and writes one event-log row per event.

use std::sync::Arc;

use eventcover_core::{events::DomainEvent, logs::LogRepositoryTrait};
use tokio::sync::mpsc;

use super::planner::plan_event_log;

/// Runs until every sender is dropped.
pub async fn event_log_worker(
    mut rx: mpsc::UnboundedReceiver<DomainEvent>,
    log_repository: Arc<dyn LogRepositoryTrait>,
) {
    tracing::info!("Event log worker started");

    while let Some(event) = rx.recv().await {
        let entry = plan_event_log(&event);
        let action = entry.action.clone();
        if let Err(e) = log_repository.record_event(entry).await {
            tracing::warn!("Failed to record {} in the event log: {}", action, e);
        }
    }

    tracing::info!("Event log worker shutting down");
}
