//! Maps domain events to event-log entries.

use eventcover_core::{
    events::DomainEvent,
    logs::{LogLevel, NewEventLog},
    payments::PaymentStatus,
};

/// Builds the event-log row recorded for `event`.
///
/// Failed payments are logged at WARN; everything else is INFO. The full
/// event is kept as metadata.
pub fn plan_event_log(event: &DomainEvent) -> NewEventLog {
    let level = match event {
        DomainEvent::PaymentRecorded {
            status: PaymentStatus::Failed,
            ..
        } => LogLevel::Warn,
        _ => LogLevel::Info,
    };

    NewEventLog {
        level,
        action: event.action().to_string(),
        message: event.message(),
        user_email: event.user_email().map(str::to_string),
        metadata: serde_json::to_value(event).ok(),
    }
}
