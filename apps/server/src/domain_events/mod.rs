//! Domain events runtime bridge for the web server.
//!
//! Receives domain events via DomainEventSink and appends them to the local
//! event log from a background worker. Writing the log never blocks or fails
//! the request that produced the event.

mod planner;
mod queue_worker;
mod sink;

pub use sink::EventLogSink;
