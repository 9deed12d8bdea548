//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after successful domain mutations. The server implements the sink to
//! append events to the event log.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
