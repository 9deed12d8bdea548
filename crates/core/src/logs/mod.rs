//! Logs module - local event log and error log.

mod logs_model;
mod logs_traits;

pub use logs_model::{
    ErrorCounts, ErrorLog, ErrorSeverity, EventLog, LogLevel, NewErrorLog, NewEventLog,
};
pub use logs_traits::LogRepositoryTrait;
