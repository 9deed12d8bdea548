//! Log repository trait.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::logs_model::{ErrorCounts, ErrorLog, EventLog, NewErrorLog, NewEventLog};
use crate::errors::Result;

#[async_trait]
pub trait LogRepositoryTrait: Send + Sync {
    async fn record_event(&self, entry: NewEventLog) -> Result<EventLog>;

    async fn record_error(&self, entry: NewErrorLog) -> Result<ErrorLog>;

    /// Most recent event-log rows, newest first.
    fn list_events(&self, limit: i64) -> Result<Vec<EventLog>>;

    /// Most recent error-log rows, newest first.
    fn list_errors(&self, limit: i64) -> Result<Vec<ErrorLog>>;

    /// Deletes event-log rows created before `cutoff`.
    async fn delete_events_before(&self, cutoff: NaiveDateTime) -> Result<usize>;

    /// Deletes error-log rows created before `cutoff`.
    async fn delete_errors_before(&self, cutoff: NaiveDateTime) -> Result<usize>;

    /// Counts error-log rows created at or after `since`, by severity.
    fn count_errors_since(&self, since: NaiveDateTime) -> Result<ErrorCounts>;
}
