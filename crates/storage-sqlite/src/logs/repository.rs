use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::str::FromStr;
use std::sync::Arc;

use eventcover_core::errors::Result;
use eventcover_core::logs::{
    ErrorCounts, ErrorLog, ErrorSeverity, EventLog, LogRepositoryTrait, NewErrorLog, NewEventLog,
};

use super::model::{ErrorLogDB, EventLogDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{error_logs, event_logs};
use crate::utils::{new_id, now};

pub struct LogRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl LogRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        LogRepository { pool, writer }
    }
}

#[async_trait]
impl LogRepositoryTrait for LogRepository {
    async fn record_event(&self, entry: NewEventLog) -> Result<EventLog> {
        let row = EventLogDB {
            id: new_id(),
            level: entry.level.as_str().to_string(),
            action: entry.action,
            message: entry.message,
            user_email: entry.user_email,
            metadata: entry.metadata.map(|m| m.to_string()),
            created_at: now(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<EventLog> {
                diesel::insert_into(event_logs::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(EventLog::from(row))
            })
            .await
    }

    async fn record_error(&self, entry: NewErrorLog) -> Result<ErrorLog> {
        let row = ErrorLogDB {
            id: new_id(),
            severity: entry.severity.as_str().to_string(),
            source: entry.source,
            message: entry.message,
            context: entry.context.map(|c| c.to_string()),
            created_at: now(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ErrorLog> {
                diesel::insert_into(error_logs::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(ErrorLog::from(row))
            })
            .await
    }

    fn list_events(&self, limit: i64) -> Result<Vec<EventLog>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = event_logs::table
            .order(event_logs::created_at.desc())
            .limit(limit)
            .select(EventLogDB::as_select())
            .load::<EventLogDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(EventLog::from).collect())
    }

    fn list_errors(&self, limit: i64) -> Result<Vec<ErrorLog>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = error_logs::table
            .order(error_logs::created_at.desc())
            .limit(limit)
            .select(ErrorLogDB::as_select())
            .load::<ErrorLogDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(ErrorLog::from).collect())
    }

    async fn delete_events_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(event_logs::table.filter(event_logs::created_at.lt(cutoff)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    async fn delete_errors_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(error_logs::table.filter(error_logs::created_at.lt(cutoff)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn count_errors_since(&self, since: NaiveDateTime) -> Result<ErrorCounts> {
        let mut conn = get_connection(&self.pool)?;
        let rows = error_logs::table
            .filter(error_logs::created_at.ge(since))
            .group_by(error_logs::severity)
            .select((error_logs::severity, count_star()))
            .load::<(String, i64)>(&mut conn)
            .into_core()?;

        let mut counts = ErrorCounts::default();
        for (severity, count) in rows {
            match ErrorSeverity::from_str(&severity) {
                Ok(severity) => counts.add(severity, count as u64),
                Err(e) => log::warn!("Skipping error-log rows: {}", e),
            }
        }
        Ok(counts)
    }
}
