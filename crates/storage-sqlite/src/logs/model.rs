//! Database models for the event and error logs.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use eventcover_core::logs::{ErrorLog, ErrorSeverity, EventLog, LogLevel};

use crate::utils::parse_enum;

fn parse_json(value: Option<String>, field_name: &str) -> Option<serde_json::Value> {
    value.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(json) => Some(json),
        Err(e) => {
            log::error!("Invalid {} JSON '{}': {}", field_name, raw, e);
            None
        }
    })
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::event_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventLogDB {
    pub id: String,
    pub level: String,
    pub action: String,
    pub message: String,
    pub user_email: Option<String>,
    pub metadata: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<EventLogDB> for EventLog {
    fn from(db: EventLogDB) -> Self {
        Self {
            level: parse_enum::<LogLevel>(&db.level, "log level"),
            metadata: parse_json(db.metadata, "metadata"),
            id: db.id,
            action: db.action,
            message: db.message,
            user_email: db.user_email,
            created_at: db.created_at,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::error_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ErrorLogDB {
    pub id: String,
    pub severity: String,
    pub source: String,
    pub message: String,
    pub context: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<ErrorLogDB> for ErrorLog {
    fn from(db: ErrorLogDB) -> Self {
        let severity = ErrorSeverity::from_str(&db.severity).unwrap_or_else(|e| {
            log::error!("{}", e);
            ErrorSeverity::Medium
        });
        Self {
            severity,
            context: parse_json(db.context, "context"),
            id: db.id,
            source: db.source,
            message: db.message,
            created_at: db.created_at,
        }
    }
}
