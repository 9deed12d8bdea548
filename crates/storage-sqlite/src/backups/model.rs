//! Database model for backup records.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use eventcover_core::maintenance::{BackupKind, BackupRecord, BackupStatus, NewBackupRecord};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::backups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BackupDB {
    pub id: String,
    pub kind: String,
    pub file_path: Option<String>,
    pub size_bytes: Option<i64>,
    pub checksum: Option<String>,
    pub duration_ms: i64,
    pub status: String,
    pub error_message: Option<String>,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl BackupDB {
    pub fn new(id: String, record: NewBackupRecord, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            kind: record.kind.as_str().to_string(),
            file_path: record.file_path,
            size_bytes: record.size_bytes,
            checksum: record.checksum,
            duration_ms: record.duration_ms,
            status: record.status.as_str().to_string(),
            error_message: record.error_message,
            expires_at: record.expires_at,
            created_at,
        }
    }
}

impl From<BackupDB> for BackupRecord {
    fn from(db: BackupDB) -> Self {
        let kind = BackupKind::from_str(&db.kind).unwrap_or_else(|e| {
            log::error!("{}", e);
            BackupKind::Manual
        });
        let status = BackupStatus::from_str(&db.status).unwrap_or_else(|e| {
            log::error!("{}", e);
            BackupStatus::Failed
        });
        Self {
            id: db.id,
            kind,
            file_path: db.file_path,
            size_bytes: db.size_bytes,
            checksum: db.checksum,
            duration_ms: db.duration_ms,
            status,
            error_message: db.error_message,
            expires_at: db.expires_at,
            created_at: db.created_at,
        }
    }
}
