//! Maintenance domain models.

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::schedule::Schedule;
use crate::constants::{
    DEFAULT_DAILY_BACKUP_RETENTION_DAYS, DEFAULT_LOG_RETENTION_DAYS,
    DEFAULT_WEEKLY_BACKUP_RETENTION_DAYS,
};
use crate::logs::ErrorCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupKind {
    Daily,
    Weekly,
    Manual,
}

impl BackupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupKind::Daily => "DAILY",
            BackupKind::Weekly => "WEEKLY",
            BackupKind::Manual => "MANUAL",
        }
    }
}

impl FromStr for BackupKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DAILY" => Ok(BackupKind::Daily),
            "WEEKLY" => Ok(BackupKind::Weekly),
            "MANUAL" => Ok(BackupKind::Manual),
            _ => Err(format!("Unknown backup kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupStatus {
    Success,
    Failed,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Success => "SUCCESS",
            BackupStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for BackupStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(BackupStatus::Success),
            "FAILED" => Ok(BackupStatus::Failed),
            _ => Err(format!("Unknown backup status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub id: String,
    pub kind: BackupKind,
    pub file_path: Option<String>,
    pub size_bytes: Option<i64>,
    /// SHA-256 of the main database copy, hex encoded.
    pub checksum: Option<String>,
    pub duration_ms: i64,
    pub status: BackupStatus,
    pub error_message: Option<String>,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBackupRecord {
    pub kind: BackupKind,
    pub file_path: Option<String>,
    pub size_bytes: Option<i64>,
    pub checksum: Option<String>,
    pub duration_ms: i64,
    pub status: BackupStatus,
    pub error_message: Option<String>,
    pub expires_at: NaiveDateTime,
}

/// Files produced by a database backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub file_path: String,
    pub size_bytes: i64,
    pub checksum: String,
}

/// Settings the maintenance jobs run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceSettings {
    pub backup_dir: String,
    pub log_retention_days: i64,
    pub daily_backup_retention_days: i64,
    pub weekly_backup_retention_days: i64,
    /// Recipient of error reports. Reports are skipped when unset.
    pub admin_email: Option<String>,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            backup_dir: "./backups".to_string(),
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
            daily_backup_retention_days: DEFAULT_DAILY_BACKUP_RETENTION_DAYS,
            weekly_backup_retention_days: DEFAULT_WEEKLY_BACKUP_RETENTION_DAYS,
            admin_email: None,
        }
    }
}

impl MaintenanceSettings {
    pub fn retention_days(&self, kind: BackupKind) -> i64 {
        match kind {
            BackupKind::Daily => self.daily_backup_retention_days,
            BackupKind::Weekly | BackupKind::Manual => self.weekly_backup_retention_days,
        }
    }
}

/// Scheduled maintenance jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceJob {
    ExpireQuotes,
    DailyBackup,
    WeeklyBackup,
    CleanupLogs,
    CleanupBackups,
    ErrorReport,
}

impl MaintenanceJob {
    pub const ALL: [MaintenanceJob; 6] = [
        MaintenanceJob::ExpireQuotes,
        MaintenanceJob::DailyBackup,
        MaintenanceJob::WeeklyBackup,
        MaintenanceJob::CleanupLogs,
        MaintenanceJob::CleanupBackups,
        MaintenanceJob::ErrorReport,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MaintenanceJob::ExpireQuotes => "expire-quotes",
            MaintenanceJob::DailyBackup => "daily-backup",
            MaintenanceJob::WeeklyBackup => "weekly-backup",
            MaintenanceJob::CleanupLogs => "cleanup-logs",
            MaintenanceJob::CleanupBackups => "cleanup-backups",
            MaintenanceJob::ErrorReport => "error-report",
        }
    }

    /// Wall-clock schedule in UTC.
    pub fn schedule(&self) -> Schedule {
        match self {
            MaintenanceJob::ExpireQuotes => Schedule::Daily { at: time_of_day(1, 30) },
            MaintenanceJob::DailyBackup => Schedule::Daily { at: time_of_day(2, 0) },
            MaintenanceJob::WeeklyBackup => Schedule::Weekly {
                weekday: Weekday::Sun,
                at: time_of_day(3, 0),
            },
            MaintenanceJob::CleanupLogs => Schedule::Daily { at: time_of_day(4, 0) },
            MaintenanceJob::CleanupBackups => Schedule::Daily { at: time_of_day(5, 0) },
            MaintenanceJob::ErrorReport => Schedule::Every { minutes: 10 },
        }
    }
}

impl FromStr for MaintenanceJob {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MaintenanceJob::ALL
            .iter()
            .copied()
            .find(|job| job.name() == s)
            .ok_or_else(|| format!("Unknown maintenance job: {}", s))
    }
}

fn time_of_day(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Result of one job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub job: MaintenanceJob,
    /// Rows or files the job touched.
    pub affected: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub window_start: NaiveDateTime,
    pub counts: ErrorCounts,
    pub sent: bool,
}
