//! Backup repository and maintenance service traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::maintenance_model::{
    BackupArtifact, BackupKind, BackupRecord, ErrorReport, JobOutcome, MaintenanceJob,
    NewBackupRecord,
};
use crate::errors::Result;

#[async_trait]
pub trait BackupRepositoryTrait: Send + Sync {
    /// Copies the live database into `backup_dir` as `<file_stem>.db`,
    /// along with any WAL/SHM companions.
    async fn create_backup(&self, backup_dir: &str, file_stem: &str) -> Result<BackupArtifact>;

    /// Removes a backup file and its companions. Missing files are ignored.
    async fn remove_backup_files(&self, file_path: &str) -> Result<()>;

    async fn record(&self, record: NewBackupRecord) -> Result<BackupRecord>;

    async fn delete_record(&self, backup_id: &str) -> Result<usize>;

    /// Lists backups newest first.
    fn list(&self) -> Result<Vec<BackupRecord>>;

    fn list_expired(&self, now: NaiveDateTime) -> Result<Vec<BackupRecord>>;
}

#[async_trait]
pub trait MaintenanceServiceTrait: Send + Sync {
    /// Marks stale unconverted quotes as expired.
    async fn expire_quotes(&self, now: NaiveDateTime) -> Result<usize>;

    /// Backs up the database. A failed copy is recorded as a FAILED row.
    async fn run_backup(&self, kind: BackupKind, now: NaiveDateTime) -> Result<BackupRecord>;

    /// Deletes log rows older than the retention window.
    async fn cleanup_logs(&self, now: NaiveDateTime) -> Result<usize>;

    /// Deletes expired backups, files first.
    async fn cleanup_backups(&self, now: NaiveDateTime) -> Result<usize>;

    /// Emails a summary of recent errors when any are HIGH or CRITICAL.
    async fn send_error_report(&self, now: NaiveDateTime) -> Result<ErrorReport>;

    /// Runs a job, logging and recording any failure before returning it.
    async fn run_job(&self, job: MaintenanceJob, now: NaiveDateTime) -> Result<JobOutcome>;

    fn list_backups(&self) -> Result<Vec<BackupRecord>>;
}
