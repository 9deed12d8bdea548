use chrono::{Duration, NaiveDateTime};
use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use super::maintenance_model::{
    BackupKind, BackupRecord, BackupStatus, ErrorReport, JobOutcome, MaintenanceJob,
    MaintenanceSettings, NewBackupRecord,
};
use super::maintenance_traits::{BackupRepositoryTrait, MaintenanceServiceTrait};
use crate::constants::ERROR_REPORT_WINDOW_MINUTES;
use crate::errors::Result;
use crate::logs::{ErrorCounts, ErrorSeverity, LogRepositoryTrait, NewErrorLog};
use crate::notifications::{EmailMessage, Mailer};
use crate::quotes::QuoteServiceTrait;

/// Service running the scheduled maintenance jobs.
pub struct MaintenanceService {
    quote_service: Arc<dyn QuoteServiceTrait>,
    backup_repository: Arc<dyn BackupRepositoryTrait>,
    log_repository: Arc<dyn LogRepositoryTrait>,
    mailer: Arc<dyn Mailer>,
    settings: MaintenanceSettings,
}

impl MaintenanceService {
    pub fn new(
        quote_service: Arc<dyn QuoteServiceTrait>,
        backup_repository: Arc<dyn BackupRepositoryTrait>,
        log_repository: Arc<dyn LogRepositoryTrait>,
        mailer: Arc<dyn Mailer>,
        settings: MaintenanceSettings,
    ) -> Self {
        Self {
            quote_service,
            backup_repository,
            log_repository,
            mailer,
            settings,
        }
    }

    /// Records an error-log row. Failures here are only logged.
    async fn record_error(&self, entry: NewErrorLog) {
        if let Err(err) = self.log_repository.record_error(entry).await {
            warn!("Failed to record error log entry: {}", err);
        }
    }

    fn report_body(&self, window_start: NaiveDateTime, counts: &ErrorCounts) -> String {
        format!(
            "Errors recorded since {} UTC:\n\n  CRITICAL: {}\n  HIGH:     {}\n  MEDIUM:   {}\n  LOW:      {}\n\nSee GET /api/v1/admin/error-logs for details.\n",
            window_start.format("%Y-%m-%d %H:%M"),
            counts.critical,
            counts.high,
            counts.medium,
            counts.low
        )
    }
}

#[async_trait::async_trait]
impl MaintenanceServiceTrait for MaintenanceService {
    async fn expire_quotes(&self, now: NaiveDateTime) -> Result<usize> {
        self.quote_service.expire_stale_quotes(now).await
    }

    async fn run_backup(&self, kind: BackupKind, now: NaiveDateTime) -> Result<BackupRecord> {
        let file_stem = format!(
            "backup-{}-{}",
            kind.as_str().to_lowercase(),
            now.format("%Y%m%d-%H%M%S")
        );
        let expires_at = now + Duration::days(self.settings.retention_days(kind));

        let started = Instant::now();
        let result = self
            .backup_repository
            .create_backup(&self.settings.backup_dir, &file_stem)
            .await;
        let duration_ms = started.elapsed().as_millis() as i64;

        let record = match result {
            Ok(artifact) => {
                info!(
                    "{} backup written to {} ({} bytes, {} ms)",
                    kind.as_str(),
                    artifact.file_path,
                    artifact.size_bytes,
                    duration_ms
                );
                NewBackupRecord {
                    kind,
                    file_path: Some(artifact.file_path),
                    size_bytes: Some(artifact.size_bytes),
                    checksum: Some(artifact.checksum),
                    duration_ms,
                    status: BackupStatus::Success,
                    error_message: None,
                    expires_at,
                }
            }
            Err(err) => {
                error!("{} backup failed: {}", kind.as_str(), err);
                self.record_error(
                    NewErrorLog::new(ErrorSeverity::High, "backup", err.to_string())
                        .with_context(json!({ "kind": kind.as_str(), "durationMs": duration_ms })),
                )
                .await;
                NewBackupRecord {
                    kind,
                    file_path: None,
                    size_bytes: None,
                    checksum: None,
                    duration_ms,
                    status: BackupStatus::Failed,
                    error_message: Some(err.to_string()),
                    expires_at,
                }
            }
        };

        self.backup_repository.record(record).await
    }

    async fn cleanup_logs(&self, now: NaiveDateTime) -> Result<usize> {
        let cutoff = now - Duration::days(self.settings.log_retention_days);
        let events = self.log_repository.delete_events_before(cutoff).await?;
        let errors = self.log_repository.delete_errors_before(cutoff).await?;
        info!(
            "Log cleanup removed {} event(s) and {} error(s) older than {}",
            events, errors, cutoff
        );
        Ok(events + errors)
    }

    async fn cleanup_backups(&self, now: NaiveDateTime) -> Result<usize> {
        let expired = self.backup_repository.list_expired(now)?;
        let mut removed = 0;
        for backup in expired {
            if let Some(path) = backup.file_path.as_deref() {
                if let Err(err) = self.backup_repository.remove_backup_files(path).await {
                    // Keep the row so the next run retries the file.
                    warn!("Failed to remove backup file {}: {}", path, err);
                    continue;
                }
            }
            removed += self.backup_repository.delete_record(&backup.id).await?;
        }
        if removed > 0 {
            info!("Removed {} expired backup(s)", removed);
        }
        Ok(removed)
    }

    async fn send_error_report(&self, now: NaiveDateTime) -> Result<ErrorReport> {
        let window_start = now - Duration::minutes(ERROR_REPORT_WINDOW_MINUTES);
        let counts = self.log_repository.count_errors_since(window_start)?;

        if !counts.requires_attention() {
            debug!("Error report: {} error(s), nothing to send", counts.total());
            return Ok(ErrorReport {
                window_start,
                counts,
                sent: false,
            });
        }

        let Some(recipient) = self.settings.admin_email.clone() else {
            warn!(
                "Error report has {} critical and {} high error(s) but no admin email is configured",
                counts.critical, counts.high
            );
            return Ok(ErrorReport {
                window_start,
                counts,
                sent: false,
            });
        };

        let message = EmailMessage {
            to: recipient,
            subject: format!(
                "Event Cover error report: {} critical, {} high",
                counts.critical, counts.high
            ),
            body: self.report_body(window_start, &counts),
        };
        self.mailer.send(message).await?;
        info!("Error report sent ({} error(s))", counts.total());

        Ok(ErrorReport {
            window_start,
            counts,
            sent: true,
        })
    }

    async fn run_job(&self, job: MaintenanceJob, now: NaiveDateTime) -> Result<JobOutcome> {
        debug!("Running maintenance job {}", job.name());
        let result = match job {
            MaintenanceJob::ExpireQuotes => self
                .expire_quotes(now)
                .await
                .map(|count| (count, format!("{} quote(s) expired", count))),
            MaintenanceJob::DailyBackup | MaintenanceJob::WeeklyBackup => {
                let kind = if job == MaintenanceJob::DailyBackup {
                    BackupKind::Daily
                } else {
                    BackupKind::Weekly
                };
                self.run_backup(kind, now).await.map(|record| {
                    let affected = usize::from(record.status == BackupStatus::Success);
                    let message = match record.error_message {
                        Some(reason) => format!("backup failed: {}", reason),
                        None => format!(
                            "backup written to {}",
                            record.file_path.unwrap_or_default()
                        ),
                    };
                    (affected, message)
                })
            }
            MaintenanceJob::CleanupLogs => self
                .cleanup_logs(now)
                .await
                .map(|count| (count, format!("{} log row(s) removed", count))),
            MaintenanceJob::CleanupBackups => self
                .cleanup_backups(now)
                .await
                .map(|count| (count, format!("{} backup(s) removed", count))),
            MaintenanceJob::ErrorReport => self.send_error_report(now).await.map(|report| {
                let message = if report.sent {
                    "error report sent".to_string()
                } else {
                    "no report needed".to_string()
                };
                (report.counts.total() as usize, message)
            }),
        };

        match result {
            Ok((affected, message)) => Ok(JobOutcome {
                job,
                affected,
                message,
            }),
            Err(err) => {
                error!("Maintenance job {} failed: {}", job.name(), err);
                self.record_error(
                    NewErrorLog::new(ErrorSeverity::High, job.name(), err.to_string())
                        .with_context(json!({ "job": job.name() })),
                )
                .await;
                Err(err)
            }
        }
    }

    fn list_backups(&self) -> Result<Vec<BackupRecord>> {
        self.backup_repository.list()
    }
}
