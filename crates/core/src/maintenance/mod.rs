//! Maintenance module - backups, log cleanup, quote expiry, and error
//! reports, plus the wall-clock schedule each job runs on.

mod maintenance_model;
mod maintenance_service;
mod maintenance_traits;
mod schedule;


pub use maintenance_model::{
    BackupArtifact, BackupKind, BackupRecord, BackupStatus, ErrorReport, JobOutcome,
    MaintenanceJob, MaintenanceSettings, NewBackupRecord,
};
pub use maintenance_service::MaintenanceService;
pub use maintenance_traits::{BackupRepositoryTrait, MaintenanceServiceTrait};
pub use schedule::{next_run_after, Schedule};
