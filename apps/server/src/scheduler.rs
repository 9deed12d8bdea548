//! Background scheduler for maintenance jobs.
//!
//! Each job gets its own task that sleeps until the job's next wall-clock
//! time in UTC, runs it, and goes back to sleep. A failing job is logged by
//! the maintenance service and never stops its task.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eventcover_core::maintenance::{next_run_after, MaintenanceJob, MaintenanceServiceTrait};
use tokio::time::Duration;
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Starts one task per maintenance job.
pub fn start_maintenance_scheduler(state: Arc<AppState>) {
    for job in MaintenanceJob::ALL {
        let service = state.maintenance_service.clone();
        tokio::spawn(run_job_loop(job, service));
    }
    info!(
        "Maintenance scheduler started ({} jobs)",
        MaintenanceJob::ALL.len()
    );
}

/// Time to wait from `now` until `next`, zero if `next` has passed.
fn delay_until(next: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

async fn run_job_loop(job: MaintenanceJob, service: Arc<dyn MaintenanceServiceTrait>) {
    loop {
        let now = Utc::now();
        let next = next_run_after(&job.schedule(), now);
        info!("Next {} run at {}", job.name(), next.format("%Y-%m-%d %H:%M:%S UTC"));
        tokio::time::sleep(delay_until(next, now)).await;

        match service.run_job(job, Utc::now().naive_utc()).await {
            Ok(outcome) => info!("Job {} finished: {}", job.name(), outcome.message),
            Err(e) => warn!("Job {} failed: {}", job.name(), e),
        }
    }
}
