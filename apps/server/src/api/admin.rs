use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use eventcover_core::{
    logs::{ErrorLog, EventLog},
    maintenance::{BackupKind, BackupRecord, JobOutcome, MaintenanceJob},
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{CleanupResult, LogQuery},
};

/// Applies version retention to every policy.
#[utoipa::path(post, path = "/api/v1/admin/cleanup-policy-versions", responses((status = 200, body = CleanupResult)))]
pub async fn cleanup_policy_versions(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CleanupResult>> {
    let removed = state.policy_service.cleanup_all_policy_versions().await?;
    Ok(Json(CleanupResult { removed }))
}

/// Runs one maintenance job now, outside its schedule.
async fn run_job(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<JobOutcome>> {
    let job: MaintenanceJob = name.parse().map_err(ApiError::NotFound)?;
    let outcome = state
        .maintenance_service
        .run_job(job, Utc::now().naive_utc())
        .await?;
    Ok(Json(outcome))
}

async fn list_backups(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<BackupRecord>>> {
    Ok(Json(state.maintenance_service.list_backups()?))
}

async fn create_backup(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<BackupRecord>)> {
    let record = state
        .maintenance_service
        .run_backup(BackupKind::Manual, Utc::now().naive_utc())
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_event_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<Vec<EventLog>>> {
    Ok(Json(state.log_repository.list_events(query.limit())?))
}

async fn list_error_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<Vec<ErrorLog>>> {
    Ok(Json(state.log_repository.list_errors(query.limit())?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/cleanup-policy-versions",
            post(cleanup_policy_versions),
        )
        .route("/admin/jobs/{job}", post(run_job))
        .route("/admin/backups", get(list_backups).post(create_backup))
        .route("/admin/event-logs", get(list_event_logs))
        .route("/admin/error-logs", get(list_error_logs))
}
