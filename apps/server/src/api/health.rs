use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::{error::ApiResult, main_lib::AppState, models::HealthStatus};

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health", body = HealthStatus)))]
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Ready once the database answers a read.
#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready", body = HealthStatus)))]
pub async fn readyz(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthStatus>> {
    state.log_repository.list_events(1)?;
    Ok(Json(HealthStatus {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
