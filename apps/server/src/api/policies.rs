use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use eventcover_core::policies::{NewPolicy, Policy, PolicyUpdate, PolicyVersionSummary, PolicyView};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{FromQuoteRequest, PolicyCreated},
};

/// Converts a quote into a policy on an administrator's request.
#[utoipa::path(
    post,
    path = "/api/v1/policies/from-quote",
    request_body = FromQuoteRequest,
    responses(
        (status = 201, description = "Policy created"),
        (status = 400, description = "Quote already converted, or admin quote without forceConvert"),
        (status = 404, description = "Quote not found")
    )
)]
pub async fn create_from_quote(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FromQuoteRequest>,
) -> ApiResult<(StatusCode, Json<PolicyCreated>)> {
    let outcome = state
        .policy_service
        .create_from_quote(&body.quote_number, body.force_convert)
        .await?;
    Ok((StatusCode::CREATED, Json(PolicyCreated::from(outcome))))
}

async fn list_policies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<PolicyView>>> {
    Ok(Json(state.policy_service.list_policies()?))
}

async fn create_policy(
    State(state): State<Arc<AppState>>,
    Json(new_policy): Json<NewPolicy>,
) -> ApiResult<(StatusCode, Json<Policy>)> {
    let policy = state.policy_service.create_policy(new_policy).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

async fn get_policy(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PolicyView>> {
    Ok(Json(state.policy_service.get_policy(&id)?))
}

/// Saves a version of the current state, then applies the update.
async fn update_policy(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PolicyUpdate>,
) -> ApiResult<Json<PolicyView>> {
    let view = state.policy_service.update_policy(&id, update).await?;
    Ok(Json(view))
}

async fn delete_policy(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.policy_service.delete_policy(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_versions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PolicyVersionSummary>>> {
    Ok(Json(state.policy_service.list_versions(&id)?))
}

async fn download_version(
    Path((id, version_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let document = state.policy_service.download_version(&id, &version_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/policies", get(list_policies).post(create_policy))
        .route("/policies/from-quote", post(create_from_quote))
        .route(
            "/policies/{id}",
            get(get_policy).put(update_policy).delete(delete_policy),
        )
        .route("/policies/{id}/versions", get(list_versions))
        .route(
            "/policies/{id}/versions/{version_id}/download",
            get(download_version),
        )
}
