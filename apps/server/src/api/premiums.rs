use std::sync::Arc;

use axum::{extract::Query, routing::get, Json, Router};

use crate::{
    main_lib::AppState,
    models::{PremiumPreview, PremiumPreviewQuery},
};

/// Prices a coverage selection without saving anything.
#[utoipa::path(get, path = "/api/v1/premiums/preview", responses((status = 200, body = PremiumPreview)))]
pub async fn preview_premiums(Query(query): Query<PremiumPreviewQuery>) -> Json<PremiumPreview> {
    Json(PremiumPreview::from(query))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/premiums/preview", get(preview_premiums))
}
