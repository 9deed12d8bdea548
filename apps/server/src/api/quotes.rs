use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use eventcover_core::quotes::{NewQuote, Quote, QuoteUpdate};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{QuoteCreated, QuoteQuery},
};

async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(new_quote): Json<NewQuote>,
) -> ApiResult<(StatusCode, Json<QuoteCreated>)> {
    let creation = state.quote_service.create_quote(new_quote).await?;
    Ok((StatusCode::CREATED, Json(QuoteCreated::from(creation))))
}

async fn find_quotes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> ApiResult<Json<Vec<Quote>>> {
    let lookup = query.lookup().ok_or_else(|| {
        ApiError::BadRequest("Provide quoteNumber, id, email or allQuotes=true".to_string())
    })?;
    let quotes = state.quote_service.find_quotes(lookup)?;
    Ok(Json(quotes))
}

async fn update_quote(
    Path(quote_number): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<QuoteUpdate>,
) -> ApiResult<Json<Quote>> {
    let quote = state.quote_service.update_quote(&quote_number, update).await?;
    Ok(Json(quote))
}

async fn delete_quote(
    Path(quote_number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.quote_service.delete_quote(&quote_number).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes", get(find_quotes).post(create_quote))
        .route("/quotes/{quote_number}", put(update_quote).delete(delete_quote))
}
