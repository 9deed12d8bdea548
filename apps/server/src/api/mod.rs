use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    main_lib::AppState,
    models::{CleanupResult, FromQuoteRequest, HealthStatus, PremiumPreview},
};

pub mod admin;
pub mod health;
pub mod payments;
pub mod policies;
pub mod premiums;
pub mod quotes;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        premiums::preview_premiums,
        policies::create_from_quote,
        admin::cleanup_policy_versions
    ),
    components(schemas(HealthStatus, PremiumPreview, FromQuoteRequest, CleanupResult)),
    tags((name = "eventcover"))
)]
pub struct ApiDoc;

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins = config
        .cors_allow
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .merge(health::router())
        .merge(premiums::router())
        .merge(quotes::router())
        .merge(policies::router())
        .merge(payments::router())
        .merge(admin::router())
        .route("/openapi.json", get(|| async { Json(openapi) }));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
