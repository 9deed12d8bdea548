use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use eventcover_core::payments::{
    GatewayPayment, ManualPayment, Payment, PaymentFilter, PaymentReceipt,
};

use crate::{error::ApiResult, main_lib::AppState};

/// Records a manual payment. A successful payment for a quote converts it.
async fn record_payment(
    State(state): State<Arc<AppState>>,
    Json(payment): Json<ManualPayment>,
) -> ApiResult<(StatusCode, Json<PaymentReceipt>)> {
    let receipt = state.payment_service.record_payment(payment).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn charge_card(
    State(state): State<Arc<AppState>>,
    Json(payment): Json<GatewayPayment>,
) -> ApiResult<(StatusCode, Json<PaymentReceipt>)> {
    let receipt = state.payment_service.charge_card(payment).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list_payments(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PaymentFilter>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payment_service.list_payments(&filter)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payment", post(record_payment))
        .route("/payment/authorize-net", post(charge_card))
        .route("/payments", get(list_payments))
}
