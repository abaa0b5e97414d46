//! Payment routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::PaymentMethod,
    state::AppState,
};

/// Request to open a payment attempt for a booking
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub booking_id: Uuid,
    pub method: PaymentMethod,
}

/// Request to refund a settled payment
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub reason: String,
}

pub async fn create_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreatePaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let payment = state
        .payment_service
        .create(&auth, payload.booking_id, payload.method)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn process_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(transaction_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let payment = state
        .payment_service
        .process(&auth, &transaction_id)
        .await?;
    Ok(Json(payment))
}

/// Refund a payment. Admin-only.
pub async fn refund_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(transaction_id): Path<String>,
    Json(payload): Json<RefundRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let payment = state
        .payment_service
        .refund(&transaction_id, &payload.reason)
        .await?;
    Ok(Json(payment))
}
