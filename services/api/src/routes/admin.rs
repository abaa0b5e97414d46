//! Admin routes for platform moderation

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{AccountType, BikeStatus, UpdateUserStatus, UserResponse},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub account_type: Option<AccountType>,
}

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBikeStatusRequest {
    pub status: BikeStatus,
}

/// Platform-wide counters and revenue
pub async fn platform_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let active_users = state.user_repository.count_active().await?;
    let available_bikes = state.bike_repository.count_available().await?;
    let completed_bookings = state.booking_repository.count_completed().await?;
    let total_revenue = state.payment_service.total_revenue().await?;

    Ok(Json(json!({
        "active_users": active_users,
        "available_bikes": available_bikes,
        "completed_bookings": completed_bookings,
        "total_revenue": total_revenue,
    })))
}

/// List users, optionally filtered by account type
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let users = match query.account_type {
        Some(account_type) => {
            state
                .user_repository
                .list_by_account_type(account_type)
                .await?
        }
        None => state.user_repository.list_all().await?,
    };
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(users))
}

/// Sum of successful payments, optionally bounded by a date range
pub async fn revenue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RevenueQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let total_revenue = match (query.start, query.end) {
        (Some(start), Some(end)) => state.payment_service.revenue_between(start, end).await?,
        _ => state.payment_service.total_revenue().await?,
    };

    Ok(Json(json!({"total_revenue": total_revenue})))
}

/// Force a bike's listing status
pub async fn update_bike_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBikeStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let bike = state
        .bike_repository
        .update_status(id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bike not found".to_string()))?;

    Ok(Json(bike))
}

/// Toggle a user's account status
pub async fn update_user_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatus>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let user = state
        .user_repository
        .update_status(id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
