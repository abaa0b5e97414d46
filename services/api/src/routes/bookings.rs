//! Booking routes
//!
//! Creation and the rider-side transitions (cancel, extend) belong to
//! the booking's user; the handover transitions (confirm, start,
//! complete) belong to the bike's owner. Admins may drive either side.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    booking::BookingRequest,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::Booking,
    state::AppState,
};

/// Request to lengthen a running rental
#[derive(Debug, Deserialize)]
pub struct ExtendBookingRequest {
    pub new_end_time: DateTime<Utc>,
}

/// Request a reservation
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<BookingRequest>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.engine.try_book(auth.id, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List the caller's own bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let bookings = state.booking_repository.list_by_user(auth.id).await?;
    Ok(Json(bookings))
}

/// Get a booking, visible to its rider, the bike's owner and admins
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let booking = load_booking(&state, id).await?;
    let bike = state
        .bike_repository
        .find_by_id(booking.bike_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bike not found".to_string()))?;

    if booking.user_id != auth.id && bike.owner_id != auth.id && !auth.is_admin {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(booking))
}

pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    authorize_bike_owner(&state, &auth, id).await?;
    let booking = state.engine.confirm(id).await?;
    Ok(Json(booking))
}

pub async fn start_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    authorize_bike_owner(&state, &auth, id).await?;
    let booking = state.engine.start(id).await?;
    Ok(Json(booking))
}

pub async fn complete_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    authorize_bike_owner(&state, &auth, id).await?;
    let booking = state.engine.complete(id).await?;
    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    authorize_rider(&state, &auth, id).await?;
    let booking = state.engine.cancel(id).await?;
    Ok(Json(booking))
}

pub async fn extend_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExtendBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize_rider(&state, &auth, id).await?;
    let booking = state.engine.extend(id, payload.new_end_time).await?;
    Ok(Json(booking))
}

async fn load_booking(state: &AppState, id: Uuid) -> ApiResult<Booking> {
    state
        .booking_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))
}

async fn authorize_rider(state: &AppState, auth: &AuthUser, booking_id: Uuid) -> ApiResult<()> {
    let booking = load_booking(state, booking_id).await?;
    if booking.user_id != auth.id && !auth.is_admin {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

async fn authorize_bike_owner(
    state: &AppState,
    auth: &AuthUser,
    booking_id: Uuid,
) -> ApiResult<()> {
    let booking = load_booking(state, booking_id).await?;
    let bike = state
        .bike_repository
        .find_by_id(booking.bike_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bike not found".to_string()))?;

    if bike.owner_id != auth.id && !auth.is_admin {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}
