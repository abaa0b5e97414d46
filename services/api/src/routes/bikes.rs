//! Catalog routes

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{Bike, BikeType, FuelType, NewBike, UpdateBike},
    repositories::BikeSearchFilter,
    state::AppState,
};

/// Request for listing a bike
#[derive(Debug, Deserialize)]
pub struct CreateBikeRequest {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub bike_type: BikeType,
    pub fuel_type: FuelType,
    pub registration_number: String,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub monthly_rate: Decimal,
    pub location: String,
    pub description: Option<String>,
}

/// Search available bikes. Public; any combination of filters.
pub async fn search_bikes(
    State(state): State<AppState>,
    Query(filter): Query<BikeSearchFilter>,
) -> ApiResult<impl IntoResponse> {
    let bikes = state.bike_repository.search(&filter).await?;
    Ok(Json(bikes))
}

/// List a bike for rent. Owner accounts only.
pub async fn create_bike(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateBikeRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_owner_account()?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Bike name is required".to_string()));
    }
    if payload.location.trim().is_empty() {
        return Err(ApiError::Validation("Location is required".to_string()));
    }
    if payload.registration_number.trim().is_empty() {
        return Err(ApiError::Validation(
            "Registration number is required".to_string(),
        ));
    }
    for rate in [
        payload.hourly_rate,
        payload.daily_rate,
        payload.monthly_rate,
    ] {
        if rate <= Decimal::ZERO {
            return Err(ApiError::Validation("Rates must be positive".to_string()));
        }
    }

    if state
        .bike_repository
        .exists_by_registration(&payload.registration_number)
        .await?
    {
        return Err(ApiError::Conflict(
            "Registration number is already listed".to_string(),
        ));
    }

    let new_bike = NewBike {
        name: payload.name,
        brand: payload.brand,
        model: payload.model,
        year: payload.year,
        bike_type: payload.bike_type,
        fuel_type: payload.fuel_type,
        registration_number: payload.registration_number,
        hourly_rate: payload.hourly_rate,
        daily_rate: payload.daily_rate,
        monthly_rate: payload.monthly_rate,
        location: payload.location,
        description: payload.description,
        owner_id: auth.id,
    };
    let bike = state.bike_repository.create(&new_bike).await?;

    Ok((StatusCode::CREATED, Json(bike)))
}

/// Get a bike by ID
pub async fn get_bike(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let bike = load_bike(&state, id).await?;
    Ok(Json(bike))
}

/// Update a bike listing. Only its owner or an admin may edit it.
pub async fn update_bike(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateBike>,
) -> ApiResult<impl IntoResponse> {
    let bike = load_bike(&state, id).await?;
    if bike.owner_id != auth.id && !auth.is_admin {
        return Err(ApiError::Forbidden);
    }

    for rate in [update.hourly_rate, update.daily_rate, update.monthly_rate]
        .into_iter()
        .flatten()
    {
        if rate <= Decimal::ZERO {
            return Err(ApiError::Validation("Rates must be positive".to_string()));
        }
    }

    let updated = state
        .bike_repository
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bike not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete a bike listing. Listings with booking history are kept.
pub async fn delete_bike(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let bike = load_bike(&state, id).await?;
    if bike.owner_id != auth.id && !auth.is_admin {
        return Err(ApiError::Forbidden);
    }

    if state.booking_repository.count_by_bike(id).await? > 0 {
        return Err(ApiError::Conflict(
            "Bike has bookings and cannot be deleted".to_string(),
        ));
    }

    state.bike_repository.delete(id).await?;

    Ok(Json(json!({"message": "Bike deleted"})))
}

/// List the caller's own bikes
pub async fn my_bikes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let bikes = state.bike_repository.list_by_owner(auth.id).await?;
    Ok(Json(bikes))
}

async fn load_bike(state: &AppState, id: Uuid) -> ApiResult<Bike> {
    state
        .bike_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bike not found".to_string()))
}
