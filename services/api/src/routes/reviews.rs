//! Review routes
//!
//! A review is authorized by a completed booking of the reviewer's,
//! and a user may review a bike at most once. Every mutation
//! recomputes the bike's running rating aggregate.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{BookingStatus, NewReview},
    state::AppState,
    validation,
};

/// Request to review a bike
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
}

/// Request to edit an existing review
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: i32,
    pub review_text: Option<String>,
}

pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(bike_id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_rating(payload.rating).map_err(ApiError::Validation)?;

    let booking = state
        .booking_repository
        .find_by_id(payload.booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    if booking.user_id != auth.id {
        return Err(ApiError::Forbidden);
    }
    if booking.bike_id != bike_id {
        return Err(ApiError::Validation(
            "Booking does not reference this bike".to_string(),
        ));
    }
    if booking.status != BookingStatus::Completed {
        return Err(ApiError::InvalidState(
            "You can only review bikes after completing the booking".to_string(),
        ));
    }

    if state
        .review_repository
        .exists_for_user_and_bike(auth.id, bike_id)
        .await?
    {
        return Err(ApiError::Conflict(
            "You have already reviewed this bike".to_string(),
        ));
    }

    let new_review = NewReview {
        user_id: auth.id,
        bike_id,
        booking_id: payload.booking_id,
        rating: payload.rating,
        review_text: payload.review_text,
    };
    let review = state.review_repository.create(&new_review).await?;
    state.bike_repository.recompute_rating(bike_id).await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// List a bike's reviews
pub async fn list_bike_reviews(
    State(state): State<AppState>,
    Path(bike_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state
        .bike_repository
        .find_by_id(bike_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bike not found".to_string()))?;

    let reviews = state.review_repository.list_by_bike(bike_id).await?;
    Ok(Json(reviews))
}

/// List the caller's own reviews
pub async fn my_reviews(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let reviews = state.review_repository.list_by_user(auth.id).await?;
    Ok(Json(reviews))
}

pub async fn update_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_rating(payload.rating).map_err(ApiError::Validation)?;

    let review = state
        .review_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    if review.user_id != auth.id && !auth.is_admin {
        return Err(ApiError::Forbidden);
    }

    let updated = state
        .review_repository
        .update(id, payload.rating, payload.review_text.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;
    state.bike_repository.recompute_rating(review.bike_id).await?;

    Ok(Json(updated))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let review = state
        .review_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    if review.user_id != auth.id && !auth.is_admin {
        return Err(ApiError::Forbidden);
    }

    state.review_repository.delete(id).await?;
    state.bike_repository.recompute_rating(review.bike_id).await?;

    Ok(Json(json!({"message": "Review deleted"})))
}
