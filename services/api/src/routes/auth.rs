//! Registration, login and session routes

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{AccountType, NewUser, UserResponse, UserStatus},
    state::AppState,
    validation,
};

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub full_name: String,
    pub city: Option<String>,
    pub license_number: String,
    pub account_type: AccountType,
}

/// Request for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Register a new user. Duplicate unique fields are pre-checked and
/// reported per-field.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_username(&payload.username).map_err(ApiError::Validation)?;
    validation::validate_email(&payload.email).map_err(ApiError::Validation)?;
    validation::validate_phone(&payload.phone).map_err(ApiError::Validation)?;
    validation::validate_password(&payload.password).map_err(ApiError::Validation)?;
    validation::validate_license(&payload.license_number).map_err(ApiError::Validation)?;
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::Validation("Full name is required".to_string()));
    }

    if state
        .user_repository
        .exists_by_username(&payload.username)
        .await?
    {
        return Err(ApiError::Conflict("Username is already taken".to_string()));
    }
    if state.user_repository.exists_by_email(&payload.email).await? {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }
    if state.user_repository.exists_by_phone(&payload.phone).await? {
        return Err(ApiError::Conflict(
            "Phone number is already registered".to_string(),
        ));
    }
    if state
        .user_repository
        .exists_by_license(&payload.license_number)
        .await?
    {
        return Err(ApiError::Conflict(
            "License number is already registered".to_string(),
        ));
    }

    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        phone: payload.phone,
        password: payload.password,
        full_name: payload.full_name,
        city: payload.city,
        license_number: payload.license_number,
        account_type: payload.account_type,
    };
    let user = state.user_repository.create(&new_user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Log in with username or email. Only active accounts may log in;
/// the response carries the opaque session token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_username_or_email(&payload.username_or_email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !state
        .user_repository
        .verify_password(&user, &payload.password)
        .await?
    {
        return Err(ApiError::Unauthorized);
    }

    if user.status != UserStatus::Active {
        return Err(ApiError::Unauthorized);
    }

    let token = state.sessions.create(user.id).await?;

    Ok(Json(json!({
        "token": token,
        "user": UserResponse::from(user),
    })))
}

/// Destroy the caller's session
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    state.sessions.destroy(token).await?;

    Ok(Json(json!({"message": "Logged out"})))
}

/// Return the caller's own profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse::from(user)))
}
