//! Session middleware
//!
//! Resolves the bearer token to an `AuthUser` and inserts it into the
//! request extensions. The user must still exist and be `Active`.

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{AccountType, UserStatus},
    state::AppState,
};

/// Authenticated caller identity
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub account_type: AccountType,
    pub is_admin: bool,
}

impl AuthUser {
    /// Reject callers whose account type cannot list bikes.
    pub fn require_owner_account(&self) -> Result<(), ApiError> {
        if self.account_type.is_owner() || self.is_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Reject non-admin callers.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin { Ok(()) } else { Err(ApiError::Forbidden) }
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let user_id = state
        .sessions
        .resolve(token)
        .await
        .map_err(|e| {
            error!("Failed to resolve session: {}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::Unauthorized)?;

    let user = state
        .user_repository
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load session user: {}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::Unauthorized)?;

    if user.status != UserStatus::Active {
        return Err(ApiError::Unauthorized);
    }

    let auth_user = AuthUser {
        id: user.id,
        account_type: user.account_type,
        is_admin: user.is_admin,
    };

    req.extensions_mut().insert(auth_user);

    let response = next.run(req).await;

    Ok(response)
}
