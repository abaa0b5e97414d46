//! HTTP routes for the marketplace service
//!
//! Handlers validate input, run the role checks for the caller's
//! account type, delegate to the repositories and services, and map
//! domain errors to responses. Everything except the health check,
//! registration, login and bike search requires a session.

pub mod admin;
pub mod auth;
pub mod bikes;
pub mod bookings;
pub mod notifications;
pub mod payments;
pub mod reviews;

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/bikes", post(bikes::create_bike))
        .route("/bikes/mine", get(bikes::my_bikes))
        .route(
            "/bikes/:id",
            get(bikes::get_bike)
                .put(bikes::update_bike)
                .delete(bikes::delete_bike),
        )
        .route(
            "/bikes/:id/reviews",
            get(reviews::list_bike_reviews).post(reviews::create_review),
        )
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::my_bookings),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/confirm", post(bookings::confirm_booking))
        .route("/bookings/:id/start", post(bookings::start_booking))
        .route("/bookings/:id/complete", post(bookings::complete_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/bookings/:id/extend", post(bookings::extend_booking))
        .route("/payments", post(payments::create_payment))
        .route(
            "/payments/:transaction_id/process",
            post(payments::process_payment),
        )
        .route(
            "/payments/:transaction_id/refund",
            post(payments::refund_payment),
        )
        .route("/reviews/mine", get(reviews::my_reviews))
        .route(
            "/reviews/:id",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:id/read", post(notifications::mark_read))
        .route("/admin/stats", get(admin::platform_stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/revenue", get(admin::revenue))
        .route("/admin/bikes/:id/status", put(admin::update_bike_status))
        .route("/admin/users/:id/status", put(admin::update_user_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/bikes", get(bikes::search_bikes))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api",
    }))
}
