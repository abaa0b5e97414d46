//! Integration tests for the HTTP surface
//!
//! The full-flow tests drive the router with `tower::ServiceExt` and
//! need both PostgreSQL and Redis running locally.

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rand::Rng;
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

use api::payment::{FixedGateway, GatewayOutcome};
use api::routes;
use api::state::AppState;
use ::common::cache::{RedisConfig, RedisPool};

use crate::common as helpers;

async fn test_app() -> Router {
    let pool = helpers::test_pool().await;
    let redis_config = RedisConfig::from_env().expect("redis config");
    let redis_pool = RedisPool::new(&redis_config).await.expect("redis pool");
    let state = AppState::new(
        pool,
        redis_pool,
        Arc::new(FixedGateway(GatewayOutcome::Approved)),
    );
    routes::create_router(state)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn register_payload(account_type: &str) -> Value {
    let mut rng = rand::thread_rng();
    let tag = helpers::unique("rider");
    json!({
        "username": tag,
        "email": format!("{}@example.com", tag),
        "phone": rng.gen_range(6_000_000_000u64..10_000_000_000u64).to_string(),
        "password": "Sup3rSecret",
        "full_name": "Test Rider",
        "city": "Bangalore",
        "license_number": format!("DL{}", rng.gen_range(10_000_000u64..100_000_000u64)),
        "account_type": account_type,
    })
}

async fn register_and_login(app: &Router, account_type: &str) -> (Value, String) {
    let payload = register_payload(account_type);
    let (status, user) = request(app, "POST", "/auth/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", user);

    let (status, body) = request(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({
            "username_or_email": payload["username"],
            "password": payload["password"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    let token = body["token"].as_str().expect("token").to_string();
    (user, token)
}

/// Decimal fields serialize as JSON strings; normalize for assertions.
fn decimal_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// The health check touches neither store, so a lazy pool is enough.
#[tokio::test]
async fn health_endpoint_reports_ok() {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&helpers::get_test_database_url())
        .expect("lazy pool");
    let redis_config = RedisConfig::from_env().expect("redis config");
    let redis_pool = RedisPool::new(&redis_config).await.expect("redis client");
    let state = AppState::new(
        pool,
        redis_pool,
        Arc::new(FixedGateway(GatewayOutcome::Approved)),
    );
    let app = routes::create_router(state);

    let (status, body) = request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[serial]
#[ignore = "requires running PostgreSQL and Redis instances"]
async fn protected_routes_require_a_session() {
    let app = test_app().await;

    let (status, _) = request(&app, "GET", "/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/bookings", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
#[ignore = "requires running PostgreSQL and Redis instances"]
async fn registration_reports_duplicates_per_field() {
    let app = test_app().await;

    let payload = register_payload("customer");
    let (status, _) = request(&app, "POST", "/auth/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same username, everything else fresh.
    let mut duplicate = register_payload("customer");
    duplicate["username"] = payload["username"].clone();
    let (status, body) = request(&app, "POST", "/auth/register", None, Some(duplicate)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username is already taken");

    // Same email.
    let mut duplicate = register_payload("customer");
    duplicate["email"] = payload["email"].clone();
    let (status, body) = request(&app, "POST", "/auth/register", None, Some(duplicate)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email is already registered");
}

#[tokio::test]
#[serial]
#[ignore = "requires running PostgreSQL and Redis instances"]
async fn marketplace_flow_from_listing_to_review() {
    let app = test_app().await;

    let (_, owner_token) = register_and_login(&app, "individual_owner").await;
    let (_, customer_token) = register_and_login(&app, "customer").await;

    // Customers cannot list bikes.
    let (status, _) = request(
        &app,
        "POST",
        "/bikes",
        Some(customer_token.as_str()),
        Some(json!({
            "name": "Classic 350", "brand": "Royal Enfield", "model": "Classic",
            "year": 2023, "bike_type": "cruiser", "fuel_type": "petrol",
            "registration_number": helpers::unique("KA01"),
            "hourly_rate": 40, "daily_rate": 500, "monthly_rate": 9000,
            "location": "Bangalore",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner lists a bike.
    let (status, bike) = request(
        &app,
        "POST",
        "/bikes",
        Some(owner_token.as_str()),
        Some(json!({
            "name": "Classic 350", "brand": "Royal Enfield", "model": "Classic",
            "year": 2023, "bike_type": "cruiser", "fuel_type": "petrol",
            "registration_number": helpers::unique("KA01"),
            "hourly_rate": 40, "daily_rate": 500, "monthly_rate": 9000,
            "location": "Bangalore",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create bike failed: {}", bike);
    let bike_id = bike["id"].as_str().expect("bike id").to_string();

    // Search is public.
    let (status, results) = request(&app, "GET", "/bikes?location=Bangalore", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(results.as_array().is_some());

    // The customer books two days.
    let (status, booking) = request(
        &app,
        "POST",
        "/bookings",
        Some(customer_token.as_str()),
        Some(json!({
            "bike_id": bike_id,
            "start_time": helpers::day(0),
            "end_time": helpers::day(2),
            "rate_plan": "daily",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "booking failed: {}", booking);
    assert_eq!(decimal_field(&booking["total_amount"]), "1000");
    let booking_id = booking["id"].as_str().expect("booking id").to_string();

    // Only the bike's owner confirms the handover.
    let confirm_uri = format!("/bookings/{}/confirm", booking_id);
    let (status, _) = request(&app, "POST", &confirm_uri, Some(customer_token.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(&app, "POST", &confirm_uri, Some(owner_token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/bookings/{}/start", booking_id),
        Some(owner_token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/bookings/{}/complete", booking_id),
        Some(owner_token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The completed booking authorizes exactly one review.
    let review_uri = format!("/bikes/{}/reviews", bike_id);
    let review_body = json!({
        "booking_id": booking_id,
        "rating": 5,
        "review_text": "Smooth ride, well maintained.",
    });
    let (status, _) = request(
        &app,
        "POST",
        &review_uri,
        Some(customer_token.as_str()),
        Some(review_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &app,
        "POST",
        &review_uri,
        Some(customer_token.as_str()),
        Some(review_body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You have already reviewed this bike");

    // The review aggregate landed on the bike.
    let (status, bike) = request(
        &app,
        "GET",
        &format!("/bikes/{}", bike_id),
        Some(customer_token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bike["average_rating"].as_f64(), Some(5.0));
    assert_eq!(bike["total_reviews"].as_i64(), Some(1));

    // The booking flow fanned notifications into the rider's inbox.
    let (status, body) = request(
        &app,
        "GET",
        "/notifications/unread-count",
        Some(customer_token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["unread_count"].as_i64().unwrap_or(0) > 0);
}
