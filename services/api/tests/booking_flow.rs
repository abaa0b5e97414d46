//! Integration tests for the booking engine and payment flow
//!
//! These tests run against a local PostgreSQL instance; see
//! `common::get_test_database_url` for the connection settings.

mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use serial_test::serial;

use api::booking::BookingEngine;
use api::error::ApiError;
use api::middleware::AuthUser;
use api::models::{
    AccountType, BookingPaymentState, BookingStatus, PaymentMethod, PaymentStatus,
};
use api::payment::{FixedGateway, GatewayOutcome, PaymentService};
use api::repositories::{BookingRepository, NotificationRepository, PaymentRepository};

use crate::common::{booking_engine, create_bike, create_user, daily_request, day, test_pool};

fn payment_service(pool: &sqlx::PgPool, outcome: GatewayOutcome) -> PaymentService {
    PaymentService::new(
        PaymentRepository::new(pool.clone()),
        BookingRepository::new(pool.clone()),
        NotificationRepository::new(pool.clone()),
        Arc::new(FixedGateway(outcome)),
    )
}

fn auth_for(user: &api::models::User) -> AuthUser {
    AuthUser {
        id: user.id,
        account_type: user.account_type,
        is_admin: user.is_admin,
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn adjacent_windows_book_but_overlaps_conflict() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider_a = create_user(&pool, AccountType::Customer).await;
    let rider_b = create_user(&pool, AccountType::Customer).await;
    let bike = create_bike(&pool, owner.id).await;

    // A books [day0, day0+2) at dailyRate=500.
    let booking_a = engine
        .try_book(rider_a.id, daily_request(bike.id, day(0), day(2)))
        .await
        .expect("booking A should succeed");
    assert_eq!(booking_a.total_amount, Decimal::from(1_000));
    assert_eq!(booking_a.status, BookingStatus::Pending);

    // Confirmed bookings block.
    engine.confirm(booking_a.id).await.expect("confirm A");

    // B overlaps A by one day and is rejected.
    let result = engine
        .try_book(rider_b.id, daily_request(bike.id, day(1), day(3)))
        .await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    // C is adjacent (starts exactly where A ends) and succeeds.
    let booking_c = engine
        .try_book(rider_b.id, daily_request(bike.id, day(2), day(4)))
        .await
        .expect("adjacent booking C should succeed");
    assert_eq!(booking_c.total_amount, Decimal::from(1_000));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn pending_bookings_do_not_block() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider = create_user(&pool, AccountType::Customer).await;
    let other = create_user(&pool, AccountType::Customer).await;
    let bike = create_bike(&pool, owner.id).await;

    let booking_a = engine
        .try_book(rider.id, daily_request(bike.id, day(0), day(2)))
        .await
        .expect("booking A");
    assert_eq!(booking_a.status, BookingStatus::Pending);

    // A never reached confirmation, so an overlapping request wins.
    engine
        .try_book(other.id, daily_request(bike.id, day(1), day(3)))
        .await
        .expect("overlapping booking should succeed while A is pending");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn empty_calendar_accepts_any_valid_window() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider = create_user(&pool, AccountType::Customer).await;

    for (start, end) in [(0, 1), (5, 35), (100, 102)] {
        let bike = create_bike(&pool, owner.id).await;
        engine
            .try_book(rider.id, daily_request(bike.id, day(start), day(end)))
            .await
            .expect("booking on an empty calendar should always succeed");
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn extend_into_conflict_leaves_booking_unmodified() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);
    let bookings = BookingRepository::new(pool.clone());

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider = create_user(&pool, AccountType::Customer).await;
    let other = create_user(&pool, AccountType::Customer).await;
    let bike = create_bike(&pool, owner.id).await;

    let booking_a = engine
        .try_book(rider.id, daily_request(bike.id, day(0), day(2)))
        .await
        .expect("booking A");
    engine.confirm(booking_a.id).await.expect("confirm A");
    engine.start(booking_a.id).await.expect("start A");

    let booking_c = engine
        .try_book(other.id, daily_request(bike.id, day(2), day(4)))
        .await
        .expect("booking C");
    engine.confirm(booking_c.id).await.expect("confirm C");

    // Extending A into C's confirmed window is rejected.
    let result = engine.extend(booking_a.id, day(3)).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    // A keeps its window and stays functionally active.
    let reloaded = bookings
        .find_by_id(booking_a.id)
        .await
        .unwrap()
        .expect("booking A still exists");
    assert_eq!(reloaded.end_time, day(2));
    assert_eq!(reloaded.status, BookingStatus::Active);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn extend_lengthens_window_and_still_completes() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider = create_user(&pool, AccountType::Customer).await;
    let bike = create_bike(&pool, owner.id).await;

    let booking = engine
        .try_book(rider.id, daily_request(bike.id, day(0), day(2)))
        .await
        .expect("booking");
    engine.confirm(booking.id).await.expect("confirm");
    engine.start(booking.id).await.expect("start");

    let extended = engine.extend(booking.id, day(3)).await.expect("extend");
    assert_eq!(extended.status, BookingStatus::Extended);
    assert_eq!(extended.end_time, day(3));

    // Shortening is rejected.
    let result = engine.extend(booking.id, day(1)).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    let completed = engine.complete(booking.id).await.expect("complete");
    assert_eq!(completed.status, BookingStatus::Completed);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn transitions_enforce_their_preconditions() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider = create_user(&pool, AccountType::Customer).await;
    let bike = create_bike(&pool, owner.id).await;

    let booking = engine
        .try_book(rider.id, daily_request(bike.id, day(0), day(2)))
        .await
        .expect("booking");

    // Completing a pending booking skips the machine.
    let result = engine.complete(booking.id).await;
    assert!(matches!(result, Err(ApiError::InvalidState(_))));

    // Starting a pending booking is rejected too.
    let result = engine.start(booking.id).await;
    assert!(matches!(result, Err(ApiError::InvalidState(_))));

    engine.confirm(booking.id).await.expect("confirm");
    engine.start(booking.id).await.expect("start");

    // A running rental cannot be cancelled.
    let result = engine.cancel(booking.id).await;
    assert!(matches!(result, Err(ApiError::InvalidState(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn unknown_booking_is_not_found() {
    let pool = test_pool().await;
    let engine: BookingEngine = booking_engine(&pool);

    let result = engine.confirm(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn payment_success_marks_booking_paid() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);
    let payments = payment_service(&pool, GatewayOutcome::Approved);
    let bookings = BookingRepository::new(pool.clone());

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider = create_user(&pool, AccountType::Customer).await;
    let bike = create_bike(&pool, owner.id).await;
    let auth = auth_for(&rider);

    let booking = engine
        .try_book(rider.id, daily_request(bike.id, day(0), day(2)))
        .await
        .expect("booking");

    let payment = payments
        .create(&auth, booking.id, PaymentMethod::Upi)
        .await
        .expect("create payment");
    assert_eq!(payment.amount, booking.total_amount);
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(payment.transaction_id.starts_with("TXN_"));

    // A second open attempt for the same booking is rejected.
    let result = payments.create(&auth, booking.id, PaymentMethod::Cash).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    let processed = payments
        .process(&auth, &payment.transaction_id)
        .await
        .expect("process payment");
    assert_eq!(processed.status, PaymentStatus::Success);
    assert!(processed.paid_at.is_some());

    let reloaded = bookings.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(reloaded.payment_state, BookingPaymentState::Paid);

    // Processing is terminal for the attempt.
    let result = payments.process(&auth, &payment.transaction_id).await;
    assert!(matches!(result, Err(ApiError::InvalidState(_))));

    // Refund flows through, once.
    let refunded = payments
        .refund(&payment.transaction_id, "customer cancelled trip")
        .await
        .expect("refund");
    assert_eq!(refunded.status, PaymentStatus::Refunded);

    let result = payments
        .refund(&payment.transaction_id, "again")
        .await;
    assert!(matches!(result, Err(ApiError::InvalidState(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn failed_payment_can_be_retried() {
    let pool = test_pool().await;
    let engine = booking_engine(&pool);
    let declining = payment_service(&pool, GatewayOutcome::Declined);
    let approving = payment_service(&pool, GatewayOutcome::Approved);
    let bookings = BookingRepository::new(pool.clone());

    let owner = create_user(&pool, AccountType::IndividualOwner).await;
    let rider = create_user(&pool, AccountType::Customer).await;
    let bike = create_bike(&pool, owner.id).await;
    let auth = auth_for(&rider);

    let booking = engine
        .try_book(rider.id, daily_request(bike.id, day(0), day(2)))
        .await
        .expect("booking");

    let payment = declining
        .create(&auth, booking.id, PaymentMethod::Wallet)
        .await
        .expect("create payment");
    let failed = declining
        .process(&auth, &payment.transaction_id)
        .await
        .expect("process payment");
    assert_eq!(failed.status, PaymentStatus::Failed);
    assert!(failed.failure_reason.is_some());

    let reloaded = bookings.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(reloaded.payment_state, BookingPaymentState::Failed);

    // The failed attempt stays for audit; a fresh attempt is allowed.
    let retry = approving
        .create(&auth, booking.id, PaymentMethod::Upi)
        .await
        .expect("retry after failure");
    assert_ne!(retry.transaction_id, payment.transaction_id);

    let processed = approving
        .process(&auth, &retry.transaction_id)
        .await
        .expect("process retry");
    assert_eq!(processed.status, PaymentStatus::Success);
}
