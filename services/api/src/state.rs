//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use common::cache::RedisPool;

use crate::booking::BookingEngine;
use crate::payment::{PaymentGateway, PaymentService};
use crate::repositories::{
    BikeRepository, BookingRepository, NotificationRepository, PaymentRepository,
    ReviewRepository, UserRepository,
};
use crate::session::SessionManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub bike_repository: BikeRepository,
    pub booking_repository: BookingRepository,
    pub payment_repository: PaymentRepository,
    pub review_repository: ReviewRepository,
    pub notification_repository: NotificationRepository,
    pub sessions: SessionManager,
    pub engine: BookingEngine,
    pub payment_service: PaymentService,
}

impl AppState {
    /// Wire up repositories, the booking engine and the payment
    /// service over one pool. The gateway is injected so binaries use
    /// the simulated one and tests a fixed one.
    pub fn new(pool: PgPool, redis_pool: RedisPool, gateway: Arc<dyn PaymentGateway>) -> Self {
        let user_repository = UserRepository::new(pool.clone());
        let bike_repository = BikeRepository::new(pool.clone());
        let booking_repository = BookingRepository::new(pool.clone());
        let payment_repository = PaymentRepository::new(pool.clone());
        let review_repository = ReviewRepository::new(pool.clone());
        let notification_repository = NotificationRepository::new(pool.clone());

        let engine = BookingEngine::new(
            booking_repository.clone(),
            bike_repository.clone(),
            notification_repository.clone(),
        );
        let payment_service = PaymentService::new(
            payment_repository.clone(),
            booking_repository.clone(),
            notification_repository.clone(),
            gateway,
        );
        let sessions = SessionManager::new(redis_pool);

        AppState {
            db_pool: pool,
            user_repository,
            bike_repository,
            booking_repository,
            payment_repository,
            review_repository,
            notification_repository,
            sessions,
            engine,
            payment_service,
        }
    }
}
