//! Repositories for database operations
//!
//! Each repository is a `Clone` struct owning the connection pool,
//! with hand-written SQL and explicit row mapping.

pub mod bike;
pub mod booking;
pub mod notification;
pub mod payment;
pub mod review;
pub mod user;

pub use bike::{BikeRepository, BikeSearchFilter};
pub use booking::BookingRepository;
pub use notification::NotificationRepository;
pub use payment::PaymentRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;
