//! Domain models for the marketplace service
//!
//! One module per entity. Cross-references between entities are plain
//! foreign-key fields; enums are stored as TEXT and mapped through
//! their `as_str`/`from_string` pairs.

pub mod bike;
pub mod booking;
pub mod notification;
pub mod payment;
pub mod review;
pub mod user;

pub use bike::{Bike, BikeStatus, BikeType, FuelType, NewBike, UpdateBike};
pub use booking::{Booking, BookingPaymentState, BookingStatus, NewBooking, RatePlan};
pub use notification::{NewNotification, Notification, NotificationStatus, NotificationType};
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentStatus};
pub use review::{NewReview, Review};
pub use user::{AccountType, NewUser, UpdateUserStatus, User, UserResponse, UserStatus};
