//! Booking engine
//!
//! Admission ("is this window bookable, and at what price") and the
//! caller-driven status transitions. The conflict check and the insert
//! run inside one transaction in the booking repository, behind a
//! row lock on the bike, so two concurrent requests for overlapping
//! windows cannot both succeed.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::booking::pricing::{self, AddOns, RateCard};
use crate::booking::window::Window;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Bike, BikeStatus, Booking, BookingStatus, NewBooking, NewNotification, RatePlan,
};
use crate::repositories::{BikeRepository, BookingRepository, NotificationRepository};

/// Reservation request accepted by [`BookingEngine::try_book`].
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub bike_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rate_plan: RatePlan,
    #[serde(default)]
    pub add_ons: AddOns,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub notes: Option<String>,
}

/// Booking rule engine
#[derive(Clone)]
pub struct BookingEngine {
    bookings: BookingRepository,
    bikes: BikeRepository,
    notifications: NotificationRepository,
}

impl BookingEngine {
    pub fn new(
        bookings: BookingRepository,
        bikes: BikeRepository,
        notifications: NotificationRepository,
    ) -> Self {
        Self {
            bookings,
            bikes,
            notifications,
        }
    }

    /// Decide bookability and price for a requested reservation.
    ///
    /// Validates the window, quotes the price from the bike's rate
    /// card, then atomically checks for overlapping blocking bookings
    /// and inserts the new booking in `Pending` state. On a scheduling
    /// conflict nothing is persisted.
    pub async fn try_book(&self, user_id: Uuid, request: BookingRequest) -> ApiResult<Booking> {
        let window = Window::new(request.start_time, request.end_time)?;
        let bike = self.load_bike(request.bike_id).await?;

        if matches!(
            bike.status,
            BikeStatus::Maintenance | BikeStatus::OutOfService
        ) {
            return Err(ApiError::Conflict(
                "Bike is currently out of service".to_string(),
            ));
        }

        let card = RateCard {
            hourly: bike.hourly_rate,
            daily: bike.daily_rate,
            monthly: bike.monthly_rate,
        };
        let total_amount = pricing::quote(&card, request.rate_plan, &window, request.add_ons)?;

        let new_booking = NewBooking {
            bike_id: bike.id,
            user_id,
            start_time: window.start(),
            end_time: window.end(),
            rate_plan: request.rate_plan,
            total_amount,
            pickup_location: request.pickup_location,
            dropoff_location: request.dropoff_location,
            notes: request.notes,
            helmet_requested: request.add_ons.helmet,
            navigation_requested: request.add_ons.navigation,
            helmet_fee: if request.add_ons.helmet {
                pricing::helmet_fee()
            } else {
                rust_decimal::Decimal::ZERO
            },
            navigation_fee: if request.add_ons.navigation {
                pricing::navigation_fee()
            } else {
                rust_decimal::Decimal::ZERO
            },
        };

        let booking = self
            .bookings
            .create_in_window(&new_booking)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Bike is not available for the selected time period".to_string())
            })?;

        info!(
            "Created booking {} for bike {} at {}",
            booking.id, booking.bike_id, booking.total_amount
        );
        Ok(booking)
    }

    /// Pending -> Confirmed. Fans out a confirmation notification.
    pub async fn confirm(&self, booking_id: Uuid) -> ApiResult<Booking> {
        let booking = self.load(booking_id).await?;
        if !booking.status.can_confirm() {
            return Err(ApiError::InvalidState(
                "Can only confirm pending bookings".to_string(),
            ));
        }

        let updated = self
            .bookings
            .update_status(booking_id, BookingStatus::Confirmed)
            .await?;

        let bike = self.load_bike(booking.bike_id).await?;
        self.notifications
            .create(&NewNotification::booking_confirmed(
                booking.user_id,
                &bike.name,
            ))
            .await?;

        info!("Confirmed booking {}", booking_id);
        Ok(updated)
    }

    /// Confirmed -> Active. The bike is marked `Booked` for the
    /// duration of the rental.
    pub async fn start(&self, booking_id: Uuid) -> ApiResult<Booking> {
        let booking = self.load(booking_id).await?;
        if !booking.status.can_start() {
            return Err(ApiError::InvalidState(
                "Can only start confirmed bookings".to_string(),
            ));
        }

        let updated = self
            .bookings
            .update_status(booking_id, BookingStatus::Active)
            .await?;
        self.bikes
            .update_status(booking.bike_id, BikeStatus::Booked)
            .await?;

        let bike = self.load_bike(booking.bike_id).await?;
        self.notifications
            .create(&NewNotification::ride_reminder(
                booking.user_id,
                &bike.name,
                booking.start_time,
            ))
            .await?;

        info!("Started booking {}", booking_id);
        Ok(updated)
    }

    /// Active/Extended -> Completed (terminal). The bike returns to
    /// `Available` and the rider is asked for a review.
    pub async fn complete(&self, booking_id: Uuid) -> ApiResult<Booking> {
        let booking = self.load(booking_id).await?;
        if !booking.status.can_complete() {
            return Err(ApiError::InvalidState(
                "Can only complete active bookings".to_string(),
            ));
        }

        let updated = self
            .bookings
            .update_status(booking_id, BookingStatus::Completed)
            .await?;
        self.bikes
            .update_status(booking.bike_id, BikeStatus::Available)
            .await?;

        let bike = self.load_bike(booking.bike_id).await?;
        self.notifications
            .create(&NewNotification::review_request(booking.user_id, &bike.name))
            .await?;

        info!("Completed booking {}", booking_id);
        Ok(updated)
    }

    /// Pending/Confirmed -> Cancelled. A running rental cannot be
    /// cancelled.
    pub async fn cancel(&self, booking_id: Uuid) -> ApiResult<Booking> {
        let booking = self.load(booking_id).await?;
        if !booking.status.can_cancel() {
            return Err(ApiError::InvalidState(
                "Cannot cancel an active booking".to_string(),
            ));
        }

        let updated = self
            .bookings
            .update_status(booking_id, BookingStatus::Cancelled)
            .await?;

        let bike = self.load_bike(booking.bike_id).await?;
        self.notifications
            .create(&NewNotification::booking_cancelled(
                booking.user_id,
                &bike.name,
            ))
            .await?;

        info!("Cancelled booking {}", booking_id);
        Ok(updated)
    }

    /// Lengthen a running rental. Re-runs the conflict check against
    /// the new end time, excluding the booking's own interval, inside
    /// the same locked transaction as the update. On conflict the
    /// booking is left unmodified.
    pub async fn extend(&self, booking_id: Uuid, new_end_time: DateTime<Utc>) -> ApiResult<Booking> {
        let booking = self.load(booking_id).await?;
        if !booking.status.can_extend() {
            return Err(ApiError::InvalidState(
                "Can only extend active bookings".to_string(),
            ));
        }
        if new_end_time <= booking.end_time {
            return Err(ApiError::Validation(
                "New end time must be after current end time".to_string(),
            ));
        }

        let updated = self
            .bookings
            .extend_in_window(booking_id, booking.bike_id, booking.start_time, new_end_time)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict(
                    "Bike is not available for the extended time period".to_string(),
                )
            })?;

        info!("Extended booking {} to {}", booking_id, new_end_time);
        Ok(updated)
    }

    async fn load(&self, booking_id: Uuid) -> ApiResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))
    }

    async fn load_bike(&self, bike_id: Uuid) -> ApiResult<Bike> {
        self.bikes
            .find_by_id(bike_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Bike not found".to_string()))
    }
}
