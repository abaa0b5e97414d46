//! Booking model and its status machine
//!
//! The status machine lives on `BookingStatus` so transition rules can
//! be unit-tested without touching the database. `Extended` is a stored
//! status of its own but behaves as an active rental: it blocks
//! overlapping bookings and is the only state besides `Active` that can
//! be completed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rate plan selecting which per-unit rate and rounding rule prices a
/// booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePlan {
    Hourly,
    Daily,
    Monthly,
    Subscription,
}

impl RatePlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatePlan::Hourly => "hourly",
            RatePlan::Daily => "daily",
            RatePlan::Monthly => "monthly",
            RatePlan::Subscription => "subscription",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "daily" => RatePlan::Daily,
            "monthly" => RatePlan::Monthly,
            "subscription" => RatePlan::Subscription,
            _ => RatePlan::Hourly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
    Extended,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Extended => "extended",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "active" => BookingStatus::Active,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            "extended" => BookingStatus::Extended,
            _ => BookingStatus::Pending,
        }
    }

    /// Whether a booking in this status blocks overlapping windows on
    /// the same bike. Pending bookings that never reach confirmation do
    /// not block.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::Active | BookingStatus::Extended
        )
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    pub fn can_start(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    pub fn can_complete(&self) -> bool {
        matches!(self, BookingStatus::Active | BookingStatus::Extended)
    }

    /// Cancellation is only allowed before the rental starts.
    pub fn can_cancel(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_extend(&self) -> bool {
        matches!(self, BookingStatus::Active | BookingStatus::Extended)
    }
}

/// Payment state mirrored onto the booking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingPaymentState {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl BookingPaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingPaymentState::Pending => "pending",
            BookingPaymentState::Paid => "paid",
            BookingPaymentState::Failed => "failed",
            BookingPaymentState::Refunded => "refunded",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "paid" => BookingPaymentState::Paid,
            "failed" => BookingPaymentState::Failed,
            "refunded" => BookingPaymentState::Refunded,
            _ => BookingPaymentState::Pending,
        }
    }
}

/// Booking entity. The window is half-open: `[start_time, end_time)`.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub bike_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rate_plan: RatePlan,
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub payment_state: BookingPaymentState,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub notes: Option<String>,
    pub helmet_requested: bool,
    pub navigation_requested: bool,
    pub helmet_fee: Decimal,
    pub navigation_fee: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New booking payload produced by the booking engine once the window
/// has been validated and the price quoted.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub bike_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rate_plan: RatePlan,
    pub total_amount: Decimal,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub notes: Option<String>,
    pub helmet_requested: bool,
    pub navigation_requested: bool,
    pub helmet_fee: Decimal,
    pub navigation_fee: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_statuses() {
        assert!(!BookingStatus::Pending.is_blocking());
        assert!(BookingStatus::Confirmed.is_blocking());
        assert!(BookingStatus::Active.is_blocking());
        assert!(BookingStatus::Extended.is_blocking());
        assert!(!BookingStatus::Completed.is_blocking());
        assert!(!BookingStatus::Cancelled.is_blocking());
    }

    #[test]
    fn confirm_requires_pending() {
        assert!(BookingStatus::Pending.can_confirm());
        assert!(!BookingStatus::Confirmed.can_confirm());
        assert!(!BookingStatus::Active.can_confirm());
        assert!(!BookingStatus::Completed.can_confirm());
        assert!(!BookingStatus::Cancelled.can_confirm());
        assert!(!BookingStatus::Extended.can_confirm());
    }

    #[test]
    fn start_requires_confirmed() {
        assert!(BookingStatus::Confirmed.can_start());
        assert!(!BookingStatus::Pending.can_start());
        assert!(!BookingStatus::Active.can_start());
        assert!(!BookingStatus::Extended.can_start());
    }

    #[test]
    fn complete_requires_running_rental() {
        assert!(BookingStatus::Active.can_complete());
        assert!(BookingStatus::Extended.can_complete());
        // Completing a pending booking directly skips the machine.
        assert!(!BookingStatus::Pending.can_complete());
        assert!(!BookingStatus::Confirmed.can_complete());
        assert!(!BookingStatus::Completed.can_complete());
        assert!(!BookingStatus::Cancelled.can_complete());
    }

    #[test]
    fn cancel_only_before_start() {
        assert!(BookingStatus::Pending.can_cancel());
        assert!(BookingStatus::Confirmed.can_cancel());
        assert!(!BookingStatus::Active.can_cancel());
        assert!(!BookingStatus::Extended.can_cancel());
        assert!(!BookingStatus::Completed.can_cancel());
        assert!(!BookingStatus::Cancelled.can_cancel());
    }

    #[test]
    fn extend_requires_running_rental() {
        assert!(BookingStatus::Active.can_extend());
        assert!(BookingStatus::Extended.can_extend());
        assert!(!BookingStatus::Pending.can_extend());
        assert!(!BookingStatus::Confirmed.can_extend());
        assert!(!BookingStatus::Completed.can_extend());
    }

    #[test]
    fn status_string_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Extended,
        ] {
            assert_eq!(BookingStatus::from_string(status.as_str()), status);
        }
    }
}
