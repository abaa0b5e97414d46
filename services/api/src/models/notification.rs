//! Notification model
//!
//! Notifications are appended to a per-user inbox by the booking and
//! payment flows. The `NewNotification` constructors carry the message
//! texts for the common fan-out cases.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BookingConfirmed,
    BookingCancelled,
    PaymentSuccess,
    PaymentFailed,
    RideReminder,
    ReviewRequest,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::BookingConfirmed => "booking_confirmed",
            NotificationType::BookingCancelled => "booking_cancelled",
            NotificationType::PaymentSuccess => "payment_success",
            NotificationType::PaymentFailed => "payment_failed",
            NotificationType::RideReminder => "ride_reminder",
            NotificationType::ReviewRequest => "review_request",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "booking_confirmed" => NotificationType::BookingConfirmed,
            "booking_cancelled" => NotificationType::BookingCancelled,
            "payment_success" => NotificationType::PaymentSuccess,
            "payment_failed" => NotificationType::PaymentFailed,
            "review_request" => NotificationType::ReviewRequest,
            _ => NotificationType::RideReminder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Unread,
    Read,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Unread => "unread",
            NotificationStatus::Read => "read",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "read" => NotificationStatus::Read,
            _ => NotificationStatus::Unread,
        }
    }
}

/// Notification entity
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// New notification payload.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
}

impl NewNotification {
    pub fn booking_confirmed(user_id: Uuid, bike_name: &str) -> Self {
        NewNotification {
            user_id,
            title: "Booking Confirmed".to_string(),
            message: format!("Your booking for {} has been confirmed.", bike_name),
            notification_type: NotificationType::BookingConfirmed,
        }
    }

    pub fn booking_cancelled(user_id: Uuid, bike_name: &str) -> Self {
        NewNotification {
            user_id,
            title: "Booking Cancelled".to_string(),
            message: format!("Your booking for {} has been cancelled.", bike_name),
            notification_type: NotificationType::BookingCancelled,
        }
    }

    pub fn payment_success(user_id: Uuid, amount: Decimal) -> Self {
        NewNotification {
            user_id,
            title: "Payment Successful".to_string(),
            message: format!("Payment of ₹{} has been processed successfully.", amount),
            notification_type: NotificationType::PaymentSuccess,
        }
    }

    pub fn payment_failed(user_id: Uuid, amount: Decimal) -> Self {
        NewNotification {
            user_id,
            title: "Payment Failed".to_string(),
            message: format!("Payment of ₹{} could not be processed.", amount),
            notification_type: NotificationType::PaymentFailed,
        }
    }

    pub fn ride_reminder(user_id: Uuid, bike_name: &str, start_time: DateTime<Utc>) -> Self {
        NewNotification {
            user_id,
            title: "Ride Reminder".to_string(),
            message: format!("Your ride with {} starts at {}.", bike_name, start_time),
            notification_type: NotificationType::RideReminder,
        }
    }

    pub fn review_request(user_id: Uuid, bike_name: &str) -> Self {
        NewNotification {
            user_id,
            title: "Review Request".to_string(),
            message: format!(
                "How was your experience with {}? Please leave a review.",
                bike_name
            ),
            notification_type: NotificationType::ReviewRequest,
        }
    }
}
