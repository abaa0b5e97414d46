//! Payment service
//!
//! Creates payment attempts for bookings, processes them through the
//! injected gateway, and answers the revenue queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::{BookingPaymentState, NewNotification, NewPayment, Payment, PaymentMethod, PaymentStatus};
use crate::payment::gateway::{GatewayOutcome, PaymentGateway};
use crate::repositories::{BookingRepository, NotificationRepository, PaymentRepository};

/// Transaction identifiers are unique per attempt: `TXN_` plus twelve
/// uppercase hex characters.
fn generate_transaction_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("TXN_{}", hex[..12].to_uppercase())
}

/// Payment service
#[derive(Clone)]
pub struct PaymentService {
    payments: PaymentRepository,
    bookings: BookingRepository,
    notifications: NotificationRepository,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(
        payments: PaymentRepository,
        bookings: BookingRepository,
        notifications: NotificationRepository,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            payments,
            bookings,
            notifications,
            gateway,
        }
    }

    /// Create a payment attempt for a booking. The amount is copied
    /// from the booking's total. A booking may only carry one open or
    /// settled payment; failed attempts stay for audit and do not
    /// block a retry.
    pub async fn create(
        &self,
        auth: &AuthUser,
        booking_id: Uuid,
        method: PaymentMethod,
    ) -> ApiResult<Payment> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

        if booking.user_id != auth.id && !auth.is_admin {
            return Err(ApiError::Forbidden);
        }

        if self.payments.has_open_payment(booking_id).await? {
            return Err(ApiError::Conflict(
                "Booking already has a payment".to_string(),
            ));
        }

        let new_payment = NewPayment {
            booking_id,
            amount: booking.total_amount,
            method,
            transaction_id: generate_transaction_id(),
        };
        let payment = self.payments.create(&new_payment).await?;

        info!(
            "Created payment {} for booking {}",
            payment.transaction_id, booking_id
        );
        Ok(payment)
    }

    /// Run a pending payment through the gateway. The booking's
    /// payment state mirrors the outcome, and the payer is notified
    /// either way.
    pub async fn process(&self, auth: &AuthUser, transaction_id: &str) -> ApiResult<Payment> {
        let payment = self
            .payments
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

        let booking = self
            .bookings
            .find_by_id(payment.booking_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

        if booking.user_id != auth.id && !auth.is_admin {
            return Err(ApiError::Forbidden);
        }

        if payment.status != PaymentStatus::Pending {
            return Err(ApiError::InvalidState(
                "Payment has already been processed".to_string(),
            ));
        }

        let payment = match self.gateway.decide(payment.method) {
            GatewayOutcome::Approved => {
                let payment = self.payments.mark_success(payment.id).await?;
                self.bookings
                    .update_payment_state(booking.id, BookingPaymentState::Paid)
                    .await?;
                self.notifications
                    .create(&NewNotification::payment_success(
                        booking.user_id,
                        payment.amount,
                    ))
                    .await?;
                info!("Payment {} succeeded", transaction_id);
                payment
            }
            GatewayOutcome::Declined => {
                let payment = self
                    .payments
                    .mark_failed(payment.id, "Payment processing failed")
                    .await?;
                self.bookings
                    .update_payment_state(booking.id, BookingPaymentState::Failed)
                    .await?;
                self.notifications
                    .create(&NewNotification::payment_failed(
                        booking.user_id,
                        payment.amount,
                    ))
                    .await?;
                info!("Payment {} failed", transaction_id);
                payment
            }
        };

        Ok(payment)
    }

    /// Refund a successful payment. Terminal; only `Success` payments
    /// may be refunded.
    pub async fn refund(&self, transaction_id: &str, reason: &str) -> ApiResult<Payment> {
        let payment = self
            .payments
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

        if payment.status != PaymentStatus::Success {
            return Err(ApiError::InvalidState(
                "Can only refund successful payments".to_string(),
            ));
        }

        let payment = self.payments.mark_refunded(payment.id, reason).await?;
        self.bookings
            .update_payment_state(payment.booking_id, BookingPaymentState::Refunded)
            .await?;

        info!("Refunded payment {}", payment.transaction_id);
        Ok(payment)
    }

    /// Sum of all successful payment amounts.
    pub async fn total_revenue(&self) -> ApiResult<Decimal> {
        Ok(self.payments.total_revenue().await?)
    }

    /// Sum of successful payment amounts settled inside `[start, end)`.
    pub async fn revenue_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<Decimal> {
        Ok(self.payments.revenue_between(start, end).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn transaction_ids_have_the_expected_shape() {
        let id = generate_transaction_id();
        assert!(id.starts_with("TXN_"));
        assert_eq!(id.len(), 16);
        assert!(
            id[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn transaction_ids_are_unique_per_attempt() {
        let ids: HashSet<String> = (0..200).map(|_| generate_transaction_id()).collect();
        assert_eq!(ids.len(), 200);
    }
}
