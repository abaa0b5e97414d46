//! Payment repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewPayment, Payment, PaymentMethod, PaymentStatus};

fn map_payment(row: &PgRow) -> Payment {
    Payment {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        amount: row.get("amount"),
        method: PaymentMethod::from_string(row.get::<String, _>("method").as_str()),
        status: PaymentStatus::from_string(row.get::<String, _>("status").as_str()),
        transaction_id: row.get("transaction_id"),
        failure_reason: row.get("failure_reason"),
        paid_at: row.get("paid_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const PAYMENT_COLUMNS: &str = r#"id, booking_id, amount, method, status, transaction_id,
    failure_reason, paid_at, created_at, updated_at"#;

/// Payment repository
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending payment attempt
    pub async fn create(&self, new_payment: &NewPayment) -> Result<Payment> {
        info!(
            "Creating payment {} for booking {}",
            new_payment.transaction_id, new_payment.booking_id
        );

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (booking_id, amount, method, transaction_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(new_payment.booking_id)
        .bind(new_payment.amount)
        .bind(new_payment.method.as_str())
        .bind(&new_payment.transaction_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_payment(&row))
    }

    /// Find a payment by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_payment))
    }

    /// Find a payment by its transaction identifier
    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_payment))
    }

    /// Whether the booking already carries a payment that is pending
    /// or has settled. Failed and cancelled attempts do not count, so
    /// a payment may be retried after a failure.
    pub async fn has_open_payment(&self, booking_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM payments
                WHERE booking_id = $1 AND status IN ('pending', 'success', 'refunded')
            )
            "#,
        )
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// List all payment attempts for a booking, newest first
    pub async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = $1 ORDER BY created_at DESC"
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_payment).collect())
    }

    /// Mark a payment successful and stamp the settlement time
    pub async fn mark_success(&self, id: Uuid) -> Result<Payment> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE payments
            SET status = 'success', paid_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_payment(&row))
    }

    /// Mark a payment failed with a reason
    pub async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<Payment> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE payments
            SET status = 'failed', failure_reason = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_payment(&row))
    }

    /// Mark a payment refunded, recording the reason
    pub async fn mark_refunded(&self, id: Uuid, reason: &str) -> Result<Payment> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE payments
            SET status = 'refunded', failure_reason = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_payment(&row))
    }

    /// Sum of all successful payment amounts
    pub async fn total_revenue(&self) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE status = 'success'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Sum of successful payment amounts settled inside `[start, end)`
    pub async fn revenue_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE status = 'success' AND paid_at >= $1 AND paid_at < $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
