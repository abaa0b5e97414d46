//! Booking repository for database operations
//!
//! Admission and extension run their conflict check and write inside
//! one transaction, behind `SELECT ... FOR UPDATE` on the bike row, so
//! concurrent requests for the same bike serialize. A conflicting
//! window rolls the transaction back and surfaces as `None`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Booking, BookingPaymentState, BookingStatus, NewBooking, RatePlan,
};

fn map_booking(row: &PgRow) -> Booking {
    Booking {
        id: row.get("id"),
        bike_id: row.get("bike_id"),
        user_id: row.get("user_id"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        rate_plan: RatePlan::from_string(row.get::<String, _>("rate_plan").as_str()),
        total_amount: row.get("total_amount"),
        status: BookingStatus::from_string(row.get::<String, _>("status").as_str()),
        payment_state: BookingPaymentState::from_string(
            row.get::<String, _>("payment_state").as_str(),
        ),
        pickup_location: row.get("pickup_location"),
        dropoff_location: row.get("dropoff_location"),
        notes: row.get("notes"),
        helmet_requested: row.get("helmet_requested"),
        navigation_requested: row.get("navigation_requested"),
        helmet_fee: row.get("helmet_fee"),
        navigation_fee: row.get("navigation_fee"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const BOOKING_COLUMNS: &str = r#"id, bike_id, user_id, start_time, end_time, rate_plan,
    total_amount, status, payment_state, pickup_location, dropoff_location, notes,
    helmet_requested, navigation_requested, helmet_fee, navigation_fee, created_at, updated_at"#;

/// Booking repository
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically admit a booking: lock the bike row, scan for
    /// overlapping bookings in a blocking status, and insert the new
    /// row in `Pending` state. Returns `None` on a scheduling
    /// conflict, in which case nothing is persisted.
    pub async fn create_in_window(&self, new_booking: &NewBooking) -> Result<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM bikes WHERE id = $1 FOR UPDATE")
            .bind(new_booking.bike_id)
            .fetch_optional(&mut *tx)
            .await?;

        let conflicts: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE bike_id = $1
              AND status IN ('confirmed', 'active', 'extended')
              AND start_time < $3
              AND end_time > $2
            "#,
        )
        .bind(new_booking.bike_id)
        .bind(new_booking.start_time)
        .bind(new_booking.end_time)
        .fetch_one(&mut *tx)
        .await?;

        if conflicts > 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (bike_id, user_id, start_time, end_time, rate_plan, total_amount,
                                  pickup_location, dropoff_location, notes,
                                  helmet_requested, navigation_requested, helmet_fee, navigation_fee)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(new_booking.bike_id)
        .bind(new_booking.user_id)
        .bind(new_booking.start_time)
        .bind(new_booking.end_time)
        .bind(new_booking.rate_plan.as_str())
        .bind(new_booking.total_amount)
        .bind(&new_booking.pickup_location)
        .bind(&new_booking.dropoff_location)
        .bind(&new_booking.notes)
        .bind(new_booking.helmet_requested)
        .bind(new_booking.navigation_requested)
        .bind(new_booking.helmet_fee)
        .bind(new_booking.navigation_fee)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(map_booking(&row)))
    }

    /// Atomically lengthen a booking's window to `new_end_time`,
    /// re-running the conflict check with the booking's own row
    /// excluded. Returns `None` on conflict, leaving the booking
    /// unmodified.
    pub async fn extend_in_window(
        &self,
        booking_id: Uuid,
        bike_id: Uuid,
        start_time: DateTime<Utc>,
        new_end_time: DateTime<Utc>,
    ) -> Result<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM bikes WHERE id = $1 FOR UPDATE")
            .bind(bike_id)
            .fetch_optional(&mut *tx)
            .await?;

        let conflicts: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE bike_id = $1
              AND id <> $2
              AND status IN ('confirmed', 'active', 'extended')
              AND start_time < $4
              AND end_time > $3
            "#,
        )
        .bind(bike_id)
        .bind(booking_id)
        .bind(start_time)
        .bind(new_end_time)
        .fetch_one(&mut *tx)
        .await?;

        if conflicts > 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE bookings
            SET end_time = $2, status = 'extended', updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(new_end_time)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(map_booking(&row)))
    }

    /// Find a booking by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_booking))
    }

    /// Update a booking's status. The caller has already verified the
    /// transition precondition and that the booking exists.
    pub async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<Booking> {
        info!("Updating booking {} status to {}", id, status.as_str());

        let row = sqlx::query(&format!(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(map_booking(&row))
    }

    /// Mirror the payment outcome onto the booking row
    pub async fn update_payment_state(
        &self,
        id: Uuid,
        payment_state: BookingPaymentState,
    ) -> Result<()> {
        info!(
            "Updating booking {} payment state to {}",
            id,
            payment_state.as_str()
        );

        sqlx::query("UPDATE bookings SET payment_state = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(payment_state.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List a user's bookings, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_booking).collect())
    }

    /// List all bookings on a bike, oldest window first
    pub async fn list_by_bike(&self, bike_id: Uuid) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE bike_id = $1 ORDER BY start_time ASC"
        ))
        .bind(bike_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_booking).collect())
    }

    /// Count bookings referencing a bike
    pub async fn count_by_bike(&self, bike_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE bike_id = $1")
            .bind(bike_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count completed bookings across the platform
    pub async fn count_completed(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = 'completed'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
