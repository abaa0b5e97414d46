//! Bike repository for database operations

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Bike, BikeStatus, BikeType, FuelType, NewBike, UpdateBike};

/// Catalog search filters; any combination may be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BikeSearchFilter {
    pub location: Option<String>,
    pub bike_type: Option<BikeType>,
    pub max_daily_rate: Option<Decimal>,
    pub min_rating: Option<f64>,
}

fn map_bike(row: &PgRow) -> Bike {
    Bike {
        id: row.get("id"),
        name: row.get("name"),
        brand: row.get("brand"),
        model: row.get("model"),
        year: row.get("year"),
        bike_type: BikeType::from_string(row.get::<String, _>("bike_type").as_str()),
        fuel_type: FuelType::from_string(row.get::<String, _>("fuel_type").as_str()),
        registration_number: row.get("registration_number"),
        hourly_rate: row.get("hourly_rate"),
        daily_rate: row.get("daily_rate"),
        monthly_rate: row.get("monthly_rate"),
        status: BikeStatus::from_string(row.get::<String, _>("status").as_str()),
        location: row.get("location"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        average_rating: row.get("average_rating"),
        total_reviews: row.get("total_reviews"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Bike repository
#[derive(Clone)]
pub struct BikeRepository {
    pool: PgPool,
}

impl BikeRepository {
    /// Create a new bike repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new bike listing
    pub async fn create(&self, new_bike: &NewBike) -> Result<Bike> {
        info!("Creating bike listing: {}", new_bike.registration_number);

        let row = sqlx::query(
            r#"
            INSERT INTO bikes (name, brand, model, year, bike_type, fuel_type, registration_number,
                               hourly_rate, daily_rate, monthly_rate, location, description, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, name, brand, model, year, bike_type, fuel_type, registration_number,
                      hourly_rate, daily_rate, monthly_rate, status, location, description,
                      owner_id, average_rating, total_reviews, created_at, updated_at
            "#,
        )
        .bind(&new_bike.name)
        .bind(&new_bike.brand)
        .bind(&new_bike.model)
        .bind(new_bike.year)
        .bind(new_bike.bike_type.as_str())
        .bind(new_bike.fuel_type.as_str())
        .bind(&new_bike.registration_number)
        .bind(new_bike.hourly_rate)
        .bind(new_bike.daily_rate)
        .bind(new_bike.monthly_rate)
        .bind(&new_bike.location)
        .bind(&new_bike.description)
        .bind(new_bike.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_bike(&row))
    }

    /// Find a bike by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Bike>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, brand, model, year, bike_type, fuel_type, registration_number,
                   hourly_rate, daily_rate, monthly_rate, status, location, description,
                   owner_id, average_rating, total_reviews, created_at, updated_at
            FROM bikes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_bike))
    }

    /// Update a bike listing; unset fields keep their current value.
    pub async fn update(&self, id: Uuid, update: &UpdateBike) -> Result<Option<Bike>> {
        info!("Updating bike {}", id);

        let row = sqlx::query(
            r#"
            UPDATE bikes
            SET name = COALESCE($2, name),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                year = COALESCE($5, year),
                bike_type = COALESCE($6, bike_type),
                fuel_type = COALESCE($7, fuel_type),
                hourly_rate = COALESCE($8, hourly_rate),
                daily_rate = COALESCE($9, daily_rate),
                monthly_rate = COALESCE($10, monthly_rate),
                status = COALESCE($11, status),
                location = COALESCE($12, location),
                description = COALESCE($13, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, brand, model, year, bike_type, fuel_type, registration_number,
                      hourly_rate, daily_rate, monthly_rate, status, location, description,
                      owner_id, average_rating, total_reviews, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.brand)
        .bind(&update.model)
        .bind(update.year)
        .bind(update.bike_type.map(|t| t.as_str()))
        .bind(update.fuel_type.map(|t| t.as_str()))
        .bind(update.hourly_rate)
        .bind(update.daily_rate)
        .bind(update.monthly_rate)
        .bind(update.status.map(|s| s.as_str()))
        .bind(&update.location)
        .bind(&update.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_bike))
    }

    /// Update only the listing status
    pub async fn update_status(&self, id: Uuid, status: BikeStatus) -> Result<Option<Bike>> {
        info!("Updating bike {} status to {}", id, status.as_str());

        let row = sqlx::query(
            r#"
            UPDATE bikes
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, brand, model, year, bike_type, fuel_type, registration_number,
                      hourly_rate, daily_rate, monthly_rate, status, location, description,
                      owner_id, average_rating, total_reviews, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_bike))
    }

    /// Delete a bike listing
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting bike {}", id);

        let result = sqlx::query("DELETE FROM bikes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Search available bikes by any combination of location, type,
    /// daily-rate ceiling and minimum rating.
    pub async fn search(&self, filter: &BikeSearchFilter) -> Result<Vec<Bike>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, brand, model, year, bike_type, fuel_type, registration_number,
                   hourly_rate, daily_rate, monthly_rate, status, location, description,
                   owner_id, average_rating, total_reviews, created_at, updated_at
            FROM bikes
            WHERE status = 'available'
              AND ($1::text IS NULL OR location ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR bike_type = $2)
              AND ($3::numeric IS NULL OR daily_rate <= $3)
              AND ($4::double precision IS NULL OR average_rating >= $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&filter.location)
        .bind(filter.bike_type.map(|t| t.as_str()))
        .bind(filter.max_daily_rate)
        .bind(filter.min_rating)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_bike).collect())
    }

    /// List an owner's bikes, newest first
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Bike>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, brand, model, year, bike_type, fuel_type, registration_number,
                   hourly_rate, daily_rate, monthly_rate, status, location, description,
                   owner_id, average_rating, total_reviews, created_at, updated_at
            FROM bikes
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_bike).collect())
    }

    pub async fn exists_by_registration(&self, registration_number: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bikes WHERE registration_number = $1)")
                .bind(registration_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Recompute a bike's running review aggregate from its reviews.
    pub async fn recompute_rating(&self, bike_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bikes
            SET average_rating = COALESCE(
                    (SELECT AVG(rating)::double precision FROM reviews WHERE bike_id = $1), 0),
                total_reviews = (SELECT COUNT(*)::int FROM reviews WHERE bike_id = $1),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(bike_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count bikes currently available for rent
    pub async fn count_available(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bikes WHERE status = 'available'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count an owner's listed bikes
    pub async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bikes WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
