//! Review repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewReview, Review};

fn map_review(row: &PgRow) -> Review {
    Review {
        id: row.get("id"),
        user_id: row.get("user_id"),
        bike_id: row.get("bike_id"),
        booking_id: row.get("booking_id"),
        rating: row.get("rating"),
        review_text: row.get("review_text"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Review repository
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new review repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a review
    pub async fn create(&self, new_review: &NewReview) -> Result<Review> {
        info!(
            "Creating review for bike {} by user {}",
            new_review.bike_id, new_review.user_id
        );

        let row = sqlx::query(
            r#"
            INSERT INTO reviews (user_id, bike_id, booking_id, rating, review_text)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, bike_id, booking_id, rating, review_text, created_at, updated_at
            "#,
        )
        .bind(new_review.user_id)
        .bind(new_review.bike_id)
        .bind(new_review.booking_id)
        .bind(new_review.rating)
        .bind(&new_review.review_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_review(&row))
    }

    /// Find a review by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, bike_id, booking_id, rating, review_text, created_at, updated_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_review))
    }

    /// Whether the user has already reviewed this bike
    pub async fn exists_for_user_and_bike(&self, user_id: Uuid, bike_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE user_id = $1 AND bike_id = $2)",
        )
        .bind(user_id)
        .bind(bike_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// List a bike's reviews, newest first
    pub async fn list_by_bike(&self, bike_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, bike_id, booking_id, rating, review_text, created_at, updated_at
            FROM reviews
            WHERE bike_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(bike_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_review).collect())
    }

    /// List a user's reviews, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, bike_id, booking_id, rating, review_text, created_at, updated_at
            FROM reviews
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_review).collect())
    }

    /// Update a review's rating and text
    pub async fn update(
        &self,
        id: Uuid,
        rating: i32,
        review_text: Option<&str>,
    ) -> Result<Option<Review>> {
        info!("Updating review {}", id);

        let row = sqlx::query(
            r#"
            UPDATE reviews
            SET rating = $2, review_text = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, bike_id, booking_id, rating, review_text, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(review_text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_review))
    }

    /// Delete a review
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting review {}", id);

        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
