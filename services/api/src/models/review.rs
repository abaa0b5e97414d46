//! Review model

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Review entity. At most one review per (user, bike) pair; the
/// referenced booking authorizes the review and must be completed.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bike_id: Uuid,
    pub booking_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New review payload.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub bike_id: Uuid,
    pub booking_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
}
