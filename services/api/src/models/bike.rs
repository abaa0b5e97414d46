//! Bike listing model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeType {
    Scooter,
    Motorcycle,
    ElectricBike,
    SportsBike,
    Cruiser,
}

impl BikeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BikeType::Scooter => "scooter",
            BikeType::Motorcycle => "motorcycle",
            BikeType::ElectricBike => "electric_bike",
            BikeType::SportsBike => "sports_bike",
            BikeType::Cruiser => "cruiser",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "scooter" => BikeType::Scooter,
            "electric_bike" => BikeType::ElectricBike,
            "sports_bike" => BikeType::SportsBike,
            "cruiser" => BikeType::Cruiser,
            _ => BikeType::Motorcycle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Electric,
    Hybrid,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Electric => "electric",
            FuelType::Hybrid => "hybrid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "electric" => FuelType::Electric,
            "hybrid" => FuelType::Hybrid,
            _ => FuelType::Petrol,
        }
    }
}

/// Listing status. Search only returns `Available` bikes; the booking
/// engine flips between `Available` and `Booked`, owners and admins may
/// force `Maintenance` or `OutOfService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeStatus {
    Available,
    Booked,
    Maintenance,
    OutOfService,
}

impl BikeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BikeStatus::Available => "available",
            BikeStatus::Booked => "booked",
            BikeStatus::Maintenance => "maintenance",
            BikeStatus::OutOfService => "out_of_service",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "booked" => BikeStatus::Booked,
            "maintenance" => BikeStatus::Maintenance,
            "out_of_service" => BikeStatus::OutOfService,
            _ => BikeStatus::Available,
        }
    }
}

/// Bike entity
#[derive(Debug, Clone, Serialize)]
pub struct Bike {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub bike_type: BikeType,
    pub fuel_type: FuelType,
    pub registration_number: String,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub monthly_rate: Decimal,
    pub status: BikeStatus,
    pub location: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New bike listing payload
#[derive(Debug, Clone)]
pub struct NewBike {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub bike_type: BikeType,
    pub fuel_type: FuelType,
    pub registration_number: String,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub monthly_rate: Decimal,
    pub location: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
}

/// Bike update payload; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBike {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub bike_type: Option<BikeType>,
    pub fuel_type: Option<FuelType>,
    pub hourly_rate: Option<Decimal>,
    pub daily_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub status: Option<BikeStatus>,
    pub location: Option<String>,
    pub description: Option<String>,
}
