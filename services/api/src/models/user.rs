//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account type selecting the dashboard and role checks for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    IndividualOwner,
    BusinessOwner,
    DeliveryPartner,
    Customer,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::IndividualOwner => "individual_owner",
            AccountType::BusinessOwner => "business_owner",
            AccountType::DeliveryPartner => "delivery_partner",
            AccountType::Customer => "customer",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "individual_owner" => AccountType::IndividualOwner,
            "business_owner" => AccountType::BusinessOwner,
            "delivery_partner" => AccountType::DeliveryPartner,
            _ => AccountType::Customer,
        }
    }

    /// Whether this account type may list bikes on the platform.
    pub fn is_owner(&self) -> bool {
        matches!(
            self,
            AccountType::IndividualOwner | AccountType::BusinessOwner
        )
    }
}

/// User account status. Only `Active` users may log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Locked,
    PendingVerification,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Locked => "locked",
            UserStatus::PendingVerification => "pending_verification",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "inactive" => UserStatus::Inactive,
            "locked" => UserStatus::Locked,
            "pending_verification" => UserStatus::PendingVerification,
            _ => UserStatus::Active,
        }
    }
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub full_name: String,
    pub city: Option<String>,
    pub license_number: String,
    pub account_type: AccountType,
    pub status: UserStatus,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload. `password` is the plain-text password;
/// the repository hashes it before storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub full_name: String,
    pub city: Option<String>,
    pub license_number: String,
    pub account_type: AccountType,
}

/// Status update payload used by the admin routes.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserStatus {
    pub status: UserStatus,
}

/// User representation returned over HTTP, without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub full_name: String,
    pub city: Option<String>,
    pub license_number: String,
    pub account_type: AccountType,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            full_name: user.full_name,
            city: user.city,
            license_number: user.license_number,
            account_type: user.account_type,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
