//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{AccountType, NewUser, User, UserStatus};

fn map_user(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        phone: row.get("phone"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        city: row.get("city"),
        license_number: row.get("license_number"),
        account_type: AccountType::from_string(row.get::<String, _>("account_type").as_str()),
        status: UserStatus::from_string(row.get::<String, _>("status").as_str()),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user. The plain-text password is hashed here.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, phone, password_hash, full_name, city, license_number, account_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, username, email, phone, password_hash, full_name, city, license_number,
                      account_type, status, is_admin, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&password_hash)
        .bind(&new_user.full_name)
        .bind(&new_user.city)
        .bind(&new_user.license_number)
        .bind(new_user.account_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(map_user(&row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, phone, password_hash, full_name, city, license_number,
                   account_type, status, is_admin, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_user))
    }

    /// Find a user by username or email
    pub async fn find_by_username_or_email(&self, username_or_email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, phone, password_hash, full_name, city, license_number,
                   account_type, status, is_admin, created_at, updated_at
            FROM users
            WHERE username = $1 OR email = $1
            "#,
        )
        .bind(username_or_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_user))
    }

    /// Verify a user's password
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn exists_by_phone(&self, phone: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE phone = $1)")
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn exists_by_license(&self, license_number: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE license_number = $1)")
                .bind(license_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Update a user's status (admin operation)
    pub async fn update_status(&self, id: Uuid, status: UserStatus) -> Result<Option<User>> {
        info!("Updating user {} status to {}", id, status.as_str());

        let row = sqlx::query(
            r#"
            UPDATE users
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, phone, password_hash, full_name, city, license_number,
                      account_type, status, is_admin, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_user))
    }

    /// List all users, newest first
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, phone, password_hash, full_name, city, license_number,
                   account_type, status, is_admin, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_user).collect())
    }

    /// List users by account type, newest first
    pub async fn list_by_account_type(&self, account_type: AccountType) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, phone, password_hash, full_name, city, license_number,
                   account_type, status, is_admin, created_at, updated_at
            FROM users
            WHERE account_type = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_user).collect())
    }

    /// Count users with `Active` status
    pub async fn count_active(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
