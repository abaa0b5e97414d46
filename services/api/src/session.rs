//! Session management using Redis
//!
//! Login produces an opaque bearer token stored under `session:<token>`
//! with a TTL; the middleware resolves the token back to a user id on
//! every request.

use anyhow::Result;
use rand::{Rng, distributions::Alphanumeric};
use tracing::info;
use uuid::Uuid;

use common::cache::RedisPool;

const TOKEN_LENGTH: usize = 48;
const DEFAULT_TTL_SECONDS: u64 = 86_400;

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Session manager for handling login sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

impl SessionManager {
    /// Create a new session manager. The TTL is read from
    /// `SESSION_TTL_SECONDS` and defaults to one day.
    pub fn new(redis_pool: RedisPool) -> Self {
        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        Self {
            redis_pool,
            ttl_seconds,
        }
    }

    /// Create a session for a user and return the opaque token
    pub async fn create(&self, user_id: Uuid) -> Result<String> {
        info!("Creating session for user: {}", user_id);

        let token = generate_token();
        let session_key = format!("session:{}", token);
        self.redis_pool
            .set(&session_key, &user_id.to_string(), Some(self.ttl_seconds))
            .await?;

        Ok(token)
    }

    /// Resolve a token to the user id it was issued for
    pub async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let session_key = format!("session:{}", token);
        let value = self.redis_pool.get(&session_key).await?;

        match value {
            Some(raw) => Ok(raw.parse().ok()),
            None => Ok(None),
        }
    }

    /// Destroy a session (logout)
    pub async fn destroy(&self, token: &str) -> Result<()> {
        let session_key = format!("session:{}", token);
        self.redis_pool.delete(&session_key).await?;

        Ok(())
    }

    /// Get Redis health status
    pub async fn health_check(&self) -> Result<bool> {
        self.redis_pool.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_long_opaque_alphanumerics() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }
}
