//! Revoked-token blacklist repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Token blacklist repository for database operations
pub struct TokenBlacklistRepository;

impl TokenBlacklistRepository {
    /// Record a token as revoked until the given expiry
    ///
    /// Inserting the same token twice is a no-op, which is what makes
    /// revocation idempotent.
    pub async fn insert(pool: &PgPool, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO token_blacklist (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Check whether a token is on the blacklist
    pub async fn exists(pool: &PgPool, token: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE token = $1)
            "#,
        )
        .bind(token)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Remove entries whose tokens have expired, returning how many
    pub async fn delete_expired(pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM token_blacklist
            WHERE expires_at <= NOW()
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
    // Run with: cargo test --features integration -- --ignored
}
