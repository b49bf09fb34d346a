//! Database pool construction and migrations

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Connections kept open even when idle
const MIN_CONNECTIONS: u32 = 2;
/// How long an acquire may wait for a free connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
/// Idle connections are closed after this long
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
/// Connections are recycled after this long regardless of use
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Create the PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.url)?.application_name("miniblog");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(MIN_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    info!(
        max = config.max_connections,
        min = MIN_CONNECTIONS,
        "Database pool created"
    );

    Ok(pool)
}

/// Run pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}

/// Check database connectivity
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_default_database_url_parses() {
        let config = AppConfig::default();
        assert!(PgConnectOptions::from_str(&config.database.url).is_ok());
    }
}
