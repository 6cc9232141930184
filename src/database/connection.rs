//! PostgreSQL pool setup, migrations and liveness probe

use std::time::{Duration, Instant};

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::config::settings;
use crate::utils::errors::ChurchHubError;
use crate::utils::logging::log_database_operation;

pub type DatabasePool = Pool<Postgres>;

/// Pool tuning; sizes come from settings, timeouts are fixed
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/churchhub".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

impl From<&settings::DatabaseConfig> for DatabaseConfig {
    fn from(config: &settings::DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            ..Default::default()
        }
    }
}

impl DatabaseConfig {
    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }
}

/// Connect and verify the pool with one round trip
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, ChurchHubError> {
    let pool = config.pool_options().connect(&config.url).await?;
    let latency = health_check(&pool).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        latency_ms = latency.as_millis() as u64,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply the embedded `migrations/` directory
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), ChurchHubError> {
    let started = Instant::now();
    let result = sqlx::migrate!("./migrations").run(pool).await;

    log_database_operation("migrate", "_sqlx_migrations", started.elapsed().as_millis() as u64, result.is_ok());
    Ok(result?)
}

/// Round-trip time of `SELECT 1`
pub async fn health_check(pool: &DatabasePool) -> Result<Duration, ChurchHubError> {
    let started = Instant::now();
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(started.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_override_pool_sizes_only() {
        let settings = settings::DatabaseConfig {
            url: "postgresql://db.internal/parish".to_string(),
            max_connections: 25,
            min_connections: 2,
        };

        let config = DatabaseConfig::from(&settings);
        assert_eq!(config.url, "postgresql://db.internal/parish");
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, DatabaseConfig::default().acquire_timeout);
    }

    #[tokio::test]
    async fn test_health_check_fails_without_server() {
        let config = DatabaseConfig {
            url: "postgresql://churchhub@127.0.0.1:1/churchhub".to_string(),
            acquire_timeout: Duration::from_millis(300),
            ..Default::default()
        };
        let pool = config.pool_options().connect_lazy(&config.url).unwrap();

        assert!(health_check(&pool).await.is_err());
    }
}
