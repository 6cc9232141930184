//! Redis mirror for import job snapshots
//!
//! Snapshots are JSON strings under `<prefix>import:<job id>` and expire
//! after the configured TTL. One multiplexed connection is opened on first
//! use and shared by every clone of the service.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::RedisConfig;
use crate::utils::errors::{ChurchHubError, Result};

const CONNECT_RETRIES: usize = 2;

#[derive(Clone)]
pub struct RedisService {
    client: Client,
    connection: Arc<OnceCell<ConnectionManager>>,
    config: RedisConfig,
}

impl std::fmt::Debug for RedisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisService")
            .field("prefix", &self.config.prefix)
            .field("ttl_seconds", &self.config.ttl_seconds)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisService {
    /// Validates the URL; no connection is made until the first command
    pub fn new(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;

        Ok(Self {
            client,
            connection: Arc::new(OnceCell::new()),
            config,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self.connection
            .get_or_try_init(|| async {
                debug!(prefix = %self.config.prefix, "Opening Redis connection");
                ConnectionManager::new_with_backoff(self.client.clone(), 2, 100, CONNECT_RETRIES).await
            })
            .await?;

        Ok(manager.clone())
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    /// Store `value` as JSON; `ttl_seconds` overrides the configured TTL
    pub async fn set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> Result<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_string(value)?;
        let full_key = self.full_key(key);
        let ttl = ttl_seconds.unwrap_or(self.config.ttl_seconds);

        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(&full_key, payload, ttl).await?;

        debug!(key = %full_key, ttl, "Snapshot written to Redis");
        Ok(())
    }

    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let full_key = self.full_key(key);
        let mut conn = self.connection().await?;

        let payload: Option<String> = conn.get(&full_key).await?;
        payload
            .map(|data| serde_json::from_str(&data).map_err(ChurchHubError::from))
            .transpose()
    }

    /// `false` on any connection or protocol failure
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                return Ok(false);
            }
        };

        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(reply) => Ok(reply == "PONG"),
            Err(e) => {
                warn!(error = %e, "Redis ping failed");
                Ok(false)
            }
        }
    }
}
