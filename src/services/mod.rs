//! Services module
//!
//! This module contains business logic services

pub mod admin;
pub mod donation;
pub mod event;
pub mod group;
pub mod import;
pub mod member;
pub mod redis;

// Re-export commonly used services
pub use admin::AdminService;
pub use donation::DonationService;
pub use event::EventService;
pub use group::GroupService;
pub use import::{ImportJob, ImportPreview, ImportService, JobStatus};
pub use member::MemberService;
pub use redis::RedisService;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::{health_check, DatabaseService, DatabasePool};
use crate::import::{ImportOptions, MemberStore};
use crate::utils::errors::Result;

/// Upper bound on how long finished import jobs stay in memory (30 days)
const MAX_JOB_RETENTION_SECS: u64 = 30 * 24 * 3600;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub member_service: MemberService,
    pub group_service: GroupService,
    pub event_service: EventService,
    pub donation_service: DonationService,
    pub admin_service: AdminService,
    pub import_service: ImportService,
    pub redis_service: Option<RedisService>,
    pub database: DatabaseService,
    pool: DatabasePool,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, pool: DatabasePool) -> Result<Self> {
        let database = DatabaseService::new(pool.clone());
        let redis_service = if settings.redis.enabled {
            Some(RedisService::new(settings.redis.clone())?)
        } else {
            None
        };

        let store: Arc<dyn MemberStore> = Arc::new(database.clone());
        let import_service = ImportService::new(
            store,
            ImportOptions::from(&settings.import),
            redis_service.clone(),
            Some(database.admin.clone()),
        )
        .with_retention(chrono::Duration::seconds(settings.redis.ttl_seconds.min(MAX_JOB_RETENTION_SECS) as i64));

        Ok(Self {
            member_service: MemberService::new(database.members.clone(), settings.import.default_role.clone()),
            group_service: GroupService::new(database.clone()),
            event_service: EventService::new(database.clone()),
            donation_service: DonationService::new(database.clone(), settings.features.donations),
            admin_service: AdminService::new(database.clone()),
            import_service,
            redis_service,
            database,
            pool,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database = health_check(&self.pool).await;
        let redis_healthy = match &self.redis_service {
            Some(redis) => Some(redis.health_check().await.unwrap_or(false)),
            None => None,
        };

        ServiceHealthStatus {
            database_healthy: database.is_ok(),
            database_latency_ms: database.ok().map(|latency| latency.as_millis() as u64),
            redis_healthy,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub database_latency_ms: Option<u64>,
    /// `None` when Redis is disabled
    pub redis_healthy: Option<bool>,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy && self.redis_healthy.unwrap_or(true)
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if self.redis_healthy == Some(false) {
            issues.push("Redis connection failed".to_string());
        }

        issues
    }
}
