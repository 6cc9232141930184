//! Admin repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::admin::{AdminSetting, ActivityEntry, UpsertSettingRequest, RecordActivityRequest};
use crate::utils::errors::ChurchHubError;

#[derive(Clone)]
#[derive(Debug)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Settings
    /// Create or replace a setting by key
    pub async fn upsert_setting(&self, request: UpsertSettingRequest) -> Result<AdminSetting, ChurchHubError> {
        let setting = sqlx::query_as::<_, AdminSetting>(
            r#"
            INSERT INTO admin_settings (key, value, updated_by, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by, updated_at = EXCLUDED.updated_at
            RETURNING id, key, value, updated_by, updated_at
            "#
        )
        .bind(request.key)
        .bind(request.value)
        .bind(request.updated_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Get setting by key
    pub async fn get_setting(&self, key: &str) -> Result<Option<AdminSetting>, ChurchHubError> {
        let setting = sqlx::query_as::<_, AdminSetting>(
            "SELECT id, key, value, updated_by, updated_at FROM admin_settings WHERE key = $1"
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Delete setting
    pub async fn delete_setting(&self, key: &str) -> Result<bool, ChurchHubError> {
        let result = sqlx::query("DELETE FROM admin_settings WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all settings
    pub async fn list_settings(&self) -> Result<Vec<AdminSetting>, ChurchHubError> {
        let settings = sqlx::query_as::<_, AdminSetting>(
            "SELECT id, key, value, updated_by, updated_at FROM admin_settings ORDER BY key"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    // Activity feed
    /// Append an entry to the activity log
    pub async fn record_activity(&self, request: RecordActivityRequest) -> Result<ActivityEntry, ChurchHubError> {
        let entry = sqlx::query_as::<_, ActivityEntry>(
            r#"
            INSERT INTO activity_log (actor, action, kind, details, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, actor, action, kind, details, created_at
            "#
        )
        .bind(request.actor)
        .bind(request.action)
        .bind(request.kind.as_str())
        .bind(request.details.unwrap_or_else(|| serde_json::json!({})))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Most recent activity, newest first
    pub async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityEntry>, ChurchHubError> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            "SELECT id, actor, action, kind, details, created_at FROM activity_log ORDER BY created_at DESC, id DESC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Delete activity older than the given number of days
    pub async fn clean_old_activity(&self, keep_days: i32) -> Result<i64, ChurchHubError> {
        let result = sqlx::query(
            "DELETE FROM activity_log WHERE created_at < NOW() - make_interval(days => $1)"
        )
        .bind(keep_days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as i64)
    }

    /// Get table-level statistics
    pub async fn get_stats(&self) -> Result<serde_json::Value, ChurchHubError> {
        let members: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        let groups: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await?;
        let events: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        let donations: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM donations")
            .fetch_one(&self.pool)
            .await?;

        Ok(serde_json::json!({
            "members": members.0,
            "groups": groups.0,
            "events": events.0,
            "donations": donations.0,
        }))
    }
}
