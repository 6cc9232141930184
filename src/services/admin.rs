//! Admin console service: settings, activity feed and dashboard numbers

use chrono::NaiveDate;
use crate::database::DatabaseService;
use crate::models::admin::{
    ActivityEntry, AdminSetting, DashboardStats, RecordActivityRequest, UpsertSettingRequest,
};
use crate::utils::errors::{ChurchHubError, Result};
use crate::utils::logging::log_admin_action;

const MAX_ACTIVITY: i64 = 200;

#[derive(Clone, Debug)]
pub struct AdminService {
    database: DatabaseService,
}

impl AdminService {
    pub fn new(database: DatabaseService) -> Self {
        Self { database }
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<AdminSetting>> {
        self.database.admin.get_setting(key).await
    }

    pub async fn set_setting(&self, mut request: UpsertSettingRequest) -> Result<AdminSetting> {
        request.key = request.key.trim().to_string();
        if request.key.is_empty() {
            return Err(ChurchHubError::InvalidInput("Setting key is required".to_string()));
        }

        log_admin_action(request.updated_by.as_deref(), "setting_changed", Some(&request.key));
        self.database.admin.upsert_setting(request).await
    }

    pub async fn list_settings(&self) -> Result<Vec<AdminSetting>> {
        self.database.admin.list_settings().await
    }

    pub async fn delete_setting(&self, key: &str) -> Result<bool> {
        log_admin_action(None, "setting_deleted", Some(key));
        self.database.admin.delete_setting(key).await
    }

    pub async fn record_activity(&self, request: RecordActivityRequest) -> Result<ActivityEntry> {
        if request.action.trim().is_empty() {
            return Err(ChurchHubError::InvalidInput("Activity text is required".to_string()));
        }
        self.database.admin.record_activity(request).await
    }

    pub async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityEntry>> {
        self.database.admin.recent_activity(limit.clamp(1, MAX_ACTIVITY)).await
    }

    /// Row counts per table
    pub async fn system_stats(&self) -> Result<serde_json::Value> {
        self.database.get_system_stats().await
    }

    /// Drop activity entries older than the retention window
    pub async fn cleanup(&self, actor: Option<&str>) -> Result<serde_json::Value> {
        log_admin_action(actor, "cleanup", None);
        self.database.cleanup_expired_data().await
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats> {
        self.database.get_dashboard_stats(today).await
    }
}
