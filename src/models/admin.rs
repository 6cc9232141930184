//! Admin model: settings, activity feed, roles and permissions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminSetting {
    pub id: i64,
    pub key: String,
    pub value: serde_json::Value,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityEntry {
    pub id: i64,
    pub actor: Option<String>,
    pub action: String,
    pub kind: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSettingRequest {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordActivityRequest {
    pub actor: Option<String>,
    pub action: String,
    pub kind: ActivityKind,
    pub details: Option<serde_json::Value>,
}

/// Headline numbers for the dashboard home screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_members: i64,
    pub active_members: i64,
    pub new_members_this_month: i64,
    pub cell_groups: i64,
    pub ministries: i64,
    pub departments: i64,
    pub upcoming_events: i64,
    pub first_timers_this_month: i64,
    pub donations_this_month_cents: i64,
    pub donations_this_year_cents: i64,
    pub average_donation_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Info,
    Success,
    Warning,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Info => "info",
            ActivityKind::Success => "success",
            ActivityKind::Warning => "warning",
        }
    }
}

/// Permissions grantable to a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewMembers,
    ManageMembers,
    ManageGroups,
    ManageEvents,
    ManageDonations,
    ImportData,
    ExportData,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::ViewMembers,
        Permission::ManageMembers,
        Permission::ManageGroups,
        Permission::ManageEvents,
        Permission::ManageDonations,
        Permission::ImportData,
        Permission::ExportData,
        Permission::ManageSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewMembers => "view_members",
            Permission::ManageMembers => "manage_members",
            Permission::ManageGroups => "manage_groups",
            Permission::ManageEvents => "manage_events",
            Permission::ManageDonations => "manage_donations",
            Permission::ImportData => "import_data",
            Permission::ExportData => "export_data",
            Permission::ManageSettings => "manage_settings",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("unknown permission: {}", s))
    }
}

/// Permissions a role carries before any explicit grants
pub fn role_permissions(role: &str) -> Vec<Permission> {
    match role.trim().to_lowercase().as_str() {
        "admin" | "pastor" => Permission::ALL.to_vec(),
        "elder" => vec![
            Permission::ViewMembers,
            Permission::ManageMembers,
            Permission::ManageGroups,
            Permission::ManageEvents,
            Permission::ExportData,
        ],
        "deacon" | "treasurer" => vec![
            Permission::ViewMembers,
            Permission::ManageDonations,
            Permission::ExportData,
        ],
        "leader" | "youth leader" => vec![
            Permission::ViewMembers,
            Permission::ManageGroups,
            Permission::ManageEvents,
        ],
        _ => Vec::new(),
    }
}

/// Whether a role plus explicit grants include `permission`
pub fn has_permission(role: &str, grants: &[String], permission: Permission) -> bool {
    role_permissions(role).contains(&permission)
        || grants.iter().any(|grant| grant == permission.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_parse() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>().unwrap(), permission);
        }
        assert!("launch_rockets".parse::<Permission>().is_err());
    }

    #[test]
    fn test_role_defaults_and_grants() {
        assert!(has_permission("Pastor", &[], Permission::ManageSettings));
        assert!(!has_permission("member", &[], Permission::ViewMembers));
        assert!(has_permission("member", &["import_data".to_string()], Permission::ImportData));
        assert!(has_permission("Deacon", &[], Permission::ManageDonations));
        assert!(!has_permission("Deacon", &[], Permission::ManageSettings));
    }
}
