//! Member model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub permissions: Vec<String>,
    pub cell_group_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub cell_group_id: Option<i64>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub cell_group_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Filters for the member directory listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberFilter {
    pub is_active: Option<bool>,
    pub cell_group_id: Option<i64>,
    pub role: Option<String>,
}
