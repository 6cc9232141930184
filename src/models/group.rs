//! Group model
//!
//! Cell groups, ministries and departments share one table and are told
//! apart by [`GroupKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub category: Option<String>,
    pub leader_id: Option<i64>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupMember {
    pub id: i64,
    pub group_id: i64,
    pub member_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

/// Group with its current member count, as shown on the group cards
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupSummary {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub category: Option<String>,
    pub leader_id: Option<i64>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
    pub member_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub kind: GroupKind,
    pub category: Option<String>,
    pub leader_id: Option<i64>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub leader_id: Option<i64>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddGroupMemberRequest {
    pub group_id: i64,
    pub member_id: i64,
    pub role: Option<GroupRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Cell,
    Ministry,
    Department,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Cell => "cell",
            GroupKind::Ministry => "ministry",
            GroupKind::Department => "department",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cell" | "cell group" => Ok(GroupKind::Cell),
            "ministry" => Ok(GroupKind::Ministry),
            "department" => Ok(GroupKind::Department),
            other => Err(format!("unknown group kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Member,
    Leader,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Member => "member",
            GroupRole::Leader => "leader",
        }
    }
}

/// Days accepted for `meeting_day`
pub const MEETING_DAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// Normalize a meeting day to its capitalised English name
pub fn normalize_meeting_day(day: &str) -> Option<&'static str> {
    let day = day.trim();
    MEETING_DAYS
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(day) || candidate[..3].eq_ignore_ascii_case(day))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_kind_round_trip() {
        for kind in [GroupKind::Cell, GroupKind::Ministry, GroupKind::Department] {
            assert_eq!(kind.as_str().parse::<GroupKind>().unwrap(), kind);
        }
        assert!("choir".parse::<GroupKind>().is_err());
    }

    #[test]
    fn test_normalize_meeting_day() {
        assert_eq!(normalize_meeting_day("wednesday"), Some("Wednesday"));
        assert_eq!(normalize_meeting_day("Fri"), Some("Friday"));
        assert_eq!(normalize_meeting_day("someday"), None);
    }
}
