//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub topic: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub expected_attendees: Option<i32>,
    pub group_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventAttendee {
    pub id: i64,
    pub event_id: i64,
    pub member_id: i64,
    pub is_first_time: bool,
    pub invited_by: Option<i64>,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub topic: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub expected_attendees: Option<i32>,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub topic: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub expected_attendees: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAttendeeRequest {
    pub event_id: i64,
    pub member_id: i64,
    #[serde(default)]
    pub is_first_time: bool,
    pub invited_by: Option<i64>,
}

/// Attendance tally for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
    pub total: i64,
    pub first_time: i64,
}

/// Attendance grouped by event category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryAttendance {
    pub category: Option<String>,
    pub attendees: i64,
}
