//! Event repository implementation

use sqlx::PgPool;
use chrono::{NaiveDate, Utc};
use crate::models::event::{Event, EventAttendee, CreateEventRequest, UpdateEventRequest, RegisterAttendeeRequest, AttendanceCounts, CategoryAttendance};
use crate::utils::errors::ChurchHubError;

#[derive(Clone)]
#[derive(Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, ChurchHubError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, topic, event_date, event_time, location, category, expected_attendees, group_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, topic, event_date, event_time, location, category, expected_attendees, group_id, is_active, created_at, updated_at
            "#
        )
        .bind(request.name)
        .bind(request.topic)
        .bind(request.event_date)
        .bind(request.event_time)
        .bind(request.location)
        .bind(request.category)
        .bind(request.expected_attendees)
        .bind(request.group_id)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, ChurchHubError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, name, topic, event_date, event_time, location, category, expected_attendees, group_id, is_active, created_at, updated_at FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event, ChurchHubError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET name = COALESCE($2, name),
                topic = COALESCE($3, topic),
                event_date = COALESCE($4, event_date),
                event_time = COALESCE($5, event_time),
                location = COALESCE($6, location),
                category = COALESCE($7, category),
                expected_attendees = COALESCE($8, expected_attendees),
                is_active = COALESCE($9, is_active),
                updated_at = $10
            WHERE id = $1
            RETURNING id, name, topic, event_date, event_time, location, category, expected_attendees, group_id, is_active, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.name)
        .bind(request.topic)
        .bind(request.event_date)
        .bind(request.event_time)
        .bind(request.location)
        .bind(request.category)
        .bind(request.expected_attendees)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or(ChurchHubError::EventNotFound { event_id: id })
    }

    /// Delete event
    pub async fn delete(&self, id: i64) -> Result<bool, ChurchHubError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active events on or after a date, soonest first
    pub async fn get_upcoming(&self, from: NaiveDate, limit: i64) -> Result<Vec<Event>, ChurchHubError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, name, topic, event_date, event_time, location, category, expected_attendees, group_id, is_active, created_at, updated_at
            FROM events
            WHERE is_active = true AND event_date >= $1
            ORDER BY event_date ASC, event_time ASC NULLS LAST, id ASC
            LIMIT $2
            "#
        )
        .bind(from)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count active events on or after a date
    pub async fn count_upcoming(&self, from: NaiveDate) -> Result<i64, ChurchHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE is_active = true AND event_date >= $1"
        )
        .bind(from)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Events in an inclusive date range, newest first
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Event>, ChurchHubError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, name, topic, event_date, event_time, location, category, expected_attendees, group_id, is_active, created_at, updated_at
            FROM events
            WHERE event_date BETWEEN $1 AND $2
            ORDER BY event_date DESC, id DESC
            "#
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get events for a group
    pub async fn get_by_group(&self, group_id: i64) -> Result<Vec<Event>, ChurchHubError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, name, topic, event_date, event_time, location, category, expected_attendees, group_id, is_active, created_at, updated_at FROM events WHERE group_id = $1 ORDER BY event_date ASC"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Record a member attending an event
    pub async fn register_attendee(&self, request: RegisterAttendeeRequest) -> Result<EventAttendee, ChurchHubError> {
        let attendee = sqlx::query_as::<_, EventAttendee>(
            r#"
            INSERT INTO event_attendees (event_id, member_id, is_first_time, invited_by, checked_in_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, member_id, is_first_time, invited_by, checked_in_at
            "#
        )
        .bind(request.event_id)
        .bind(request.member_id)
        .bind(request.is_first_time)
        .bind(request.invited_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Remove an attendance record
    pub async fn remove_attendee(&self, event_id: i64, member_id: i64) -> Result<bool, ChurchHubError> {
        let result = sqlx::query("DELETE FROM event_attendees WHERE event_id = $1 AND member_id = $2")
            .bind(event_id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get attendees of an event in check-in order
    pub async fn get_attendees(&self, event_id: i64) -> Result<Vec<EventAttendee>, ChurchHubError> {
        let attendees = sqlx::query_as::<_, EventAttendee>(
            "SELECT id, event_id, member_id, is_first_time, invited_by, checked_in_at FROM event_attendees WHERE event_id = $1 ORDER BY checked_in_at ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Check if member already attended
    pub async fn is_attendee(&self, event_id: i64, member_id: i64) -> Result<bool, ChurchHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_attendees WHERE event_id = $1 AND member_id = $2"
        )
        .bind(event_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Total and first-time attendance of an event
    pub async fn attendance_counts(&self, event_id: i64) -> Result<AttendanceCounts, ChurchHubError> {
        let (total, first_time): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE is_first_time)
            FROM event_attendees
            WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceCounts { total, first_time })
    }

    /// Attendance since a date, grouped by event category
    pub async fn attendance_by_category(&self, since: NaiveDate) -> Result<Vec<CategoryAttendance>, ChurchHubError> {
        let rows = sqlx::query_as::<_, CategoryAttendance>(
            r#"
            SELECT e.category, COUNT(a.id) AS attendees
            FROM events e
            JOIN event_attendees a ON a.event_id = e.id
            WHERE e.event_date >= $1
            GROUP BY e.category
            ORDER BY attendees DESC
            "#
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count first-time visitors checked in since a date
    pub async fn count_first_timers_since(&self, since: NaiveDate) -> Result<i64, ChurchHubError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM event_attendees a
            JOIN events e ON e.id = a.event_id
            WHERE a.is_first_time = true AND e.event_date >= $1
            "#
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
