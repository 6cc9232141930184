//! Event service: scheduling and attendance

use chrono::NaiveDate;
use crate::database::DatabaseService;
use crate::models::event::{
    AttendanceCounts, CategoryAttendance, CreateEventRequest, Event, EventAttendee,
    RegisterAttendeeRequest, UpdateEventRequest,
};
use crate::utils::errors::{ChurchHubError, Result};
use crate::utils::logging::log_event_action;

const UPCOMING_LIMIT: i64 = 50;

#[derive(Clone, Debug)]
pub struct EventService {
    database: DatabaseService,
}

impl EventService {
    pub fn new(database: DatabaseService) -> Self {
        Self { database }
    }

    pub async fn create_event(&self, mut request: CreateEventRequest) -> Result<Event> {
        request.name = request.name.trim().to_string();
        if request.name.is_empty() {
            return Err(ChurchHubError::InvalidInput("Event name is required".to_string()));
        }
        if matches!(request.expected_attendees, Some(n) if n < 0) {
            return Err(ChurchHubError::InvalidInput("Expected attendees cannot be negative".to_string()));
        }

        let event = self.database.events.create(request).await?;
        log_event_action(event.id, "created", None);
        Ok(event)
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Event> {
        self.database.events.find_by_id(event_id).await?
            .ok_or(ChurchHubError::EventNotFound { event_id })
    }

    pub async fn update_event(&self, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        let event = self.database.events.update(event_id, request).await?;
        log_event_action(event_id, "updated", None);
        Ok(event)
    }

    pub async fn delete_event(&self, event_id: i64) -> Result<()> {
        if !self.database.events.delete(event_id).await? {
            return Err(ChurchHubError::EventNotFound { event_id });
        }
        log_event_action(event_id, "deleted", None);
        Ok(())
    }

    pub async fn upcoming(&self, today: NaiveDate) -> Result<Vec<Event>> {
        self.database.events.get_upcoming(today, UPCOMING_LIMIT).await
    }

    /// Events organised by a group, newest first
    pub async fn for_group(&self, group_id: i64) -> Result<Vec<Event>> {
        if self.database.groups.find_by_id(group_id).await?.is_none() {
            return Err(ChurchHubError::GroupNotFound { group_id });
        }
        self.database.events.get_by_group(group_id).await
    }

    pub async fn between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Event>> {
        if from > to {
            return Err(ChurchHubError::InvalidInput("Start date is after end date".to_string()));
        }
        self.database.events.list_between(from, to).await
    }

    /// Check in a member; a second check-in for the same event is a conflict
    pub async fn register_attendee(&self, request: RegisterAttendeeRequest) -> Result<EventAttendee> {
        let (event_id, member_id) = (request.event_id, request.member_id);
        let attendee = self.database.register_attendee(request).await?;
        log_event_action(event_id, "attendee_registered", Some(member_id));
        Ok(attendee)
    }

    pub async fn remove_attendee(&self, event_id: i64, member_id: i64) -> Result<()> {
        if !self.database.events.remove_attendee(event_id, member_id).await? {
            return Err(ChurchHubError::InvalidInput(format!(
                "Member {} did not attend event {}",
                member_id, event_id
            )));
        }
        log_event_action(event_id, "attendee_removed", Some(member_id));
        Ok(())
    }

    pub async fn attendees(&self, event_id: i64) -> Result<Vec<EventAttendee>> {
        self.get_event(event_id).await?;
        self.database.events.get_attendees(event_id).await
    }

    pub async fn attendance(&self, event_id: i64) -> Result<AttendanceCounts> {
        self.get_event(event_id).await?;
        self.database.events.attendance_counts(event_id).await
    }

    pub async fn attendance_by_category(&self, since: NaiveDate) -> Result<Vec<CategoryAttendance>> {
        self.database.events.attendance_by_category(since).await
    }
}
