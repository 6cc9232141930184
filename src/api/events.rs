//! Event scheduling and attendance endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::{Months, NaiveDate, Utc};
use serde::Deserialize;

use crate::api::{ApiResult, AppState};
use crate::models::event::{
    AttendanceCounts, CategoryAttendance, CreateEventRequest, Event, EventAttendee,
    RegisterAttendeeRequest, UpdateEventRequest,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event).put(update_event).delete(delete_event))
        .route("/events/:id/attendees", get(list_attendees).post(register_attendee))
        .route("/events/:id/attendees/:member_id", delete(remove_attendee))
        .route("/events/:id/attendance", get(attendance))
        .route("/groups/:id/events", get(group_events))
        .route("/attendance/categories", get(attendance_by_category))
}

#[derive(Debug, Deserialize)]
pub struct EventRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SinceQuery {
    pub since: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AttendeeBody {
    pub member_id: i64,
    #[serde(default)]
    pub is_first_time: bool,
    pub invited_by: Option<i64>,
}

/// Upcoming events, or every event in `from..=to` when a range is given
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventRangeQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let service = &state.services.event_service;
    let today = Utc::now().date_naive();

    let events = match (query.from, query.to) {
        (None, None) => service.upcoming(today).await?,
        (from, to) => {
            let from = from.unwrap_or(today);
            let to = to.unwrap_or_else(|| from.checked_add_months(Months::new(1)).unwrap_or(from));
            service.between(from, to).await?
        }
    };
    Ok(Json(events))
}

async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = state.services.event_service.create_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Event>> {
    Ok(Json(state.services.event_service.get_event(id).await?))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    Ok(Json(state.services.event_service.update_event(id, request).await?))
}

async fn delete_event(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.services.event_service.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_attendees(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Vec<EventAttendee>>> {
    Ok(Json(state.services.event_service.attendees(id).await?))
}

async fn register_attendee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AttendeeBody>,
) -> ApiResult<(StatusCode, Json<EventAttendee>)> {
    let request = RegisterAttendeeRequest {
        event_id: id,
        member_id: body.member_id,
        is_first_time: body.is_first_time,
        invited_by: body.invited_by,
    };
    let attendee = state.services.event_service.register_attendee(request).await?;
    Ok((StatusCode::CREATED, Json(attendee)))
}

async fn remove_attendee(
    State(state): State<AppState>,
    Path((id, member_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.services.event_service.remove_attendee(id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn group_events(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(state.services.event_service.for_group(id).await?))
}

async fn attendance(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<AttendanceCounts>> {
    Ok(Json(state.services.event_service.attendance(id).await?))
}

/// Defaults to the last 30 days
async fn attendance_by_category(
    State(state): State<AppState>,
    Query(query): Query<SinceQuery>,
) -> ApiResult<Json<Vec<CategoryAttendance>>> {
    let since = query
        .since
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    Ok(Json(state.services.event_service.attendance_by_category(since).await?))
}
