//! Cell group, ministry and department endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::{ApiResult, AppState};
use crate::models::group::{
    CreateGroupRequest, Group, GroupKind, GroupMember, GroupRole, GroupSummary, UpdateGroupRequest,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/:id", get(get_group).put(update_group).delete(delete_group))
        .route("/groups/:id/members", get(list_members).post(add_member))
        .route("/groups/:id/members/:member_id", delete(remove_member))
        .route("/groups/:id/leader", put(set_leader))
}

#[derive(Debug, Deserialize)]
pub struct GroupListQuery {
    pub kind: Option<GroupKind>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberBody {
    pub member_id: i64,
    pub role: Option<GroupRole>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderBody {
    pub member_id: i64,
}

#[derive(Debug, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub member_count: i64,
}

async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<GroupListQuery>,
) -> ApiResult<Json<Vec<GroupSummary>>> {
    let groups = state.services.group_service
        .list_groups(query.kind, query.active_only)
        .await?;
    Ok(Json(groups))
}

async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let group = state.services.group_service.create_group(request).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn get_group(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<GroupDetail>> {
    let service = &state.services.group_service;
    let group = service.get_group(id).await?;
    let member_count = service.member_count(id).await?;
    Ok(Json(GroupDetail { group, member_count }))
}

async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateGroupRequest>,
) -> ApiResult<Json<Group>> {
    Ok(Json(state.services.group_service.update_group(id, request).await?))
}

async fn delete_group(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.services.group_service.delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_members(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Vec<GroupMember>>> {
    Ok(Json(state.services.group_service.members(id).await?))
}

async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AddMemberBody>,
) -> ApiResult<(StatusCode, Json<GroupMember>)> {
    let membership = state.services.group_service
        .add_member(id, body.member_id, body.role)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

async fn remove_member(
    State(state): State<AppState>,
    Path((id, member_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.services.group_service.remove_member(id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_leader(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<LeaderBody>,
) -> ApiResult<Json<Group>> {
    Ok(Json(state.services.group_service.set_leader(id, body.member_id).await?))
}
