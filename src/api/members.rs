//! Member directory endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::{ApiResult, AppState, PageQuery};
use crate::models::admin::Permission;
use crate::models::member::{CreateMemberRequest, Member, MemberFilter, UpdateMemberRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(create_member))
        .route("/members/search", get(search_members))
        .route("/members/:id", get(get_member).put(update_member).delete(delete_member))
        .route("/members/:id/deactivate", post(deactivate_member))
        .route("/members/:id/reactivate", post(reactivate_member))
        .route("/members/:id/role", put(set_role))
        .route("/members/:id/permissions", get(get_permissions).put(set_permissions))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub is_active: Option<bool>,
    pub cell_group_id: Option<i64>,
    pub role: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PermissionsBody {
    pub permissions: Vec<Permission>,
}

async fn list_members(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Json<Vec<Member>>> {
    let filter = MemberFilter {
        is_active: query.is_active,
        cell_group_id: query.cell_group_id,
        role: query.role,
    };
    let defaults = PageQuery::default();
    let page = query.page.unwrap_or(defaults.page);
    let page_size = query.page_size.unwrap_or(defaults.page_size);

    let members = state.services.member_service
        .list_members(&filter, page, page_size)
        .await?;
    Ok(Json(members))
}

async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let member = state.services.member_service.create_member(request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn search_members(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<Json<Vec<Member>>> {
    Ok(Json(state.services.member_service.search_members(&query.q).await?))
}

async fn get_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Member>> {
    Ok(Json(state.services.member_service.get_member(id).await?))
}

async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<Json<Member>> {
    Ok(Json(state.services.member_service.update_member(id, request).await?))
}

async fn delete_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.services.member_service.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn deactivate_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Member>> {
    Ok(Json(state.services.member_service.deactivate_member(id).await?))
}

async fn reactivate_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Member>> {
    Ok(Json(state.services.member_service.reactivate_member(id).await?))
}

async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RoleBody>,
) -> ApiResult<Json<Member>> {
    Ok(Json(state.services.member_service.set_role(id, &body.role).await?))
}

async fn get_permissions(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<PermissionsBody>> {
    let permissions = state.services.member_service.effective_permissions(id).await?;
    Ok(Json(PermissionsBody { permissions }))
}

async fn set_permissions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PermissionsBody>,
) -> ApiResult<Json<Member>> {
    Ok(Json(state.services.member_service.set_permissions(id, &body.permissions).await?))
}
