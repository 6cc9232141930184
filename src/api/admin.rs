//! Admin console endpoints: settings, activity feed and dashboard

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::api::{actor, ApiResult, AppState};
use crate::models::admin::{
    ActivityEntry, ActivityKind, AdminSetting, DashboardStats, RecordActivityRequest, UpsertSettingRequest,
};
use crate::utils::errors::ChurchHubError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/settings", get(list_settings))
        .route("/admin/settings/:key", get(get_setting).put(put_setting).delete(delete_setting))
        .route("/admin/activity", get(recent_activity).post(record_activity))
        .route("/admin/stats", get(system_stats))
        .route("/admin/cleanup", post(cleanup))
        .route("/dashboard", get(dashboard))
}

#[derive(Debug, Deserialize)]
pub struct SettingBody {
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityBody {
    pub action: String,
    #[serde(default = "default_kind")]
    pub kind: ActivityKind,
    pub details: Option<serde_json::Value>,
}

fn default_kind() -> ActivityKind {
    ActivityKind::Info
}

async fn list_settings(State(state): State<AppState>) -> ApiResult<Json<Vec<AdminSetting>>> {
    Ok(Json(state.services.admin_service.list_settings().await?))
}

async fn get_setting(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Json<AdminSetting>> {
    state.services.admin_service
        .get_setting(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ChurchHubError::InvalidInput(format!("Unknown setting: {}", key)))
}

async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SettingBody>,
) -> ApiResult<Json<AdminSetting>> {
    let request = UpsertSettingRequest {
        key,
        value: body.value,
        updated_by: actor(&headers),
    };
    Ok(Json(state.services.admin_service.set_setting(request).await?))
}

async fn delete_setting(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<StatusCode> {
    if state.services.admin_service.delete_setting(&key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

async fn recent_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityEntry>>> {
    let limit = query.limit.unwrap_or(20);
    Ok(Json(state.services.admin_service.recent_activity(limit).await?))
}

async fn record_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActivityBody>,
) -> ApiResult<(StatusCode, Json<ActivityEntry>)> {
    let request = RecordActivityRequest {
        actor: actor(&headers),
        action: body.action,
        kind: body.kind,
        details: body.details,
    };
    let entry = state.services.admin_service.record_activity(request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn system_stats(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(state.services.admin_service.system_stats().await?))
}

async fn cleanup(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<serde_json::Value>> {
    let actor = actor(&headers);
    Ok(Json(state.services.admin_service.cleanup(actor.as_deref()).await?))
}

async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let today = Utc::now().date_naive();
    Ok(Json(state.services.admin_service.dashboard(today).await?))
}
