//! JSON HTTP API
//!
//! Routes are grouped per dashboard area; every handler delegates to a
//! service from the [`ServiceFactory`] and maps errors through
//! `ChurchHubError`'s `IntoResponse` impl.

pub mod error;
pub mod members;
pub mod groups;
pub mod events;
pub mod donations;
pub mod admin;
pub mod transfer;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::middleware::{rate_limit, request_logging, RateLimitMiddleware};
use crate::services::ServiceFactory;

/// Header the dashboard uses to name the acting administrator
pub const ACTOR_HEADER: &str = "x-actor";

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(services: ServiceFactory, settings: Settings) -> Self {
        Self {
            services: Arc::new(services),
            settings: Arc::new(settings),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, crate::utils::errors::ChurchHubError>;

/// Acting administrator named by the request, if any
pub fn actor(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Pagination query shared by list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    50
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: default_page(), page_size: default_page_size() }
    }
}

impl PageQuery {
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, 200) as i64
    }

    pub fn offset(&self) -> i64 {
        crate::utils::helpers::calculate_offset(self.page, self.limit() as usize) as i64
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let upload_limit = state.settings.import.max_upload_bytes + 64 * 1024;
    let limiter = RateLimitMiddleware::new(state.settings.features.rate_limit_per_minute);
    let cors = cors_layer(&state.settings.server.cors_origins);

    let api = Router::new()
        .merge(members::routes())
        .merge(groups::routes())
        .merge(events::routes())
        .merge(donations::routes())
        .merge(admin::routes())
        .merge(transfer::routes().layer(DefaultBodyLimit::max(upload_limit)))
        .layer(middleware::from_fn_with_state(limiter, rate_limit));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.services.health_check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(json!({
            "status": if status.is_healthy() { "ok" } else { "degraded" },
            "database": status.database_healthy,
            "database_latency_ms": status.database_latency_ms,
            "redis": status.redis_healthy,
            "issues": status.get_issues(),
        })),
    )
}

