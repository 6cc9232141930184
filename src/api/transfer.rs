//! Bulk import, export and template downloads

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::{actor, ApiResult, AppState};
use crate::export;
use crate::import::{parse_upload, ColumnMapping, SheetTable};
use crate::models::DonationFilter;
use crate::services::{ImportJob, ImportPreview};
use crate::utils::errors::{ChurchHubError, ImportError};
use crate::utils::helpers::sanitize_filename;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const EXPORT_PAGE: i64 = 500;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/import/preview", post(preview_import))
        .route("/import", post(start_import))
        .route("/import/:job_id", get(import_status))
        .route("/export/members.csv", get(export_members))
        .route("/export/donations.csv", get(export_donations))
        .route("/templates/members.csv", get(template_csv))
        .route("/templates/members.xlsx", get(template_xlsx))
}

#[derive(Debug, Serialize)]
pub struct ImportStarted {
    pub job_id: Uuid,
    pub total_rows: usize,
}

/// Fields of an import form
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
    mapping: Option<ColumnMapping>,
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> ChurchHubError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ImportError::TooLarge { max_bytes }.into()
    } else {
        ChurchHubError::InvalidInput(format!("Malformed upload: {}", e.body_text()))
    }
}

/// Collect the `file` part and, when present, a JSON `mapping` part
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> ApiResult<Upload> {
    let mut file = None;
    let mut mapping = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload.csv").to_string();
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;
                if bytes.len() > max_bytes {
                    return Err(ImportError::TooLarge { max_bytes }.into());
                }
                file = Some((file_name, bytes.to_vec()));
            }
            Some("mapping") => {
                let text = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
                if !text.trim().is_empty() {
                    let parsed: ColumnMapping = serde_json::from_str(&text)
                        .map_err(|e| ChurchHubError::InvalidInput(format!("Invalid column mapping: {}", e)))?;
                    mapping = Some(parsed);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file
        .ok_or_else(|| ChurchHubError::InvalidInput("Missing file field".to_string()))?;
    Ok(Upload { file_name, bytes, mapping })
}

fn ensure_import_enabled(state: &AppState) -> ApiResult<()> {
    if !state.settings.features.bulk_import {
        return Err(ChurchHubError::ServiceUnavailable("Bulk import is disabled".to_string()));
    }
    Ok(())
}

fn parse(upload: &Upload) -> ApiResult<SheetTable> {
    Ok(parse_upload(&upload.file_name, &upload.bytes)?)
}

async fn preview_import(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<ImportPreview>> {
    ensure_import_enabled(&state)?;
    let upload = read_upload(multipart, state.settings.import.max_upload_bytes).await?;
    let table = parse(&upload)?;

    info!(file = %upload.file_name, rows = table.len(), columns = table.width(), "Import preview");
    Ok(Json(ImportPreview::new(&table, state.settings.import.preview_rows)))
}

async fn start_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ImportStarted>)> {
    ensure_import_enabled(&state)?;
    let upload = read_upload(multipart, state.settings.import.max_upload_bytes).await?;
    let table = parse(&upload)?;

    let mapping = match upload.mapping {
        Some(mapping) => mapping.deduplicated(),
        None => ColumnMapping::auto_map(&table.headers),
    };
    let total_rows = table.len();

    let job_id = state.services.import_service
        .start(upload.file_name, table, mapping, actor(&headers))
        .await?;
    Ok((StatusCode::ACCEPTED, Json(ImportStarted { job_id, total_rows })))
}

async fn import_status(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> ApiResult<Json<ImportJob>> {
    Ok(Json(state.services.import_service.status(job_id).await?))
}

fn attachment(content_type: &'static str, file_name: &str, body: impl IntoResponse) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", sanitize_filename(file_name));
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type.to_string()), (header::CONTENT_DISPOSITION, disposition)],
        body,
    )
        .into_response()
}

async fn export_members(State(state): State<AppState>) -> ApiResult<Response> {
    let csv = export::members_csv(&state.services.database).await?;
    Ok(attachment(CSV_CONTENT_TYPE, "members.csv", csv))
}

async fn export_donations(State(state): State<AppState>) -> ApiResult<Response> {
    let service = &state.services.donation_service;
    let filter = DonationFilter::default();

    let mut donations = Vec::new();
    loop {
        let page = service.list(&filter, EXPORT_PAGE, donations.len() as i64).await?;
        let done = (page.len() as i64) < EXPORT_PAGE;
        donations.extend(page);
        if done {
            break;
        }
    }

    let csv = export::donations_csv(&donations)?;
    Ok(attachment(CSV_CONTENT_TYPE, "donations.csv", csv))
}

async fn template_csv() -> ApiResult<Response> {
    Ok(attachment(CSV_CONTENT_TYPE, "members_template.csv", export::template_csv()?))
}

async fn template_xlsx() -> ApiResult<Response> {
    Ok(attachment(XLSX_CONTENT_TYPE, "members_template.xlsx", export::template_xlsx()?))
}
