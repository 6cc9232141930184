//! Donation ledger endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::api::{ApiResult, AppState, PageQuery};
use crate::models::donation::{CreateDonationRequest, Donation, DonationFilter, DonationTotals};
use crate::utils::errors::ChurchHubError;
use crate::utils::helpers::{parse_amount, year_start};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/donations", get(list_donations).post(record_donation))
        .route("/donations/totals", get(totals))
        .route("/donations/:id", get(get_donation).delete(delete_donation))
        .route("/members/:id/donations", get(donor_history))
}

#[derive(Debug, Deserialize)]
pub struct DonationListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub purpose: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Donation form; the amount may come as cents or as a decimal string
#[derive(Debug, Deserialize)]
pub struct DonationBody {
    pub donor_id: Option<i64>,
    #[serde(default)]
    pub donor_name: String,
    pub amount_cents: Option<i64>,
    pub amount: Option<String>,
    pub donation_date: Option<NaiveDate>,
    pub purpose: Option<String>,
    pub method: Option<String>,
    pub note: Option<String>,
}

impl DonationBody {
    fn into_request(self, today: NaiveDate) -> Result<CreateDonationRequest, ChurchHubError> {
        let amount_cents = match (self.amount_cents, self.amount.as_deref()) {
            (Some(cents), _) => cents,
            (None, Some(text)) => parse_amount(text)
                .ok_or_else(|| ChurchHubError::InvalidInput(format!("Invalid amount: {}", text)))?,
            (None, None) => return Err(ChurchHubError::InvalidInput("Donation amount is required".to_string())),
        };

        Ok(CreateDonationRequest {
            donor_id: self.donor_id,
            donor_name: self.donor_name,
            amount_cents,
            donation_date: self.donation_date.unwrap_or(today),
            purpose: self.purpose,
            method: self.method,
            note: self.note,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TotalsQuery {
    pub since: Option<NaiveDate>,
}

async fn list_donations(
    State(state): State<AppState>,
    Query(query): Query<DonationListQuery>,
) -> ApiResult<Json<Vec<Donation>>> {
    let defaults = PageQuery::default();
    let page = PageQuery {
        page: query.page.unwrap_or(defaults.page),
        page_size: query.page_size.unwrap_or(defaults.page_size),
    };
    let filter = DonationFilter {
        from: query.from,
        to: query.to,
        purpose: query.purpose,
    };

    let donations = state.services.donation_service
        .list(&filter, page.limit(), page.offset())
        .await?;
    Ok(Json(donations))
}

async fn record_donation(
    State(state): State<AppState>,
    Json(body): Json<DonationBody>,
) -> ApiResult<(StatusCode, Json<Donation>)> {
    let request = body.into_request(Utc::now().date_naive())?;
    let donation = state.services.donation_service.record(request).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

async fn get_donation(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Donation>> {
    Ok(Json(state.services.donation_service.get(id).await?))
}

async fn delete_donation(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.services.donation_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn donor_history(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Vec<Donation>>> {
    Ok(Json(state.services.donation_service.by_donor(id).await?))
}

/// Year-to-date unless `since` is given
async fn totals(
    State(state): State<AppState>,
    Query(query): Query<TotalsQuery>,
) -> ApiResult<Json<DonationTotals>> {
    let since = query.since.unwrap_or_else(|| year_start(Utc::now().date_naive()));
    Ok(Json(state.services.donation_service.totals_since(since).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn body(json: serde_json::Value) -> DonationBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_decimal_amount_is_parsed() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let request = body(serde_json::json!({ "donor_name": "Ada", "amount": "1,250.50" }))
            .into_request(today)
            .unwrap();

        assert_eq!(request.amount_cents, 125050);
        assert_eq!(request.donation_date, today);
    }

    #[test]
    fn test_cents_win_over_text() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let request = body(serde_json::json!({ "amount_cents": 500, "amount": "99" }))
            .into_request(today)
            .unwrap();
        assert_eq!(request.amount_cents, 500);
    }

    #[test]
    fn test_missing_or_bad_amount() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_matches!(
            body(serde_json::json!({ "donor_name": "Ada" })).into_request(today),
            Err(ChurchHubError::InvalidInput(_))
        );
        assert_matches!(
            body(serde_json::json!({ "amount": "ten" })).into_request(today),
            Err(ChurchHubError::InvalidInput(_))
        );
    }
}
