//! Donation model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// A recorded gift. Amounts are stored in minor units (cents).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: i64,
    pub donor_id: Option<i64>,
    pub donor_name: String,
    pub amount_cents: i64,
    pub donation_date: NaiveDate,
    pub purpose: String,
    pub method: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonationRequest {
    pub donor_id: Option<i64>,
    pub donor_name: String,
    pub amount_cents: i64,
    pub donation_date: NaiveDate,
    pub purpose: Option<String>,
    pub method: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonationFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub purpose: Option<String>,
}

/// Totals for a reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationTotals {
    pub count: i64,
    pub total_cents: i64,
    pub average_cents: i64,
}

impl DonationTotals {
    pub fn from_sum(count: i64, total_cents: i64) -> Self {
        let average_cents = if count > 0 { total_cents / count } else { 0 };
        Self { count, total_cents, average_cents }
    }
}

pub const DEFAULT_PURPOSE: &str = "General Fund";
pub const DEFAULT_METHOD: &str = "Cash";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_average() {
        assert_eq!(DonationTotals::from_sum(0, 0).average_cents, 0);
        assert_eq!(DonationTotals::from_sum(4, 130000).average_cents, 32500);
    }
}
