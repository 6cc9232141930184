//! Donation repository implementation

use sqlx::PgPool;
use chrono::{NaiveDate, Utc};
use crate::models::donation::{Donation, CreateDonationRequest, DonationFilter, DonationTotals, DEFAULT_PURPOSE, DEFAULT_METHOD};
use crate::utils::errors::ChurchHubError;

#[derive(Clone)]
#[derive(Debug)]
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a donation
    pub async fn create(&self, request: CreateDonationRequest) -> Result<Donation, ChurchHubError> {
        if request.amount_cents <= 0 {
            return Err(ChurchHubError::InvalidInput("Donation amount must be positive".to_string()));
        }

        let donation = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (donor_id, donor_name, amount_cents, donation_date, purpose, method, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, donor_id, donor_name, amount_cents, donation_date, purpose, method, note, created_at
            "#
        )
        .bind(request.donor_id)
        .bind(request.donor_name)
        .bind(request.amount_cents)
        .bind(request.donation_date)
        .bind(request.purpose.unwrap_or_else(|| DEFAULT_PURPOSE.to_string()))
        .bind(request.method.unwrap_or_else(|| DEFAULT_METHOD.to_string()))
        .bind(request.note)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(donation)
    }

    /// Find donation by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Donation>, ChurchHubError> {
        let donation = sqlx::query_as::<_, Donation>(
            "SELECT id, donor_id, donor_name, amount_cents, donation_date, purpose, method, note, created_at FROM donations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(donation)
    }

    /// Delete donation
    pub async fn delete(&self, id: i64) -> Result<bool, ChurchHubError> {
        let result = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List donations matching a filter, newest first
    pub async fn list(&self, filter: &DonationFilter, limit: i64, offset: i64) -> Result<Vec<Donation>, ChurchHubError> {
        let donations = sqlx::query_as::<_, Donation>(
            r#"
            SELECT id, donor_id, donor_name, amount_cents, donation_date, purpose, method, note, created_at
            FROM donations
            WHERE ($1::DATE IS NULL OR donation_date >= $1)
              AND ($2::DATE IS NULL OR donation_date <= $2)
              AND ($3::TEXT IS NULL OR purpose = $3)
            ORDER BY donation_date DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.purpose.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(donations)
    }

    /// Count, sum and average of donations on or after a date
    pub async fn totals_since(&self, since: NaiveDate) -> Result<DonationTotals, ChurchHubError> {
        let (count, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(amount_cents), 0)::BIGINT FROM donations WHERE donation_date >= $1"
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(DonationTotals::from_sum(count, total))
    }

    /// Donations given by a member
    pub async fn list_by_donor(&self, donor_id: i64) -> Result<Vec<Donation>, ChurchHubError> {
        let donations = sqlx::query_as::<_, Donation>(
            "SELECT id, donor_id, donor_name, amount_cents, donation_date, purpose, method, note, created_at FROM donations WHERE donor_id = $1 ORDER BY donation_date DESC"
        )
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(donations)
    }
}
