//! Donation service

use chrono::NaiveDate;
use tracing::info;
use crate::database::DatabaseService;
use crate::models::donation::{CreateDonationRequest, Donation, DonationFilter, DonationTotals};
use crate::utils::errors::{ChurchHubError, Result};

#[derive(Clone, Debug)]
pub struct DonationService {
    database: DatabaseService,
    enabled: bool,
}

impl DonationService {
    pub fn new(database: DatabaseService, enabled: bool) -> Self {
        Self { database, enabled }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if !self.enabled {
            return Err(ChurchHubError::ServiceUnavailable("Donations are disabled".to_string()));
        }
        Ok(())
    }

    pub async fn record(&self, mut request: CreateDonationRequest) -> Result<Donation> {
        self.ensure_enabled()?;
        validate_donation(&mut request)?;

        if let Some(donor_id) = request.donor_id {
            if self.database.members.find_by_id(donor_id).await?.is_none() {
                return Err(ChurchHubError::MemberNotFound { member_id: donor_id });
            }
        }

        let donation = self.database.donations.create(request).await?;
        info!(donation_id = donation.id, amount_cents = donation.amount_cents, "Donation recorded");
        Ok(donation)
    }

    pub async fn get(&self, donation_id: i64) -> Result<Donation> {
        self.ensure_enabled()?;
        self.database.donations.find_by_id(donation_id).await?
            .ok_or(ChurchHubError::DonationNotFound { donation_id })
    }

    pub async fn list(&self, filter: &DonationFilter, limit: i64, offset: i64) -> Result<Vec<Donation>> {
        self.ensure_enabled()?;
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ChurchHubError::InvalidInput("Start date is after end date".to_string()));
            }
        }
        self.database.donations.list(filter, limit, offset).await
    }

    pub async fn by_donor(&self, donor_id: i64) -> Result<Vec<Donation>> {
        self.ensure_enabled()?;
        if self.database.members.find_by_id(donor_id).await?.is_none() {
            return Err(ChurchHubError::MemberNotFound { member_id: donor_id });
        }
        self.database.donations.list_by_donor(donor_id).await
    }

    pub async fn totals_since(&self, since: NaiveDate) -> Result<DonationTotals> {
        self.ensure_enabled()?;
        self.database.donations.totals_since(since).await
    }

    pub async fn delete(&self, donation_id: i64) -> Result<()> {
        self.ensure_enabled()?;
        if !self.database.donations.delete(donation_id).await? {
            return Err(ChurchHubError::DonationNotFound { donation_id });
        }
        info!(donation_id, "Donation deleted");
        Ok(())
    }
}

/// Trim names and reject non-positive amounts
pub fn validate_donation(request: &mut CreateDonationRequest) -> Result<()> {
    request.donor_name = request.donor_name.trim().to_string();
    if request.donor_name.is_empty() {
        request.donor_name = "Anonymous".to_string();
    }
    if request.amount_cents <= 0 {
        return Err(ChurchHubError::InvalidInput("Donation amount must be positive".to_string()));
    }
    Ok(())
}
