//! Database service layer
//!
//! This module provides a high-level interface to database operations

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use crate::database::{DatabasePool, MemberRepository, GroupRepository, EventRepository, DonationRepository, AdminRepository};
use crate::import::{MemberRecord, MemberStore};
use crate::models::*;
use crate::utils::errors::ChurchHubError;
use crate::utils::helpers::{month_start, year_start};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub members: MemberRepository,
    pub groups: GroupRepository,
    pub events: EventRepository,
    pub donations: DonationRepository,
    pub admin: AdminRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            donations: DonationRepository::new(pool.clone()),
            admin: AdminRepository::new(pool),
        }
    }

    /// Add a member to a group, rejecting duplicates
    pub async fn add_member_to_group(&self, group_id: i64, member_id: i64, role: Option<GroupRole>) -> Result<GroupMember, ChurchHubError> {
        if self.groups.find_by_id(group_id).await?.is_none() {
            return Err(ChurchHubError::GroupNotFound { group_id });
        }
        if self.members.find_by_id(member_id).await?.is_none() {
            return Err(ChurchHubError::MemberNotFound { member_id });
        }
        if self.groups.is_member(group_id, member_id).await? {
            return Err(ChurchHubError::Conflict("Member already belongs to this group".to_string()));
        }

        let request = AddGroupMemberRequest { group_id, member_id, role };
        self.groups.add_member(request).await
    }

    /// Check a member in at an event
    pub async fn register_attendee(&self, request: RegisterAttendeeRequest) -> Result<EventAttendee, ChurchHubError> {
        let event = self.events.find_by_id(request.event_id).await?
            .ok_or(ChurchHubError::EventNotFound { event_id: request.event_id })?;

        if !event.is_active {
            return Err(ChurchHubError::InvalidInput("Event is not active".to_string()));
        }

        if self.members.find_by_id(request.member_id).await?.is_none() {
            return Err(ChurchHubError::MemberNotFound { member_id: request.member_id });
        }

        if self.events.is_attendee(request.event_id, request.member_id).await? {
            return Err(ChurchHubError::Conflict("Member already checked in to this event".to_string()));
        }

        self.events.register_attendee(request).await
    }

    /// Headline statistics for the dashboard, relative to `today`
    pub async fn get_dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats, ChurchHubError> {
        let month = month_start(today);
        let year = year_start(today);
        let month_start_utc = Utc.from_utc_datetime(&month.and_hms_opt(0, 0, 0).unwrap_or_default());

        let month_totals = self.donations.totals_since(month).await?;
        let year_totals = self.donations.totals_since(year).await?;

        Ok(DashboardStats {
            total_members: self.members.count(false).await?,
            active_members: self.members.count(true).await?,
            new_members_this_month: self.members.count_created_since(month_start_utc).await?,
            cell_groups: self.groups.count_active(GroupKind::Cell).await?,
            ministries: self.groups.count_active(GroupKind::Ministry).await?,
            departments: self.groups.count_active(GroupKind::Department).await?,
            upcoming_events: self.events.count_upcoming(today).await?,
            first_timers_this_month: self.events.count_first_timers_since(month).await?,
            donations_this_month_cents: month_totals.total_cents,
            donations_this_year_cents: year_totals.total_cents,
            average_donation_cents: year_totals.average_cents,
        })
    }

    /// Get system statistics
    pub async fn get_system_stats(&self) -> Result<serde_json::Value, ChurchHubError> {
        self.admin.get_stats().await
    }

    /// Trim the activity feed
    pub async fn cleanup_expired_data(&self) -> Result<serde_json::Value, ChurchHubError> {
        let old_activity = self.admin.clean_old_activity(90).await?;

        Ok(serde_json::json!({
            "old_activity_cleaned": old_activity
        }))
    }
}

#[async_trait]
impl MemberStore for DatabaseService {
    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, ChurchHubError> {
        self.members.find_by_email(email).await
    }

    async fn insert_member(&self, request: CreateMemberRequest) -> Result<Member, ChurchHubError> {
        self.members.create(request).await
    }

    async fn update_member(&self, id: i64, request: UpdateMemberRequest) -> Result<Member, ChurchHubError> {
        self.members.update(id, request).await
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, ChurchHubError> {
        self.groups.find_by_name(name).await
    }

    async fn list_member_records(&self) -> Result<Vec<MemberRecord>, ChurchHubError> {
        self.members.list_export_records().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_surfaces_database_errors() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(300))
            .connect_lazy("postgresql://churchhub@127.0.0.1:1/churchhub")
            .unwrap();
        let service = DatabaseService::new(pool);
        let store: &dyn MemberStore = &service;

        let lookup = store.find_member_by_email("nobody@church.local").await;
        assert!(matches!(lookup, Err(ChurchHubError::Database(_))));

        let export = store.list_member_records().await;
        assert!(matches!(export, Err(ChurchHubError::Database(_))));
    }
}
