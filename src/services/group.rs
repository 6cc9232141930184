//! Group service: cell groups, ministries and departments

use tracing::debug;
use crate::database::DatabaseService;
use crate::models::group::{
    normalize_meeting_day, Group, GroupKind, GroupMember, GroupRole, GroupSummary,
    CreateGroupRequest, UpdateGroupRequest,
};
use crate::utils::errors::{ChurchHubError, Result};
use crate::utils::logging::log_group_event;

#[derive(Clone, Debug)]
pub struct GroupService {
    database: DatabaseService,
}

impl GroupService {
    pub fn new(database: DatabaseService) -> Self {
        Self { database }
    }

    pub async fn create_group(&self, mut request: CreateGroupRequest) -> Result<Group> {
        request.name = request.name.trim().to_string();
        if request.name.is_empty() {
            return Err(ChurchHubError::InvalidInput("Group name is required".to_string()));
        }
        request.meeting_day = request.meeting_day.as_deref().map(check_meeting_day).transpose()?;

        let group = self.database.groups.create(request).await?;
        log_group_event(group.id, "created", group.leader_id);
        Ok(group)
    }

    pub async fn get_group(&self, group_id: i64) -> Result<Group> {
        self.database.groups.find_by_id(group_id).await?
            .ok_or(ChurchHubError::GroupNotFound { group_id })
    }

    pub async fn update_group(&self, group_id: i64, mut request: UpdateGroupRequest) -> Result<Group> {
        request.meeting_day = request.meeting_day.as_deref().map(check_meeting_day).transpose()?;

        let group = self.database.groups.update(group_id, request).await?;
        log_group_event(group_id, "updated", None);
        Ok(group)
    }

    pub async fn delete_group(&self, group_id: i64) -> Result<()> {
        if !self.database.groups.delete(group_id).await? {
            return Err(ChurchHubError::GroupNotFound { group_id });
        }
        log_group_event(group_id, "deleted", None);
        Ok(())
    }

    /// Groups with member counts, optionally only one kind
    pub async fn list_groups(&self, kind: Option<GroupKind>, active_only: bool) -> Result<Vec<GroupSummary>> {
        debug!(kind = ?kind, active_only, "Listing groups");
        self.database.groups.list(kind, active_only).await
    }

    pub async fn add_member(&self, group_id: i64, member_id: i64, role: Option<GroupRole>) -> Result<GroupMember> {
        let membership = self.database.add_member_to_group(group_id, member_id, role).await?;
        log_group_event(group_id, "member_added", Some(member_id));
        Ok(membership)
    }

    pub async fn remove_member(&self, group_id: i64, member_id: i64) -> Result<()> {
        if !self.database.groups.remove_member(group_id, member_id).await? {
            return Err(ChurchHubError::InvalidInput(format!(
                "Member {} is not in group {}",
                member_id, group_id
            )));
        }

        let member = self.database.members.find_by_id(member_id).await?;
        if member.and_then(|m| m.cell_group_id) == Some(group_id) {
            self.database.members.clear_cell_group(member_id).await?;
        }
        log_group_event(group_id, "member_removed", Some(member_id));
        Ok(())
    }

    pub async fn members(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        self.get_group(group_id).await?;
        self.database.groups.get_members(group_id).await
    }

    pub async fn member_count(&self, group_id: i64) -> Result<i64> {
        self.database.groups.member_count(group_id).await
    }

    /// Appoint a leader; the leader becomes a member of the group if needed
    pub async fn set_leader(&self, group_id: i64, member_id: i64) -> Result<Group> {
        if self.database.members.find_by_id(member_id).await?.is_none() {
            return Err(ChurchHubError::MemberNotFound { member_id });
        }

        let group = self.database.groups.set_leader(group_id, member_id).await?;
        log_group_event(group_id, "leader_set", Some(member_id));
        Ok(group)
    }
}

fn check_meeting_day(day: &str) -> Result<String> {
    normalize_meeting_day(day)
        .map(str::to_string)
        .ok_or_else(|| ChurchHubError::InvalidInput(format!("Unknown meeting day: {}", day)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_meeting_day() {
        assert_eq!(check_meeting_day("wednesday").unwrap(), "Wednesday");
        assert!(check_meeting_day("Caturday").is_err());
    }
}
