//! Member service implementation
//!
//! This service handles the member directory: registration, profile edits,
//! activation, search, roles and permission grants.

use tracing::{info, debug};
use crate::database::repositories::MemberRepository;
use crate::models::admin::{has_permission, role_permissions, Permission};
use crate::models::member::{Member, CreateMemberRequest, UpdateMemberRequest, MemberFilter};
use crate::utils::errors::{ChurchHubError, Result};
use crate::utils::helpers::{calculate_offset, is_valid_email, non_empty};
use crate::utils::logging::log_member_action;

/// Shortest accepted search pattern
pub const MIN_SEARCH_LEN: usize = 2;
const SEARCH_LIMIT: i64 = 50;
const MAX_PAGE_SIZE: usize = 200;

/// Member service for directory operations
#[derive(Clone, Debug)]
pub struct MemberService {
    member_repository: MemberRepository,
    default_role: String,
}

impl MemberService {
    /// Create a new MemberService instance
    pub fn new(member_repository: MemberRepository, default_role: String) -> Self {
        Self {
            member_repository,
            default_role,
        }
    }

    /// Register a new member
    pub async fn create_member(&self, request: CreateMemberRequest) -> Result<Member> {
        let mut request = normalize_create(request)?;
        if request.role.is_none() {
            request.role = Some(self.default_role.clone());
        }

        if self.member_repository.find_by_email(&request.email).await?.is_some() {
            return Err(ChurchHubError::Conflict(format!("A member with email {} already exists", request.email)));
        }

        let member = self.member_repository.create(request).await?;
        log_member_action(member.id, "created", Some(&member.email));
        Ok(member)
    }

    /// Get member by ID
    pub async fn get_member(&self, member_id: i64) -> Result<Member> {
        debug!(member_id = member_id, "Getting member by ID");
        self.member_repository.find_by_id(member_id).await?
            .ok_or(ChurchHubError::MemberNotFound { member_id })
    }

    /// Update member profile; absent fields are left untouched
    pub async fn update_member(&self, member_id: i64, request: UpdateMemberRequest) -> Result<Member> {
        let request = normalize_update(request)?;

        if let Some(email) = &request.email {
            if let Some(other) = self.member_repository.find_by_email(email).await? {
                if other.id != member_id {
                    return Err(ChurchHubError::Conflict(format!("A member with email {} already exists", email)));
                }
            }
        }

        let member = self.member_repository.update(member_id, request).await?;
        log_member_action(member_id, "updated", None);
        Ok(member)
    }

    /// Mark member inactive without deleting their history
    pub async fn deactivate_member(&self, member_id: i64) -> Result<Member> {
        let member = self.member_repository.update(member_id, UpdateMemberRequest {
            is_active: Some(false),
            ..Default::default()
        }).await?;

        info!(member_id = member_id, "Member deactivated");
        log_member_action(member_id, "deactivated", None);
        Ok(member)
    }

    /// Mark member active again
    pub async fn reactivate_member(&self, member_id: i64) -> Result<Member> {
        let member = self.member_repository.update(member_id, UpdateMemberRequest {
            is_active: Some(true),
            ..Default::default()
        }).await?;

        log_member_action(member_id, "reactivated", None);
        Ok(member)
    }

    /// Delete member permanently
    pub async fn delete_member(&self, member_id: i64) -> Result<()> {
        if !self.member_repository.delete(member_id).await? {
            return Err(ChurchHubError::MemberNotFound { member_id });
        }

        log_member_action(member_id, "deleted", None);
        Ok(())
    }

    /// List members, one page at a time (pages start at 1)
    pub async fn list_members(&self, filter: &MemberFilter, page: usize, page_size: usize) -> Result<Vec<Member>> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = calculate_offset(page, page_size);
        self.member_repository.list(filter, page_size as i64, offset as i64).await
    }

    /// Search members by name, surname or email
    pub async fn search_members(&self, pattern: &str) -> Result<Vec<Member>> {
        let pattern = pattern.trim();
        if pattern.chars().count() < MIN_SEARCH_LEN {
            return Err(ChurchHubError::InvalidInput(format!(
                "Search pattern must be at least {} characters",
                MIN_SEARCH_LEN
            )));
        }

        debug!(pattern = %pattern, "Searching members");
        self.member_repository.search(pattern, SEARCH_LIMIT).await
    }

    /// Change a member's role
    pub async fn set_role(&self, member_id: i64, role: &str) -> Result<Member> {
        let role = role.trim();
        if role.is_empty() {
            return Err(ChurchHubError::InvalidInput("Role cannot be empty".to_string()));
        }

        let member = self.member_repository.update(member_id, UpdateMemberRequest {
            role: Some(role.to_string()),
            ..Default::default()
        }).await?;

        log_member_action(member_id, "role_changed", Some(role));
        Ok(member)
    }

    /// Replace explicit permission grants
    pub async fn set_permissions(&self, member_id: i64, permissions: &[Permission]) -> Result<Member> {
        let mut grants: Vec<String> = permissions.iter().map(|p| p.as_str().to_string()).collect();
        grants.sort();
        grants.dedup();

        let member = self.member_repository.set_permissions(member_id, grants).await?;
        log_member_action(member_id, "permissions_changed", None);
        Ok(member)
    }

    /// Role defaults plus explicit grants
    pub async fn effective_permissions(&self, member_id: i64) -> Result<Vec<Permission>> {
        let member = self.get_member(member_id).await?;
        Ok(effective_permissions(&member))
    }

    /// Fail with `PermissionDenied` unless the member holds `permission`
    pub async fn require_permission(&self, member_id: i64, permission: Permission) -> Result<()> {
        let member = self.get_member(member_id).await?;
        if !member.is_active || !has_permission(&member.role, &member.permissions, permission) {
            return Err(ChurchHubError::PermissionDenied(format!(
                "{} lacks {}",
                member.full_name(),
                permission
            )));
        }
        Ok(())
    }
}

/// Permissions a member holds through role and grants
pub fn effective_permissions(member: &Member) -> Vec<Permission> {
    let mut permissions = role_permissions(&member.role);
    for permission in Permission::ALL {
        if member.permissions.iter().any(|grant| grant == permission.as_str()) && !permissions.contains(&permission) {
            permissions.push(permission);
        }
    }
    permissions
}

fn required(value: String, field: &str) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ChurchHubError::InvalidInput(format!("{} is required", field)));
    }
    Ok(value)
}

fn check_email(email: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(ChurchHubError::InvalidInput(format!("Invalid email address: {}", email)));
    }
    Ok(())
}

/// Trim and validate a new member form
pub fn normalize_create(request: CreateMemberRequest) -> Result<CreateMemberRequest> {
    let email = required(request.email, "Email")?;
    check_email(&email)?;

    Ok(CreateMemberRequest {
        first_name: required(request.first_name, "First name")?,
        last_name: required(request.last_name, "Surname")?,
        email,
        phone: non_empty(request.phone),
        role: non_empty(request.role),
        permissions: request.permissions,
        cell_group_id: request.cell_group_id,
    })
}

/// Trim and validate an edit form; blank strings count as absent
pub fn normalize_update(request: UpdateMemberRequest) -> Result<UpdateMemberRequest> {
    let email = non_empty(request.email);
    if let Some(email) = &email {
        check_email(email)?;
    }

    Ok(UpdateMemberRequest {
        first_name: non_empty(request.first_name),
        last_name: non_empty(request.last_name),
        email,
        phone: non_empty(request.phone),
        role: non_empty(request.role),
        ..request
    })
}
