//! In-process member store
//!
//! Backs the import pipeline in tests and local dry runs without PostgreSQL.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::import::store::{MemberRecord, MemberStore};
use crate::models::{CreateMemberRequest, Group, Member, UpdateMemberRequest};
use crate::utils::errors::{ChurchHubError, Result};

#[derive(Debug, Default)]
struct Inner {
    members: Vec<Member>,
    groups: Vec<Group>,
    next_member_id: i64,
    next_group_id: i64,
    failing_emails: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell group and return it
    pub async fn add_group(&self, name: &str) -> Group {
        let mut inner = self.inner.lock().await;
        inner.next_group_id += 1;
        let now = Utc::now();
        let group = Group {
            id: inner.next_group_id,
            name: name.to_string(),
            description: None,
            kind: "cell".to_string(),
            category: None,
            leader_id: None,
            meeting_day: None,
            meeting_time: None,
            location: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.groups.push(group.clone());
        group
    }

    /// Make every write touching `email` fail
    pub async fn fail_writes_for(&self, email: &str) {
        self.inner.lock().await.failing_emails.insert(email.to_string());
    }

    pub async fn members(&self) -> Vec<Member> {
        self.inner.lock().await.members.clone()
    }

    pub async fn member_count(&self) -> usize {
        self.inner.lock().await.members.len()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>> {
        let inner = self.inner.lock().await;
        Ok(inner.members.iter().find(|m| m.email == email).cloned())
    }

    async fn insert_member(&self, request: CreateMemberRequest) -> Result<Member> {
        let mut inner = self.inner.lock().await;

        if inner.failing_emails.contains(&request.email) {
            return Err(ChurchHubError::ServiceUnavailable(format!("write rejected for {}", request.email)));
        }
        if inner.members.iter().any(|m| m.email == request.email) {
            return Err(ChurchHubError::Conflict(format!("email already registered: {}", request.email)));
        }

        inner.next_member_id += 1;
        let now = Utc::now();
        let member = Member {
            id: inner.next_member_id,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            role: request.role.unwrap_or_else(|| "member".to_string()),
            permissions: request.permissions.unwrap_or_default(),
            cell_group_id: request.cell_group_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.members.push(member.clone());
        Ok(member)
    }

    async fn update_member(&self, id: i64, request: UpdateMemberRequest) -> Result<Member> {
        let mut inner = self.inner.lock().await;
        let failing = inner.failing_emails.clone();

        let member = inner
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ChurchHubError::MemberNotFound { member_id: id })?;

        if failing.contains(&member.email) {
            return Err(ChurchHubError::ServiceUnavailable(format!("write rejected for {}", member.email)));
        }

        if let Some(first_name) = request.first_name {
            member.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            member.last_name = last_name;
        }
        if let Some(email) = request.email {
            member.email = email;
        }
        if let Some(phone) = request.phone {
            member.phone = Some(phone);
        }
        if let Some(role) = request.role {
            member.role = role;
        }
        if let Some(permissions) = request.permissions {
            member.permissions = permissions;
        }
        if let Some(cell_group_id) = request.cell_group_id {
            member.cell_group_id = Some(cell_group_id);
        }
        if let Some(is_active) = request.is_active {
            member.is_active = is_active;
        }
        member.updated_at = Utc::now();

        Ok(member.clone())
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        let inner = self.inner.lock().await;
        Ok(inner.groups.iter().find(|g| g.name == name).cloned())
    }

    async fn list_member_records(&self) -> Result<Vec<MemberRecord>> {
        let inner = self.inner.lock().await;

        let mut members: Vec<&Member> = inner.members.iter().collect();
        members.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(members
            .into_iter()
            .map(|m| MemberRecord {
                first_name: m.first_name.clone(),
                last_name: m.last_name.clone(),
                email: m.email.clone(),
                phone: m.phone.clone(),
                group_name: m
                    .cell_group_id
                    .and_then(|id| inner.groups.iter().find(|g| g.id == id))
                    .map(|g| g.name.clone()),
                role: m.role.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(email: &str) -> CreateMemberRequest {
        CreateMemberRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            phone: None,
            role: None,
            permissions: None,
            cell_group_id: None,
        }
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let store = MemoryStore::new();
        store.insert_member(request("ada@example.org")).await.unwrap();

        assert_matches!(
            store.insert_member(request("ada@example.org")).await,
            Err(ChurchHubError::Conflict(_))
        );
        assert!(store.find_member_by_email("ADA@example.org").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_absent_fields() {
        let store = MemoryStore::new();
        let mut create = request("ada@example.org");
        create.phone = Some("555".to_string());
        let member = store.insert_member(create).await.unwrap();

        let updated = store
            .update_member(member.id, UpdateMemberRequest {
                role: Some("elder".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("555"));
        assert_eq!(updated.role, "elder");
    }
}
