//! Storage seam used by the import pipeline and the CSV export

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{CreateMemberRequest, Group, Member, UpdateMemberRequest};
use crate::utils::errors::Result;

/// Member row in the shape of the exported spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MemberRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub group_name: Option<String>,
    pub role: String,
}

/// Member persistence operations needed by bulk import and export
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Exact, case-sensitive email lookup
    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>>;

    async fn insert_member(&self, request: CreateMemberRequest) -> Result<Member>;

    /// Partial update; `None` fields keep their stored value
    async fn update_member(&self, id: i64, request: UpdateMemberRequest) -> Result<Member>;

    /// Exact group name lookup
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>>;

    /// All members ordered by surname, name, id
    async fn list_member_records(&self) -> Result<Vec<MemberRecord>>;
}

#[async_trait]
impl<T: MemberStore + ?Sized> MemberStore for Arc<T> {
    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>> {
        (**self).find_member_by_email(email).await
    }

    async fn insert_member(&self, request: CreateMemberRequest) -> Result<Member> {
        (**self).insert_member(request).await
    }

    async fn update_member(&self, id: i64, request: UpdateMemberRequest) -> Result<Member> {
        (**self).update_member(id, request).await
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        (**self).find_group_by_name(name).await
    }

    async fn list_member_records(&self) -> Result<Vec<MemberRecord>> {
        (**self).list_member_records().await
    }
}
