//! Group repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::group::{Group, GroupMember, GroupSummary, GroupKind, CreateGroupRequest, UpdateGroupRequest, AddGroupMemberRequest, GroupRole};
use crate::utils::errors::ChurchHubError;

#[derive(Clone)]
#[derive(Debug)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new group
    pub async fn create(&self, request: CreateGroupRequest) -> Result<Group, ChurchHubError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, description, kind, category, leader_id, meeting_day, meeting_time, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, description, kind, category, leader_id, meeting_day, meeting_time, location, is_active, created_at, updated_at
            "#
        )
        .bind(request.name)
        .bind(request.description)
        .bind(request.kind.as_str())
        .bind(request.category)
        .bind(request.leader_id)
        .bind(request.meeting_day)
        .bind(request.meeting_time)
        .bind(request.location)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Find group by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Group>, ChurchHubError> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, description, kind, category, leader_id, meeting_day, meeting_time, location, is_active, created_at, updated_at FROM groups WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Find group by exact name; the oldest group wins when names repeat
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Group>, ChurchHubError> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, description, kind, category, leader_id, meeting_day, meeting_time, location, is_active, created_at, updated_at FROM groups WHERE name = $1 ORDER BY id ASC LIMIT 1"
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Update group
    pub async fn update(&self, id: i64, request: UpdateGroupRequest) -> Result<Group, ChurchHubError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                leader_id = COALESCE($5, leader_id),
                meeting_day = COALESCE($6, meeting_day),
                meeting_time = COALESCE($7, meeting_time),
                location = COALESCE($8, location),
                is_active = COALESCE($9, is_active),
                updated_at = $10
            WHERE id = $1
            RETURNING id, name, description, kind, category, leader_id, meeting_day, meeting_time, location, is_active, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.category)
        .bind(request.leader_id)
        .bind(request.meeting_day)
        .bind(request.meeting_time)
        .bind(request.location)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        group.ok_or(ChurchHubError::GroupNotFound { group_id: id })
    }

    /// Delete group
    pub async fn delete(&self, id: i64) -> Result<bool, ChurchHubError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List groups of one kind, or all groups, with member counts
    pub async fn list(&self, kind: Option<GroupKind>, active_only: bool) -> Result<Vec<GroupSummary>, ChurchHubError> {
        let groups = sqlx::query_as::<_, GroupSummary>(
            r#"
            SELECT g.id, g.name, g.kind, g.category, g.leader_id, g.meeting_day, g.meeting_time, g.location,
                   COUNT(gm.id) AS member_count
            FROM groups g
            LEFT JOIN group_members gm ON gm.group_id = g.id
            WHERE ($1::TEXT IS NULL OR g.kind = $1)
              AND ($2 = false OR g.is_active = true)
            GROUP BY g.id
            ORDER BY g.name ASC, g.id ASC
            "#
        )
        .bind(kind.map(|k| k.as_str()))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// Count active groups of a kind
    pub async fn count_active(&self, kind: GroupKind) -> Result<i64, ChurchHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM groups WHERE kind = $1 AND is_active = true"
        )
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Add member to group
    pub async fn add_member(&self, request: AddGroupMemberRequest) -> Result<GroupMember, ChurchHubError> {
        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            INSERT INTO group_members (group_id, member_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, group_id, member_id, role, joined_at
            "#
        )
        .bind(request.group_id)
        .bind(request.member_id)
        .bind(request.role.unwrap_or(GroupRole::Member).as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    /// Remove member from group
    pub async fn remove_member(&self, group_id: i64, member_id: i64) -> Result<bool, ChurchHubError> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND member_id = $2")
            .bind(group_id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get group members
    pub async fn get_members(&self, group_id: i64) -> Result<Vec<GroupMember>, ChurchHubError> {
        let members = sqlx::query_as::<_, GroupMember>(
            "SELECT id, group_id, member_id, role, joined_at FROM group_members WHERE group_id = $1 ORDER BY joined_at ASC"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Check if member belongs to group
    pub async fn is_member(&self, group_id: i64, member_id: i64) -> Result<bool, ChurchHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM group_members WHERE group_id = $1 AND member_id = $2"
        )
        .bind(group_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Get member count for group
    pub async fn member_count(&self, group_id: i64) -> Result<i64, ChurchHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Make a member the leader of a group, recording the leader role on the membership
    pub async fn set_leader(&self, group_id: i64, member_id: i64) -> Result<Group, ChurchHubError> {
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups SET leader_id = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, description, kind, category, leader_id, meeting_day, meeting_time, location, is_active, created_at, updated_at
            "#
        )
        .bind(group_id)
        .bind(member_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ChurchHubError::GroupNotFound { group_id })?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, member_id, role, joined_at)
            VALUES ($1, $2, 'leader', $3)
            ON CONFLICT (group_id, member_id) DO UPDATE SET role = 'leader'
            "#
        )
        .bind(group_id)
        .bind(member_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(group)
    }
}
