//! Member repository implementation

use std::time::Instant;

use sqlx::PgPool;
use chrono::Utc;
use crate::import::MemberRecord;
use crate::models::member::{Member, CreateMemberRequest, UpdateMemberRequest, MemberFilter};
use crate::utils::errors::ChurchHubError;
use crate::utils::logging::log_database_operation;

#[derive(Clone)]
#[derive(Debug)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new member
    pub async fn create(&self, request: CreateMemberRequest) -> Result<Member, ChurchHubError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (first_name, last_name, email, phone, role, permissions, cell_group_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, first_name, last_name, email, phone, role, permissions, cell_group_id, is_active, created_at, updated_at
            "#
        )
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.role.unwrap_or_else(|| "member".to_string()))
        .bind(request.permissions.unwrap_or_default())
        .bind(request.cell_group_id)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    /// Find member by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Member>, ChurchHubError> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT id, first_name, last_name, email, phone, role, permissions, cell_group_id, is_active, created_at, updated_at FROM members WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Find member by email (exact, case-sensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Member>, ChurchHubError> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT id, first_name, last_name, email, phone, role, permissions, cell_group_id, is_active, created_at, updated_at FROM members WHERE email = $1"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Update member; absent fields keep their stored value
    pub async fn update(&self, id: i64, request: UpdateMemberRequest) -> Result<Member, ChurchHubError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                role = COALESCE($6, role),
                permissions = COALESCE($7, permissions),
                cell_group_id = COALESCE($8, cell_group_id),
                is_active = COALESCE($9, is_active),
                updated_at = $10
            WHERE id = $1
            RETURNING id, first_name, last_name, email, phone, role, permissions, cell_group_id, is_active, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.role)
        .bind(request.permissions)
        .bind(request.cell_group_id)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        member.ok_or(ChurchHubError::MemberNotFound { member_id: id })
    }

    /// Remove member from their cell group
    pub async fn clear_cell_group(&self, id: i64) -> Result<(), ChurchHubError> {
        sqlx::query("UPDATE members SET cell_group_id = NULL, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete member
    pub async fn delete(&self, id: i64) -> Result<bool, ChurchHubError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List members with filters and pagination
    pub async fn list(&self, filter: &MemberFilter, limit: i64, offset: i64) -> Result<Vec<Member>, ChurchHubError> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, first_name, last_name, email, phone, role, permissions, cell_group_id, is_active, created_at, updated_at
            FROM members
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
              AND ($2::BIGINT IS NULL OR cell_group_id = $2)
              AND ($3::TEXT IS NULL OR role = $3)
            ORDER BY last_name ASC, first_name ASC, id ASC
            LIMIT $4 OFFSET $5
            "#
        )
        .bind(filter.is_active)
        .bind(filter.cell_group_id)
        .bind(filter.role.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Count members, optionally only active ones
    pub async fn count(&self, active_only: bool) -> Result<i64, ChurchHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM members WHERE ($1 = false OR is_active = true)"
        )
        .bind(active_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Case-insensitive search over name, surname, full name and email
    pub async fn search(&self, pattern: &str, limit: i64) -> Result<Vec<Member>, ChurchHubError> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, first_name, last_name, email, phone, role, permissions, cell_group_id, is_active, created_at, updated_at
            FROM members
            WHERE first_name ILIKE $1
               OR last_name ILIKE $1
               OR email ILIKE $1
               OR (first_name || ' ' || last_name) ILIKE $1
            ORDER BY last_name ASC, first_name ASC, id ASC
            LIMIT $2
            "#
        )
        .bind(format!("%{}%", pattern))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Replace the explicit permission grants of a member
    pub async fn set_permissions(&self, id: i64, permissions: Vec<String>) -> Result<Member, ChurchHubError> {
        self.update(id, UpdateMemberRequest {
            permissions: Some(permissions),
            ..Default::default()
        }).await
    }

    /// Members in the shape used by CSV export, with their group name resolved
    pub async fn list_export_records(&self) -> Result<Vec<MemberRecord>, ChurchHubError> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, MemberRecord>(
            r#"
            SELECT m.first_name, m.last_name, m.email, m.phone, g.name AS group_name, m.role
            FROM members m
            LEFT JOIN groups g ON g.id = m.cell_group_id
            ORDER BY m.last_name ASC, m.first_name ASC, m.id ASC
            "#
        )
        .fetch_all(&self.pool)
        .await;

        log_database_operation("export", "members", started.elapsed().as_millis() as u64, result.is_ok());
        Ok(result?)
    }

    /// Count members created since the given instant
    pub async fn count_created_since(&self, since: chrono::DateTime<Utc>) -> Result<i64, ChurchHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
