use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bastion_application::{RoleRepository, TenantRoleAssignment};
use bastion_core::{AppError, AppResult, TenantId};
use bastion_domain::{AccessLevel, ProjectId, TenantRole, TenantRoleSet, UserId};

mod project_access;
mod tenant_roles;

/// PostgreSQL-backed tenant role and project membership store.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TenantRoleRow {
    user_id: Uuid,
    role: String,
    granted_at: DateTime<Utc>,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn tenant_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<TenantRoleSet> {
        self.tenant_roles_impl(tenant_id, user_id).await
    }

    async fn project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<AccessLevel>> {
        self.project_access_impl(project_id, user_id).await
    }

    async fn replace_tenant_roles(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        roles: &TenantRoleSet,
    ) -> AppResult<()> {
        self.replace_tenant_roles_impl(tenant_id, user_id, roles)
            .await
    }

    async fn set_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        access_level: AccessLevel,
    ) -> AppResult<()> {
        self.set_project_access_impl(project_id, user_id, access_level)
            .await
    }

    async fn remove_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<bool> {
        self.remove_project_access_impl(project_id, user_id).await
    }

    async fn revoke_all_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()> {
        self.revoke_all_roles_impl(tenant_id, user_id).await
    }

    async fn list_tenant_role_assignments(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<TenantRoleAssignment>> {
        self.list_tenant_role_assignments_impl(tenant_id).await
    }
}

fn map_membership_write_error(error: sqlx::Error, action: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && matches!(database_error.code().as_deref(), Some("23503" | "23505"))
    {
        return AppError::Conflict(format!("failed to {action}: {database_error}"));
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}
