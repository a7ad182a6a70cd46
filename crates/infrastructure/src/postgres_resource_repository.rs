use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bastion_application::ResourceRepository;
use bastion_core::{AppError, AppResult, TenantId};
use bastion_domain::{
    OwnedResource, ParentRef, Principal, Project, ProjectId, ProjectPermissionToggles, ResourceId,
    ResourceKind, ReviewStatus, Tenant, UserId,
};

mod registry;

use registry::{ParentColumn, kind_table};

/// PostgreSQL-backed resource lookups.
#[derive(Clone)]
pub struct PostgresResourceRepository {
    pool: PgPool,
}

impl PostgresResourceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    tenant_id: Uuid,
    owner_id: Uuid,
    name: String,
    can_auditor_read_scratchpad: bool,
    can_auditor_write_scratchpad: bool,
    can_auditor_read_comments: bool,
    can_auditor_write_comments: bool,
}

#[derive(Debug, FromRow)]
struct OwnedResourceRow {
    id: Uuid,
    tenant_id: Option<Uuid>,
    project_id: Option<Uuid>,
    parent_id: Option<Uuid>,
    owner_ids: Vec<Uuid>,
    review_status: Option<String>,
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: Uuid,
    is_superuser: bool,
}

#[async_trait]
impl ResourceRepository for PostgresResourceRepository {
    async fn find_tenant(&self, tenant_id: TenantId) -> AppResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT id, name, owner_id
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find tenant: {error}")))?;

        row.map(|row| {
            Tenant::new(
                TenantId::from_uuid(row.id),
                row.name,
                UserId::from_uuid(row.owner_id),
            )
        })
        .transpose()
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                id,
                tenant_id,
                owner_id,
                name,
                can_auditor_read_scratchpad,
                can_auditor_write_scratchpad,
                can_auditor_read_comments,
                can_auditor_write_comments
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project: {error}")))?;

        row.map(|row| {
            Project::new(
                ProjectId::from_uuid(row.id),
                TenantId::from_uuid(row.tenant_id),
                UserId::from_uuid(row.owner_id),
                row.name,
                ProjectPermissionToggles {
                    can_auditor_read_scratchpad: row.can_auditor_read_scratchpad,
                    can_auditor_write_scratchpad: row.can_auditor_write_scratchpad,
                    can_auditor_read_comments: row.can_auditor_read_comments,
                    can_auditor_write_comments: row.can_auditor_write_comments,
                },
            )
        })
        .transpose()
    }

    async fn find_resource(
        &self,
        kind: ResourceKind,
        resource_id: ResourceId,
    ) -> AppResult<Option<OwnedResource>> {
        let table = kind_table(kind).ok_or_else(|| {
            AppError::Internal(format!(
                "'{}' is not stored as an owned resource",
                kind.as_str()
            ))
        })?;

        let query = table.select_by_id();
        let row = sqlx::query_as::<_, OwnedResourceRow>(query.as_str())
            .bind(resource_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to find {} '{resource_id}': {error}",
                    kind.as_str()
                ))
            })?;

        row.map(|row| owned_resource_from_row(kind, table.parent, row))
            .transpose()
    }

    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, is_superuser
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        Ok(row.map(|row| {
            let id = UserId::from_uuid(row.id);
            if row.is_superuser {
                Principal::superuser(id)
            } else {
                Principal::new(id)
            }
        }))
    }
}

fn owned_resource_from_row(
    kind: ResourceKind,
    parent_column: ParentColumn,
    row: OwnedResourceRow,
) -> AppResult<OwnedResource> {
    let parent = match parent_column {
        ParentColumn::Tenant => row.tenant_id.map(|id| ParentRef::Tenant(TenantId::from_uuid(id))),
        ParentColumn::Project => row
            .project_id
            .map(|id| ParentRef::Project(ProjectId::from_uuid(id))),
        ParentColumn::ProjectOrTenant => row
            .project_id
            .map(|id| ParentRef::Project(ProjectId::from_uuid(id)))
            .or_else(|| row.tenant_id.map(|id| ParentRef::Tenant(TenantId::from_uuid(id)))),
        ParentColumn::Resource(parent_kind, _) => row
            .parent_id
            .map(|id| ParentRef::Resource(parent_kind, ResourceId::from_uuid(id))),
    }
    .ok_or_else(|| {
        AppError::Internal(format!(
            "{} '{}' has no parent reference",
            kind.as_str(),
            row.id
        ))
    })?;

    let resource = OwnedResource::new(
        kind,
        ResourceId::from_uuid(row.id),
        parent,
        row.owner_ids.into_iter().map(UserId::from_uuid),
    )
    .map_err(|error| AppError::Internal(format!("invalid stored {}: {error}", kind.as_str())))?;

    match row.review_status {
        Some(value) => {
            let status = ReviewStatus::from_str(value.as_str()).map_err(|_| {
                AppError::Internal(format!(
                    "invalid stored review status '{value}' on {} '{}'",
                    kind.as_str(),
                    row.id
                ))
            })?;
            resource.with_review_status(status)
        }
        None => Ok(resource),
    }
}
