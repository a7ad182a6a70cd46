use std::sync::Arc;

use bastion_core::{AppError, AppResult, TenantId};
use bastion_domain::{AccessLevel, Project, ProjectId, Tenant, TenantRoleSet, UserId};
use tracing::info;

use crate::{ResourceRepository, RoleRepository, TenantRoleAssignment};

mod project_access;
mod tenant_roles;

/// Application service owning tenant role and project access mutations.
///
/// Callers authorize with the access engine first; this service only enforces
/// the membership invariants.
#[derive(Clone)]
pub struct RoleService {
    resource_repository: Arc<dyn ResourceRepository>,
    role_repository: Arc<dyn RoleRepository>,
}

impl RoleService {
    /// Creates a role service from repository implementations.
    #[must_use]
    pub fn new(
        resource_repository: Arc<dyn ResourceRepository>,
        role_repository: Arc<dyn RoleRepository>,
    ) -> Self {
        Self {
            resource_repository,
            role_repository,
        }
    }

    async fn require_tenant(&self, tenant_id: TenantId) -> AppResult<Tenant> {
        self.resource_repository
            .find_tenant(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tenant '{tenant_id}' was not found")))
    }

    async fn require_project(&self, project_id: ProjectId) -> AppResult<Project> {
        self.resource_repository
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' was not found")))
    }
}

#[cfg(test)]
mod tests;
