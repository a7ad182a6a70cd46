use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bastion_core::{AppResult, TenantId};
use bastion_domain::{
    AccessLevel, OwnedResource, Principal, Project, ProjectId, ResourceId, ResourceKind, Tenant,
    TenantRole, TenantRoleSet, UserId,
};

/// One stored `(user, tenant, role)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRoleAssignment {
    /// Member holding the role.
    pub user_id: UserId,
    /// Role name.
    pub role: TenantRole,
    /// When the row was written.
    pub granted_at: DateTime<Utc>,
}

/// Repository port resolving resources by primary key.
///
/// One typed lookup per anchor type plus one registry-driven lookup for every
/// other kind. Implementations must only return rows of the requested kind.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Finds a tenant.
    async fn find_tenant(&self, tenant_id: TenantId) -> AppResult<Option<Tenant>>;

    /// Finds a project with its auditor toggles.
    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>>;

    /// Finds a resource of any other registered kind.
    async fn find_resource(
        &self,
        kind: ResourceKind,
        resource_id: ResourceId,
    ) -> AppResult<Option<OwnedResource>>;

    /// Finds a user and builds its principal.
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>>;
}

/// Repository port for tenant roles and project access levels.
///
/// Reads always hit committed state. Every mutation runs as one atomic unit.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Returns the roles a user holds in a tenant, empty for non-members.
    async fn tenant_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<TenantRoleSet>;

    /// Returns the user's access level in a project.
    async fn project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<AccessLevel>>;

    /// Replaces every role row of the pair with `roles`.
    async fn replace_tenant_roles(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        roles: &TenantRoleSet,
    ) -> AppResult<()>;

    /// Inserts or replaces the user's access level in a project.
    async fn set_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        access_level: AccessLevel,
    ) -> AppResult<()>;

    /// Removes the user's access level in a project, returning whether a row existed.
    async fn remove_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<bool>;

    /// Removes every role of the user in the tenant and every project membership
    /// the user holds in that tenant's projects.
    async fn revoke_all_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()>;

    /// Lists stored role rows of a tenant in storage order.
    async fn list_tenant_role_assignments(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<TenantRoleAssignment>>;
}
