use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bastion_application::{ResourceRepository, RoleRepository, TenantRoleAssignment};
use bastion_core::{AppError, AppResult, TenantId};
use bastion_domain::{
    AccessLevel, OwnedResource, Principal, Project, ProjectId, ResourceId, ResourceKind, Tenant,
    TenantRoleSet, UserId,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// In-memory resource and membership store implementing both ports.
///
/// Each port method takes the locks it needs for its whole duration, so
/// mutations are observed all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    principals: RwLock<HashMap<UserId, Principal>>,
    tenants: RwLock<HashMap<TenantId, Tenant>>,
    projects: RwLock<HashMap<ProjectId, Project>>,
    resources: RwLock<HashMap<(ResourceKind, ResourceId), OwnedResource>>,
    tenant_roles: RwLock<BTreeMap<(TenantId, UserId), (TenantRoleSet, DateTime<Utc>)>>,
    project_members: RwLock<HashMap<(ProjectId, UserId), AccessLevel>>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a principal.
    pub async fn insert_principal(&self, principal: Principal) {
        self.principals
            .write()
            .await
            .insert(principal.id(), principal);
    }

    /// Stores a tenant.
    pub async fn insert_tenant(&self, tenant: Tenant) -> AppResult<()> {
        let mut tenants = self.tenants.write().await;
        if tenants.contains_key(&tenant.id()) {
            return Err(AppError::Conflict(format!(
                "tenant '{}' already exists",
                tenant.id()
            )));
        }

        tenants.insert(tenant.id(), tenant);
        Ok(())
    }

    /// Stores or replaces a project; its tenant must exist.
    pub async fn upsert_project(&self, project: Project) -> AppResult<()> {
        if !self
            .tenants
            .read()
            .await
            .contains_key(&project.tenant_id())
        {
            return Err(AppError::NotFound(format!(
                "tenant '{}' was not found",
                project.tenant_id()
            )));
        }

        self.projects.write().await.insert(project.id(), project);
        Ok(())
    }

    /// Stores an owned resource.
    pub async fn insert_resource(&self, resource: OwnedResource) -> AppResult<()> {
        let key = (resource.kind(), resource.id());
        let mut resources = self.resources.write().await;
        if resources.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "{} '{}' already exists",
                key.0.as_str(),
                key.1
            )));
        }

        resources.insert(key, resource);
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for InMemoryAccessStore {
    async fn find_tenant(&self, tenant_id: TenantId) -> AppResult<Option<Tenant>> {
        Ok(self.tenants.read().await.get(&tenant_id).cloned())
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        Ok(self.projects.read().await.get(&project_id).cloned())
    }

    async fn find_resource(
        &self,
        kind: ResourceKind,
        resource_id: ResourceId,
    ) -> AppResult<Option<OwnedResource>> {
        Ok(self
            .resources
            .read()
            .await
            .get(&(kind, resource_id))
            .cloned())
    }

    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.principals.read().await.get(&user_id).copied())
    }
}

#[async_trait]
impl RoleRepository for InMemoryAccessStore {
    async fn tenant_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<TenantRoleSet> {
        Ok(self
            .tenant_roles
            .read()
            .await
            .get(&(tenant_id, user_id))
            .map(|(roles, _)| roles.clone())
            .unwrap_or_default())
    }

    async fn project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<AccessLevel>> {
        Ok(self
            .project_members
            .read()
            .await
            .get(&(project_id, user_id))
            .copied())
    }

    async fn replace_tenant_roles(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        roles: &TenantRoleSet,
    ) -> AppResult<()> {
        let mut tenant_roles = self.tenant_roles.write().await;
        if roles.is_empty() {
            tenant_roles.remove(&(tenant_id, user_id));
        } else {
            tenant_roles.insert((tenant_id, user_id), (roles.clone(), Utc::now()));
        }
        Ok(())
    }

    async fn set_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        access_level: AccessLevel,
    ) -> AppResult<()> {
        if !self.projects.read().await.contains_key(&project_id) {
            return Err(AppError::Conflict(format!(
                "project '{project_id}' does not exist"
            )));
        }

        self.project_members
            .write()
            .await
            .insert((project_id, user_id), access_level);
        Ok(())
    }

    async fn remove_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<bool> {
        Ok(self
            .project_members
            .write()
            .await
            .remove(&(project_id, user_id))
            .is_some())
    }

    async fn revoke_all_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()> {
        if self
            .tenants
            .read()
            .await
            .get(&tenant_id)
            .is_some_and(|tenant| tenant.owner_id() == user_id)
        {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' owns tenant '{tenant_id}' and cannot be revoked"
            )));
        }

        let projects = self.projects.read().await;
        let mut tenant_roles = self.tenant_roles.write().await;
        let mut project_members = self.project_members.write().await;

        project_members.retain(|(project_id, member_id), _| {
            *member_id != user_id
                || projects
                    .get(project_id)
                    .is_none_or(|project| project.tenant_id() != tenant_id)
        });
        tenant_roles.remove(&(tenant_id, user_id));
        Ok(())
    }

    async fn list_tenant_role_assignments(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<TenantRoleAssignment>> {
        Ok(self
            .tenant_roles
            .read()
            .await
            .iter()
            .filter(|((stored_tenant_id, _), _)| *stored_tenant_id == tenant_id)
            .flat_map(|((_, user_id), (roles, granted_at))| {
                roles.iter().map(move |role| TenantRoleAssignment {
                    user_id: *user_id,
                    role,
                    granted_at: *granted_at,
                })
            })
            .collect())
    }
}
