use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bastion_core::{AppError, AppResult, TenantId};
use bastion_domain::{
    AccessLevel, OwnedResource, ParentRef, Principal, Project, ProjectId,
    ProjectPermissionToggles, ResourceId, ResourceKind, ReviewStatus, Tenant, TenantRoleSet,
    UserId,
};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{ResourceRepository, RoleRepository, TenantRoleAssignment};

#[derive(Default)]
pub(crate) struct FakeResourceRepository {
    tenants: Mutex<HashMap<TenantId, Tenant>>,
    projects: Mutex<HashMap<ProjectId, Project>>,
    resources: Mutex<HashMap<(ResourceKind, ResourceId), OwnedResource>>,
    principals: Mutex<HashMap<UserId, Principal>>,
    lookups: AtomicUsize,
}

impl FakeResourceRepository {
    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) async fn add_tenant(&self, owner_id: UserId) -> Tenant {
        let tenant = Tenant::new(TenantId::new(), "Acme", owner_id)
            .unwrap_or_else(|_| unreachable!());
        self.tenants
            .lock()
            .await
            .insert(tenant.id(), tenant.clone());
        tenant
    }

    pub(crate) async fn add_project(
        &self,
        tenant: &Tenant,
        owner_id: UserId,
        toggles: ProjectPermissionToggles,
    ) -> Project {
        let project = Project::new(ProjectId::new(), tenant.id(), owner_id, "SOC 2", toggles)
            .unwrap_or_else(|_| unreachable!());
        self.projects
            .lock()
            .await
            .insert(project.id(), project.clone());
        project
    }

    pub(crate) async fn add_resource(
        &self,
        kind: ResourceKind,
        parent: ParentRef,
        owner_ids: Vec<UserId>,
    ) -> OwnedResource {
        let mut resource = OwnedResource::new(kind, ResourceId::new(), parent, owner_ids)
            .unwrap_or_else(|_| unreachable!());
        if kind.carries_review_status() {
            resource = resource
                .with_review_status(ReviewStatus::NotStarted)
                .unwrap_or_else(|_| unreachable!());
        }
        self.resources
            .lock()
            .await
            .insert((kind, resource.id()), resource.clone());
        resource
    }

    pub(crate) async fn set_toggles(
        &self,
        project_id: ProjectId,
        toggles: ProjectPermissionToggles,
    ) {
        let mut projects = self.projects.lock().await;
        if let Some(project) = projects.remove(&project_id) {
            projects.insert(project_id, project.with_toggles(toggles));
        }
    }
}

#[async_trait]
impl ResourceRepository for FakeResourceRepository {
    async fn find_tenant(&self, tenant_id: TenantId) -> AppResult<Option<Tenant>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tenants.lock().await.get(&tenant_id).cloned())
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.projects.lock().await.get(&project_id).cloned())
    }

    async fn find_resource(
        &self,
        kind: ResourceKind,
        resource_id: ResourceId,
    ) -> AppResult<Option<OwnedResource>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .resources
            .lock()
            .await
            .get(&(kind, resource_id))
            .cloned())
    }

    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.principals.lock().await.get(&user_id).copied())
    }
}

/// Role store fake counting reads so tests can assert predicates never ran.
#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    tenant_roles: Mutex<BTreeMap<(TenantId, UserId), TenantRoleSet>>,
    project_access: Mutex<HashMap<(ProjectId, UserId), AccessLevel>>,
    project_tenants: Mutex<HashMap<ProjectId, TenantId>>,
    reads: AtomicUsize,
    fail_writes: bool,
}

impl FakeRoleRepository {
    pub(crate) fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) async fn register_project(&self, project: &Project) {
        self.project_tenants
            .lock()
            .await
            .insert(project.id(), project.tenant_id());
    }

    pub(crate) async fn seed_roles(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        roles: TenantRoleSet,
    ) {
        self.tenant_roles
            .lock()
            .await
            .insert((tenant_id, user_id), roles);
    }

    pub(crate) async fn seed_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        level: AccessLevel,
    ) {
        self.project_access
            .lock()
            .await
            .insert((project_id, user_id), level);
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::Internal("role store is unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn tenant_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<TenantRoleSet> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tenant_roles
            .lock()
            .await
            .get(&(tenant_id, user_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<AccessLevel>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .project_access
            .lock()
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
        self.check_writable()?;
        self.tenant_roles
            .lock()
            .await
            .insert((tenant_id, user_id), roles.clone());
        Ok(())
    }

    async fn set_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        access_level: AccessLevel,
    ) -> AppResult<()> {
        self.check_writable()?;
        self.project_access
            .lock()
            .await
            .insert((project_id, user_id), access_level);
        Ok(())
    }

    async fn remove_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<bool> {
        self.check_writable()?;
        Ok(self
            .project_access
            .lock()
            .await
            .remove(&(project_id, user_id))
            .is_some())
    }

    async fn revoke_all_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()> {
        self.check_writable()?;
        self.tenant_roles.lock().await.remove(&(tenant_id, user_id));

        let project_tenants = self.project_tenants.lock().await;
        self.project_access
            .lock()
            .await
            .retain(|(project_id, member_id), _| {
                *member_id != user_id || project_tenants.get(project_id) != Some(&tenant_id)
            });
        Ok(())
    }

    async fn list_tenant_role_assignments(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<TenantRoleAssignment>> {
        let granted_at = Utc::now();
        let mut rows: Vec<TenantRoleAssignment> = self
            .tenant_roles
            .lock()
            .await
            .iter()
            .filter(|((stored_tenant, _), _)| *stored_tenant == tenant_id)
            .flat_map(|((_, user_id), roles)| {
                roles.iter().map(move |role| TenantRoleAssignment {
                    user_id: *user_id,
                    role,
                    granted_at,
                })
            })
            .collect();
        // Text ordering, as a SQL `ORDER BY role` produces.
        rows.sort_by(|left, right| left.role.as_str().cmp(right.role.as_str()));
        Ok(rows)
    }
}

pub(crate) struct Stores {
    pub(crate) resources: Arc<FakeResourceRepository>,
    pub(crate) roles: Arc<FakeRoleRepository>,
}

impl Stores {
    pub(crate) fn new() -> Self {
        Self {
            resources: Arc::new(FakeResourceRepository::default()),
            roles: Arc::new(FakeRoleRepository::default()),
        }
    }
}
