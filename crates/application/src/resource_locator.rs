use std::collections::BTreeMap;
use std::sync::Arc;

use bastion_core::{AppError, AppResult, TenantId};
use bastion_domain::{
    ParentRef, Project, ProjectId, Resource, ResourceId, ResourceKind, ResourceRef, Tenant,
};
use serde::Serialize;
use tracing::warn;

use crate::ResourceRepository;

/// Key under which a second, related resource is stored in a resolved graph.
pub const RELATED_KEY: &str = "related";

/// Objects fetched while authorizing, keyed by kind name.
///
/// Callers reuse these instead of querying again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedResources {
    entries: BTreeMap<String, Resource>,
}

impl ResolvedResources {
    /// Stores a resource under an explicit key.
    pub fn insert(&mut self, key: impl Into<String>, resource: Resource) {
        self.entries.insert(key.into(), resource);
    }

    /// Returns the resource stored under a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.entries.get(key)
    }

    /// Returns the resource of a kind in the ownership chain.
    #[must_use]
    pub fn of_kind(&self, kind: ResourceKind) -> Option<&Resource> {
        self.get(kind.as_str())
    }

    /// Returns the anchor tenant.
    #[must_use]
    pub fn tenant(&self) -> Option<&Tenant> {
        match self.of_kind(ResourceKind::Tenant) {
            Some(Resource::Tenant(tenant)) => Some(tenant),
            _ => None,
        }
    }

    /// Returns the anchor project, when the chain passes through one.
    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        match self.of_kind(ResourceKind::Project) {
            Some(Resource::Project(project)) => Some(project),
            _ => None,
        }
    }

    /// Returns the related resource of a two-object check.
    #[must_use]
    pub fn related(&self) -> Option<&Resource> {
        self.get(RELATED_KEY)
    }

    /// Returns whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates keys in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Resolves identifiers into resources and walks their ownership chain.
#[derive(Clone)]
pub struct ResourceLocator {
    repository: Arc<dyn ResourceRepository>,
}

impl ResourceLocator {
    /// Creates a locator over a resource repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ResourceRepository>) -> Self {
        Self { repository }
    }

    /// Resolves a reference of the given kind.
    ///
    /// Resolved objects pass through unchanged; identifiers cost exactly one
    /// primary-key lookup. A missing row is `NotFound`.
    pub async fn resolve(&self, kind: ResourceKind, target: ResourceRef) -> AppResult<Resource> {
        let id = match target {
            ResourceRef::Resolved(resource) => {
                if resource.kind() != kind {
                    return Err(AppError::Validation(format!(
                        "expected a '{}' but received a '{}'",
                        kind.as_str(),
                        resource.kind().as_str()
                    )));
                }
                return Ok(resource);
            }
            ResourceRef::Id(id) => id,
        };

        let found = match kind {
            ResourceKind::Tenant => self
                .repository
                .find_tenant(TenantId::from_uuid(id))
                .await?
                .map(Resource::Tenant),
            ResourceKind::Project => self
                .repository
                .find_project(ProjectId::from_uuid(id))
                .await?
                .map(Resource::Project),
            _ => self
                .repository
                .find_resource(kind, ResourceId::from_uuid(id))
                .await?
                .map(Resource::Owned),
        };

        let Some(resource) = found else {
            warn!(kind = kind.as_str(), id = %id, "resource lookup found nothing");
            return Err(AppError::NotFound(format!(
                "{} '{id}' was not found",
                kind.as_str()
            )));
        };

        if resource.kind() != kind {
            return Err(AppError::Internal(format!(
                "repository returned a '{}' for a '{}' lookup",
                resource.kind().as_str(),
                kind.as_str()
            )));
        }

        Ok(resource)
    }

    /// Resolves the resource and every ancestor up to its tenant.
    ///
    /// Follows one foreign key per hop. Any missing link is `NotFound`.
    pub async fn resolve_chain(&self, resource: Resource) -> AppResult<ResolvedResources> {
        let mut resolved = ResolvedResources::default();
        let mut current = resource;

        loop {
            let parent = current.parent();
            resolved.insert(current.kind().as_str(), current);

            let Some(parent) = parent else {
                return Ok(resolved);
            };

            current = self.fetch_parent(parent).await?;
        }
    }

    /// Returns the tenant the resource belongs to.
    pub async fn anchor_tenant(&self, resource: &Resource) -> AppResult<Tenant> {
        let resolved = self.resolve_chain(resource.clone()).await?;
        resolved.tenant().cloned().ok_or_else(|| {
            AppError::Internal(format!(
                "ownership chain of '{}' ended without a tenant",
                resource.kind().as_str()
            ))
        })
    }

    /// Returns the project the resource belongs to, if its chain has one.
    pub async fn anchor_project(&self, resource: &Resource) -> AppResult<Option<Project>> {
        let resolved = self.resolve_chain(resource.clone()).await?;
        Ok(resolved.project().cloned())
    }

    async fn fetch_parent(&self, parent: ParentRef) -> AppResult<Resource> {
        match parent {
            ParentRef::Tenant(tenant_id) => {
                self.resolve(ResourceKind::Tenant, tenant_id.into()).await
            }
            ParentRef::Project(project_id) => {
                self.resolve(ResourceKind::Project, project_id.into()).await
            }
            ParentRef::Resource(kind, resource_id) => {
                self.resolve(kind, resource_id.into()).await
            }
        }
    }
}
