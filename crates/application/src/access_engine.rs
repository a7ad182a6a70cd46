use std::str::FromStr;
use std::sync::Arc;

use bastion_core::{AppError, AppResult};
use bastion_domain::{Capability, Principal, Project, Resource, ResourceKind, ResourceRef, Tenant};
use tracing::{debug, warn};

use crate::resource_locator::RELATED_KEY;
use crate::{ResolvedResources, ResourceLocator, ResourceRepository, RoleRepository};

mod decision;
mod overlay;
mod predicates;
mod review_transition;

pub use decision::{Decision, Grant, Outcome};

use overlay::evaluate_capability;
use predicates::{EvaluationScope, SubjectFacts};
use review_transition::{TransitionRefusal, gate_review_transition};

/// How refused decisions reach the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnforcementMode {
    /// Refusals are returned as typed errors.
    #[default]
    Strict,
    /// Refusals are returned as decisions for the caller to inspect.
    Soft,
}

impl EnforcementMode {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Soft => "soft",
        }
    }
}

impl FromStr for EnforcementMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "strict" => Ok(Self::Strict),
            "soft" => Ok(Self::Soft),
            _ => Err(AppError::Validation(format!(
                "unknown enforcement mode '{value}'"
            ))),
        }
    }
}

/// Capability-specific parameters of a check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessExtra {
    /// Requested review status for `set_review_status`.
    pub review_status: Option<String>,
    /// Second resource of a two-object check; must share the target's tenant.
    pub related: Option<(ResourceKind, ResourceRef)>,
}

/// One access check request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    /// Requested capability.
    pub capability: Capability,
    /// Kind of the target resource.
    pub kind: ResourceKind,
    /// Identifier or already-resolved object.
    pub target: ResourceRef,
    /// Capability-specific parameters.
    pub extra: AccessExtra,
}

impl AccessRequest {
    /// Creates a request without extra parameters.
    #[must_use]
    pub fn new(capability: Capability, kind: ResourceKind, target: impl Into<ResourceRef>) -> Self {
        Self {
            capability,
            kind,
            target: target.into(),
            extra: AccessExtra::default(),
        }
    }

    /// Sets the requested review status.
    #[must_use]
    pub fn with_review_status(mut self, review_status: impl Into<String>) -> Self {
        self.extra.review_status = Some(review_status.into());
        self
    }

    /// Adds a related resource that must live in the same tenant.
    #[must_use]
    pub fn with_related(mut self, kind: ResourceKind, target: impl Into<ResourceRef>) -> Self {
        self.extra.related = Some((kind, target.into()));
        self
    }
}

/// Single entry point for every authorization decision.
///
/// Both enforcement modes share one evaluation path; the mode only decides
/// whether a refusal is returned as `Err` or as a `Decision`. Infrastructure
/// failures are always `Err`.
#[derive(Clone)]
pub struct AccessEngine {
    locator: ResourceLocator,
    role_repository: Arc<dyn RoleRepository>,
    mode: EnforcementMode,
}

impl AccessEngine {
    /// Creates an engine over the resource and role repositories.
    #[must_use]
    pub fn new(
        resource_repository: Arc<dyn ResourceRepository>,
        role_repository: Arc<dyn RoleRepository>,
        mode: EnforcementMode,
    ) -> Self {
        Self {
            locator: ResourceLocator::new(resource_repository),
            role_repository,
            mode,
        }
    }

    /// Returns the configured enforcement mode.
    #[must_use]
    pub fn mode(&self) -> EnforcementMode {
        self.mode
    }

    /// Returns the locator used to resolve resources.
    #[must_use]
    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    /// Checks a capability on a resource for a principal.
    pub async fn check(
        &self,
        principal: &Principal,
        request: AccessRequest,
    ) -> AppResult<Decision> {
        let decision = self.evaluate(principal, request).await?;
        self.finalize(decision)
    }

    /// Checks platform management, reserved to super-users.
    pub fn check_platform(&self, principal: &Principal) -> AppResult<Decision> {
        let decision = if principal.is_superuser() {
            Decision::granted(
                Grant::SuperUser,
                "platform management granted via super-user".to_owned(),
                ResolvedResources::default(),
            )
        } else {
            warn!(user_id = %principal.id(), "platform management denied");
            Decision::forbidden(
                "platform management requires a super-user".to_owned(),
                ResolvedResources::default(),
            )
        };

        self.finalize(decision)
    }

    async fn evaluate(&self, principal: &Principal, request: AccessRequest) -> AppResult<Decision> {
        let AccessRequest {
            capability,
            kind,
            target,
            extra,
        } = request;

        let target = match self.locator.resolve(kind, target).await {
            Ok(target) => target,
            Err(error) => return Decision::from_refusal(error, ResolvedResources::default()),
        };

        let mut resolved = match self.locator.resolve_chain(target.clone()).await {
            Ok(resolved) => resolved,
            Err(error) => return Decision::from_refusal(error, ResolvedResources::default()),
        };

        let tenant = resolved.tenant().cloned().ok_or_else(|| {
            AppError::Internal(format!(
                "ownership chain of {} '{}' ended without a tenant",
                kind.as_str(),
                target.id()
            ))
        })?;
        let project = resolved.project().cloned();

        if let Some((related_kind, related_ref)) = extra.related {
            if let Err(error) = self
                .attach_related(&tenant, related_kind, related_ref, &mut resolved)
                .await
            {
                return Decision::from_refusal(error, resolved);
            }
        }

        let scope = match project {
            Some(_) => EvaluationScope::Project,
            None => EvaluationScope::Tenant,
        };
        let facts = self
            .gather_facts(principal, &target, &tenant, project.as_ref())
            .await?;

        let Some(grant) = evaluate_capability(
            capability,
            scope,
            &facts,
            project.as_ref().map(Project::toggles),
        ) else {
            warn!(
                user_id = %principal.id(),
                tenant_id = %tenant.id(),
                capability = capability.as_str(),
                kind = kind.as_str(),
                resource_id = %target.id(),
                "access denied"
            );
            return Ok(Decision::forbidden(
                format!(
                    "missing '{}' capability on {} '{}'",
                    capability.as_str(),
                    kind.as_str(),
                    target.id()
                ),
                resolved,
            ));
        };

        if capability == Capability::SetReviewStatus {
            match gate_review_transition(kind, extra.review_status.as_deref(), &facts) {
                Ok(_) => {}
                Err(TransitionRefusal::Invalid(reason)) => {
                    return Ok(Decision::invalid(reason, resolved));
                }
                Err(TransitionRefusal::Forbidden(reason)) => {
                    warn!(
                        user_id = %principal.id(),
                        kind = kind.as_str(),
                        resource_id = %target.id(),
                        "review status transition denied"
                    );
                    return Ok(Decision::forbidden(reason, resolved));
                }
            }
        }

        debug!(
            user_id = %principal.id(),
            capability = capability.as_str(),
            kind = kind.as_str(),
            resource_id = %target.id(),
            grant = %grant,
            "access granted"
        );

        Ok(Decision::granted(
            grant,
            format!(
                "'{}' on {} '{}' granted via {grant}",
                capability.as_str(),
                kind.as_str(),
                target.id()
            ),
            resolved,
        ))
    }

    async fn attach_related(
        &self,
        tenant: &Tenant,
        kind: ResourceKind,
        target: ResourceRef,
        resolved: &mut ResolvedResources,
    ) -> AppResult<()> {
        let related = self.locator.resolve(kind, target).await?;
        let related_tenant = self.locator.anchor_tenant(&related).await?;
        let related_id = related.id();
        resolved.insert(RELATED_KEY, related);

        if related_tenant.id() != tenant.id() {
            warn!(
                tenant_id = %tenant.id(),
                related_tenant_id = %related_tenant.id(),
                kind = kind.as_str(),
                "related resource belongs to another tenant"
            );
            return Err(AppError::Forbidden(format!(
                "{} '{related_id}' belongs to another tenant",
                kind.as_str()
            )));
        }

        Ok(())
    }

    async fn gather_facts(
        &self,
        principal: &Principal,
        target: &Resource,
        tenant: &Tenant,
        project: Option<&Project>,
    ) -> AppResult<SubjectFacts> {
        if principal.is_superuser() {
            return Ok(SubjectFacts {
                superuser: true,
                ..SubjectFacts::default()
            });
        }

        let user_id = principal.id();
        let tenant_roles = self
            .role_repository
            .tenant_roles(tenant.id(), user_id)
            .await?;
        let access_level = match project {
            Some(project) => {
                self.role_repository
                    .project_access(project.id(), user_id)
                    .await?
            }
            None => None,
        };

        Ok(SubjectFacts {
            superuser: false,
            owns_resource: target.is_owned_by(user_id),
            owns_project: project.is_some_and(|project| project.owner_id() == user_id),
            owns_tenant: tenant.owner_id() == user_id,
            tenant_roles,
            access_level,
        })
    }

    fn finalize(&self, decision: Decision) -> AppResult<Decision> {
        match self.mode {
            EnforcementMode::Strict => decision.into_result(),
            EnforcementMode::Soft => Ok(decision),
        }
    }
}
