//! Capability predicates.
//!
//! Each check is a short-circuiting OR over super-user, ownership, tenant
//! role and project access level, in that order. The functions here are pure:
//! the engine gathers the facts beforehand.

use bastion_domain::{
    AccessLevel, AccessRequirement, CapabilityLevel, RoleRequirement, TenantRole, TenantRoleSet,
};

use super::Grant;

/// Which columns of the capability table apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvaluationScope {
    /// Anchored in a tenant only: tenant roles decide.
    Tenant,
    /// Anchored in a project: tenant admins and project access levels decide.
    Project,
}

/// Everything the predicates know about the principal relative to one anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SubjectFacts {
    pub(crate) superuser: bool,
    pub(crate) owns_resource: bool,
    pub(crate) owns_project: bool,
    pub(crate) owns_tenant: bool,
    pub(crate) tenant_roles: TenantRoleSet,
    pub(crate) access_level: Option<AccessLevel>,
}

impl SubjectFacts {
    /// Tenant owner, `admin` role holder, or super-user.
    pub(crate) fn is_tenant_admin_anchor(&self) -> bool {
        self.superuser || self.owns_tenant || self.tenant_roles.contains(TenantRole::Admin)
    }
}

pub(crate) fn evaluate_level(
    level: CapabilityLevel,
    scope: EvaluationScope,
    facts: &SubjectFacts,
) -> Option<Grant> {
    superuser_bypass(facts)
        .or_else(|| ownership_bypass(level, scope, facts))
        .or_else(|| role_bypass(level, scope, facts))
        .or_else(|| access_level_bypass(level, scope, facts))
}

fn superuser_bypass(facts: &SubjectFacts) -> Option<Grant> {
    facts.superuser.then_some(Grant::SuperUser)
}

fn ownership_bypass(
    level: CapabilityLevel,
    scope: EvaluationScope,
    facts: &SubjectFacts,
) -> Option<Grant> {
    if !level.honors_ownership() {
        return None;
    }

    let owns_anchor = match scope {
        EvaluationScope::Tenant => facts.owns_tenant,
        EvaluationScope::Project => facts.owns_tenant || facts.owns_project,
    };

    (facts.owns_resource || owns_anchor).then_some(Grant::Owner)
}

fn role_bypass(
    level: CapabilityLevel,
    scope: EvaluationScope,
    facts: &SubjectFacts,
) -> Option<Grant> {
    match (scope, level.tenant_roles()) {
        (_, RoleRequirement::Nobody) => None,
        (EvaluationScope::Tenant, RoleRequirement::AnyMembership) => {
            facts.tenant_roles.iter().next().map(Grant::TenantRole)
        }
        (EvaluationScope::Tenant, RoleRequirement::AnyOf(roles)) => {
            facts.tenant_roles.first_match(roles).map(Grant::TenantRole)
        }
        // Inside a project only tenant administrators outrank access levels.
        (EvaluationScope::Project, RoleRequirement::AnyMembership | RoleRequirement::AnyOf(_)) => {
            facts
                .tenant_roles
                .contains(TenantRole::Admin)
                .then_some(Grant::TenantRole(TenantRole::Admin))
        }
    }
}

fn access_level_bypass(
    level: CapabilityLevel,
    scope: EvaluationScope,
    facts: &SubjectFacts,
) -> Option<Grant> {
    if scope != EvaluationScope::Project {
        return None;
    }

    let access_level = facts.access_level?;
    match level.access_levels() {
        AccessRequirement::Nobody => None,
        AccessRequirement::AnyLevel => Some(Grant::AccessLevel(access_level)),
        AccessRequirement::AnyOf(levels) => levels
            .contains(&access_level)
            .then_some(Grant::AccessLevel(access_level)),
    }
}
