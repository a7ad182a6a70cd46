//! Auditor toggle overlay.
//!
//! Scratchpad and comment capabilities fall back to the audit capability when
//! the base read/edit level fails, but only while the matching project toggle
//! is on. Principals who are not auditors never reach the toggle.

use bastion_domain::{Capability, CapabilityLevel, ProjectPermissionToggles};

use super::Grant;
use super::predicates::{EvaluationScope, SubjectFacts, evaluate_level};

pub(crate) fn evaluate_capability(
    capability: Capability,
    scope: EvaluationScope,
    facts: &SubjectFacts,
    toggles: Option<ProjectPermissionToggles>,
) -> Option<Grant> {
    if let Some(grant) = evaluate_level(capability.base_level(), scope, facts) {
        return Some(grant);
    }

    if capability == Capability::SetReviewStatus {
        return evaluate_level(CapabilityLevel::Audit, scope, facts);
    }

    auditor_overlay(capability, scope, facts, toggles)
}

fn auditor_overlay(
    capability: Capability,
    scope: EvaluationScope,
    facts: &SubjectFacts,
    toggles: Option<ProjectPermissionToggles>,
) -> Option<Grant> {
    let toggle = capability.auditor_toggle()?;
    let toggles = toggles?;

    evaluate_level(CapabilityLevel::Audit, scope, facts)?;
    toggles
        .allows(toggle)
        .then_some(Grant::AuditorToggle(toggle))
}
