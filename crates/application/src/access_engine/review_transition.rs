//! Review-status transition gate.
//!
//! Runs after the base `edit`/`audit` check passed and decides which value
//! may be written.

use std::str::FromStr;

use bastion_domain::{CapabilityLevel, ResourceKind, ReviewStatus, TransitionAuthority};

use super::predicates::{EvaluationScope, SubjectFacts, evaluate_level};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransitionRefusal {
    Invalid(String),
    Forbidden(String),
}

pub(crate) fn gate_review_transition(
    kind: ResourceKind,
    requested: Option<&str>,
    facts: &SubjectFacts,
) -> Result<ReviewStatus, TransitionRefusal> {
    if !kind.carries_review_status() {
        return Err(TransitionRefusal::Invalid(format!(
            "'{}' does not carry a review status",
            kind.as_str()
        )));
    }

    let Some(requested) = requested else {
        return Err(TransitionRefusal::Invalid(
            "a target review status is required".to_owned(),
        ));
    };

    let target = ReviewStatus::from_str(requested)
        .map_err(|_| TransitionRefusal::Invalid(format!("invalid review status '{requested}'")))?;

    if facts.is_tenant_admin_anchor() {
        return Ok(target);
    }

    let level = match target.required_authority() {
        TransitionAuthority::Editor => CapabilityLevel::Edit,
        TransitionAuthority::Auditor => CapabilityLevel::Audit,
    };

    match evaluate_level(level, EvaluationScope::Project, facts) {
        Some(_) => Ok(target),
        None => Err(TransitionRefusal::Forbidden(format!(
            "setting review status '{}' requires the '{}' capability",
            target.as_str(),
            level.as_str()
        ))),
    }
}
