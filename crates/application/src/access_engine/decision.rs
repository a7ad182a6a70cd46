use std::fmt;

use bastion_core::{AppError, AppResult};
use bastion_domain::{AccessLevel, AuditorToggle, TenantRole};
use serde::Serialize;

use crate::ResolvedResources;

/// Bypass that satisfied a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "via", content = "value", rename_all = "snake_case")]
pub enum Grant {
    /// Platform super-user.
    SuperUser,
    /// Recorded owner of the resource or one of its anchors.
    Owner,
    /// Tenant role column.
    TenantRole(TenantRole),
    /// Project access level column.
    AccessLevel(AccessLevel),
    /// Auditor widened by a project toggle.
    AuditorToggle(AuditorToggle),
}

impl fmt::Display for Grant {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuperUser => formatter.write_str("super-user"),
            Self::Owner => formatter.write_str("ownership"),
            Self::TenantRole(role) => write!(formatter, "tenant role '{}'", role.as_str()),
            Self::AccessLevel(level) => write!(formatter, "access level '{}'", level.as_str()),
            Self::AuditorToggle(toggle) => write!(formatter, "toggle '{}'", toggle.as_str()),
        }
    }
}

/// Final outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Allowed.
    Granted(Grant),
    /// The resource or a link of its chain does not exist.
    NotFound,
    /// Resolved, but no predicate passed.
    Forbidden,
    /// A capability parameter was rejected after the base check passed.
    Invalid,
}

/// Result of an access check together with everything it resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "DecisionPayload")]
pub struct Decision {
    outcome: Outcome,
    reason: String,
    resolved: ResolvedResources,
}

impl Decision {
    pub(crate) fn granted(grant: Grant, reason: String, resolved: ResolvedResources) -> Self {
        Self {
            outcome: Outcome::Granted(grant),
            reason,
            resolved,
        }
    }

    pub(crate) fn forbidden(reason: String, resolved: ResolvedResources) -> Self {
        Self {
            outcome: Outcome::Forbidden,
            reason,
            resolved,
        }
    }

    pub(crate) fn invalid(reason: String, resolved: ResolvedResources) -> Self {
        Self {
            outcome: Outcome::Invalid,
            reason,
            resolved,
        }
    }

    /// Converts a refusal raised during resolution into a decision.
    ///
    /// Only the three refusal kinds become decisions; anything else stays an error.
    pub(crate) fn from_refusal(error: AppError, resolved: ResolvedResources) -> AppResult<Self> {
        let (outcome, reason) = match error {
            AppError::NotFound(reason) => (Outcome::NotFound, reason),
            AppError::Forbidden(reason) => (Outcome::Forbidden, reason),
            AppError::Validation(reason) => (Outcome::Invalid, reason),
            other => return Err(other),
        };

        Ok(Self {
            outcome,
            reason,
            resolved,
        })
    }

    /// Returns the outcome.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns whether the check passed.
    #[must_use]
    pub fn allowed(&self) -> bool {
        matches!(self.outcome, Outcome::Granted(_))
    }

    /// Returns the bypass that granted the check.
    #[must_use]
    pub fn grant(&self) -> Option<Grant> {
        match self.outcome {
            Outcome::Granted(grant) => Some(grant),
            _ => None,
        }
    }

    /// Returns a human-readable explanation.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the HTTP status matching the outcome.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.error() {
            Some(error) => error.status_code(),
            None => 200,
        }
    }

    /// Returns the objects fetched during evaluation.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedResources {
        &self.resolved
    }

    /// Consumes the decision and returns the resolved objects.
    #[must_use]
    pub fn into_resolved(self) -> ResolvedResources {
        self.resolved
    }

    /// Returns the typed error a refused decision stands for.
    #[must_use]
    pub fn error(&self) -> Option<AppError> {
        let reason = self.reason.clone();
        match self.outcome {
            Outcome::Granted(_) => None,
            Outcome::NotFound => Some(AppError::NotFound(reason)),
            Outcome::Forbidden => Some(AppError::Forbidden(reason)),
            Outcome::Invalid => Some(AppError::Validation(reason)),
        }
    }

    /// Returns the decision when allowed and its typed error otherwise.
    pub fn into_result(self) -> AppResult<Self> {
        match self.error() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

#[derive(Serialize)]
struct DecisionPayload {
    allowed: bool,
    reason: String,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    grant: Option<Grant>,
    resolved: ResolvedResources,
}

impl From<Decision> for DecisionPayload {
    fn from(decision: Decision) -> Self {
        Self {
            allowed: decision.allowed(),
            status_code: decision.status_code(),
            grant: decision.grant(),
            reason: decision.reason,
            resolved: decision.resolved,
        }
    }
}
