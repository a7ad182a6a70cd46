//! Capability lattice and the auditor toggle overlay.

use std::str::FromStr;

use bastion_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{AccessLevel, TenantRole};

/// Base capability levels, from most to least privileged, with `audit` as a
/// separate project-only level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityLevel {
    /// Administrative control.
    Admin,
    /// Management of membership and settings.
    Manage,
    /// Content modification.
    Edit,
    /// Content reading.
    Read,
    /// Any membership at all.
    Access,
    /// Auditor-only work.
    Audit,
}

/// Which tenant roles satisfy a capability level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// No tenant role satisfies the level.
    Nobody,
    /// Any of the listed roles.
    AnyOf(&'static [TenantRole]),
    /// Any membership, whatever the role.
    AnyMembership,
}

/// Which project access levels satisfy a capability level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequirement {
    /// No access level satisfies the level.
    Nobody,
    /// Any of the listed levels.
    AnyOf(&'static [AccessLevel]),
    /// Any access level at all.
    AnyLevel,
}

impl CapabilityLevel {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manage => "manage",
            Self::Edit => "edit",
            Self::Read => "read",
            Self::Access => "access",
            Self::Audit => "audit",
        }
    }

    /// Tenant-role column of the capability table.
    #[must_use]
    pub fn tenant_roles(&self) -> RoleRequirement {
        match self {
            Self::Admin => RoleRequirement::AnyOf(&[TenantRole::Admin]),
            Self::Manage | Self::Edit => {
                RoleRequirement::AnyOf(&[TenantRole::Admin, TenantRole::Editor])
            }
            Self::Read => RoleRequirement::AnyOf(&[
                TenantRole::Admin,
                TenantRole::Editor,
                TenantRole::Viewer,
            ]),
            Self::Access => RoleRequirement::AnyMembership,
            Self::Audit => RoleRequirement::Nobody,
        }
    }

    /// Project-access column of the capability table.
    #[must_use]
    pub fn access_levels(&self) -> AccessRequirement {
        match self {
            Self::Admin => AccessRequirement::Nobody,
            Self::Manage => AccessRequirement::AnyOf(&[AccessLevel::Manager]),
            Self::Edit => {
                AccessRequirement::AnyOf(&[AccessLevel::Manager, AccessLevel::Contributor])
            }
            Self::Read => AccessRequirement::AnyOf(&[
                AccessLevel::Manager,
                AccessLevel::Contributor,
                AccessLevel::Viewer,
            ]),
            Self::Access => AccessRequirement::AnyLevel,
            Self::Audit => AccessRequirement::AnyOf(&[AccessLevel::Auditor]),
        }
    }

    /// Whether recorded owners bypass this level.
    ///
    /// Auditing is never granted through ownership.
    #[must_use]
    pub fn honors_ownership(&self) -> bool {
        !matches!(self, Self::Audit)
    }
}

/// Per-project switches extending the audit capability to sub-resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditorToggle {
    /// `can_auditor_read_scratchpad`.
    ReadScratchpad,
    /// `can_auditor_write_scratchpad`.
    WriteScratchpad,
    /// `can_auditor_read_comments`.
    ReadComments,
    /// `can_auditor_write_comments`.
    WriteComments,
}

impl AuditorToggle {
    /// Returns the storage column name of the toggle.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadScratchpad => "can_auditor_read_scratchpad",
            Self::WriteScratchpad => "can_auditor_write_scratchpad",
            Self::ReadComments => "can_auditor_read_comments",
            Self::WriteComments => "can_auditor_write_comments",
        }
    }
}

/// Capabilities requested by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Administrative control.
    Admin,
    /// Management.
    Manage,
    /// Content modification.
    Edit,
    /// Content reading.
    Read,
    /// Any membership.
    Access,
    /// Auditor work.
    Audit,
    /// Read the project scratchpad.
    ScratchpadRead,
    /// Write the project scratchpad.
    ScratchpadWrite,
    /// Read project comments.
    CommentRead,
    /// Write project comments.
    CommentWrite,
    /// Write a review status value; requires the target status as a parameter.
    SetReviewStatus,
}

impl Capability {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manage => "manage",
            Self::Edit => "edit",
            Self::Read => "read",
            Self::Access => "access",
            Self::Audit => "audit",
            Self::ScratchpadRead => "scratchpad_read",
            Self::ScratchpadWrite => "scratchpad_write",
            Self::CommentRead => "comment_read",
            Self::CommentWrite => "comment_write",
            Self::SetReviewStatus => "set_review_status",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::Admin,
            Capability::Manage,
            Capability::Edit,
            Capability::Read,
            Capability::Access,
            Capability::Audit,
            Capability::ScratchpadRead,
            Capability::ScratchpadWrite,
            Capability::CommentRead,
            Capability::CommentWrite,
            Capability::SetReviewStatus,
        ];

        ALL
    }

    /// Level that non-auditor principals are evaluated against.
    ///
    /// `set_review_status` evaluates `edit` here and falls back to `audit`.
    #[must_use]
    pub fn base_level(&self) -> CapabilityLevel {
        match self {
            Self::Admin => CapabilityLevel::Admin,
            Self::Manage => CapabilityLevel::Manage,
            Self::Edit | Self::ScratchpadWrite | Self::CommentWrite | Self::SetReviewStatus => {
                CapabilityLevel::Edit
            }
            Self::Read | Self::ScratchpadRead | Self::CommentRead => CapabilityLevel::Read,
            Self::Access => CapabilityLevel::Access,
            Self::Audit => CapabilityLevel::Audit,
        }
    }

    /// Toggle that extends the audit capability to this capability, if any.
    #[must_use]
    pub fn auditor_toggle(&self) -> Option<AuditorToggle> {
        match self {
            Self::ScratchpadRead => Some(AuditorToggle::ReadScratchpad),
            Self::ScratchpadWrite => Some(AuditorToggle::WriteScratchpad),
            Self::CommentRead => Some(AuditorToggle::ReadComments),
            Self::CommentWrite => Some(AuditorToggle::WriteComments),
            _ => None,
        }
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|capability| capability.as_str() == value.trim())
            .ok_or_else(|| AppError::Validation(format!("unknown capability value '{value}'")))
    }
}
