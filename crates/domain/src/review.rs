use std::str::FromStr;

use bastion_core::AppError;
use serde::{Deserialize, Serialize};

/// Review status of a project control or subcontrol.
///
/// Display states only: there is no ordering between them and every state,
/// `complete` included, can move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    /// Work has not started.
    #[serde(rename = "not started")]
    NotStarted,
    /// The security team owns the next step.
    #[serde(rename = "infosec action")]
    InfosecAction,
    /// Handed over to the auditor.
    #[serde(rename = "ready for auditor")]
    ReadyForAuditor,
    /// The auditor requested changes.
    #[serde(rename = "action required")]
    ActionRequired,
    /// The auditor accepted the work.
    #[serde(rename = "complete")]
    Complete,
}

/// Who may move a resource into a given review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAuthority {
    /// Tenant administrators or holders of the project `edit` capability.
    Editor,
    /// Tenant administrators or holders of the project `audit` capability.
    Auditor,
}

impl ReviewStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InfosecAction => "infosec action",
            Self::ReadyForAuditor => "ready for auditor",
            Self::ActionRequired => "action required",
            Self::Complete => "complete",
        }
    }

    /// Returns every status in written order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ReviewStatus] = &[
            ReviewStatus::NotStarted,
            ReviewStatus::InfosecAction,
            ReviewStatus::ReadyForAuditor,
            ReviewStatus::ActionRequired,
            ReviewStatus::Complete,
        ];

        ALL
    }

    /// Returns who may write this status as the target of a transition.
    #[must_use]
    pub fn required_authority(&self) -> TransitionAuthority {
        match self {
            Self::NotStarted | Self::InfosecAction | Self::ReadyForAuditor => {
                TransitionAuthority::Editor
            }
            Self::ActionRequired | Self::Complete => TransitionAuthority::Auditor,
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| AppError::Validation(format!("invalid review status '{value}'")))
    }
}
