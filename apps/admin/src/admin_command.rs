use bastion_core::TenantId;
use bastion_domain::{AccessLevel, Capability, ProjectId, ResourceKind, UserId};
use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Operator CLI for the bastion access-control store.
#[derive(Parser, Debug)]
#[command(name = "bastion-admin", disable_help_subcommand = true)]
pub struct AdminCli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Supported operator subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Apply pending database migrations.
    Migrate,
    /// Evaluate one access check and print the decision.
    Check {
        /// Principal performing the action.
        user_id: UserId,
        /// Requested capability, e.g. `edit` or `set_review_status`.
        capability: Capability,
        /// Kind of the target resource, e.g. `project_subcontrol`.
        kind: ResourceKind,
        /// Identifier of the target resource.
        id: Uuid,
        /// Requested review status for `set_review_status`.
        review_status: Option<String>,
    },
    /// Replace a user's roles in a tenant.
    Grant {
        /// User receiving the roles.
        user_id: UserId,
        /// Tenant the roles apply to.
        tenant_id: TenantId,
        /// Role names; `vendor` excludes every other role.
        #[arg(required = true, num_args = 1..)]
        roles: Vec<String>,
    },
    /// Create or update a project membership.
    SetAccess {
        /// Member user.
        user_id: UserId,
        /// Project the membership belongs to.
        project_id: ProjectId,
        /// Project access level.
        access_level: AccessLevel,
    },
    /// Remove a user's roles and project memberships in a tenant.
    Revoke {
        /// User losing access.
        user_id: UserId,
        /// Tenant to revoke from.
        tenant_id: TenantId,
    },
    /// List role assignments of a tenant.
    Members {
        /// Tenant to list.
        tenant_id: TenantId,
    },
}
