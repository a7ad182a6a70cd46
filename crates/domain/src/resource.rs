//! Resource registry and the ownership chain each kind hangs from.
//!
//! Every kind declares exactly one parent edge. Walking those edges from any
//! kind ends at a tenant, which the tests below check for the whole registry.

use std::str::FromStr;

use bastion_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ProjectId, ResourceId, ReviewStatus, UserId};

/// Every resource kind the access engine can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Top-level isolation boundary.
    Tenant,
    /// Unit of audit/assessment work.
    Project,
    /// Tenant control library entry.
    Control,
    /// Tenant policy.
    Policy,
    /// Compliance framework.
    Framework,
    /// Tenant tag.
    Tag,
    /// Tenant policy label.
    PolicyLabel,
    /// Third-party vendor.
    Vendor,
    /// Risk questionnaire template.
    Questionnaire,
    /// Vendor application.
    VendorApp,
    /// Vendor assessment.
    Assessment,
    /// Single question of a vendor assessment.
    AssessmentItem,
    /// Risk register entry, optionally bound to a project.
    Risk,
    /// Control instantiated in a project.
    ProjectControl,
    /// Subcontrol of a project control.
    ProjectSubControl,
    /// Policy instantiated in a project.
    ProjectPolicy,
    /// Project evidence.
    Evidence,
    /// Project-level comment.
    ProjectComment,
    /// Comment on a project control.
    ControlComment,
    /// Auditor feedback on a project control.
    AuditorFeedback,
    /// Comment on a project subcontrol.
    SubControlComment,
}

/// The one edge a resource kind uses to reach its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentEdge {
    /// The kind is the root of the chain (tenants).
    Root,
    /// Direct foreign key to a tenant.
    Tenant,
    /// Direct foreign key to a project.
    Project,
    /// Project when one is set, otherwise the tenant.
    ProjectOrTenant,
    /// Foreign key to another registered resource kind.
    Resource(ResourceKind),
}

/// Which anchor a kind is authorized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorScope {
    /// Only a tenant anchor; tenant roles decide.
    Tenant,
    /// A project anchor; tenant admins and project access levels decide.
    Project,
    /// Depends on the stored row.
    ProjectOrTenant,
}

impl ResourceKind {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Project => "project",
            Self::Control => "control",
            Self::Policy => "policy",
            Self::Framework => "framework",
            Self::Tag => "tag",
            Self::PolicyLabel => "policy_label",
            Self::Vendor => "vendor",
            Self::Questionnaire => "questionnaire",
            Self::VendorApp => "vendor_app",
            Self::Assessment => "assessment",
            Self::AssessmentItem => "assessment_item",
            Self::Risk => "risk",
            Self::ProjectControl => "project_control",
            Self::ProjectSubControl => "project_subcontrol",
            Self::ProjectPolicy => "project_policy",
            Self::Evidence => "evidence",
            Self::ProjectComment => "project_comment",
            Self::ControlComment => "control_comment",
            Self::AuditorFeedback => "auditor_feedback",
            Self::SubControlComment => "subcontrol_comment",
        }
    }

    /// Returns all registered kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceKind] = &[
            ResourceKind::Tenant,
            ResourceKind::Project,
            ResourceKind::Control,
            ResourceKind::Policy,
            ResourceKind::Framework,
            ResourceKind::Tag,
            ResourceKind::PolicyLabel,
            ResourceKind::Vendor,
            ResourceKind::Questionnaire,
            ResourceKind::VendorApp,
            ResourceKind::Assessment,
            ResourceKind::AssessmentItem,
            ResourceKind::Risk,
            ResourceKind::ProjectControl,
            ResourceKind::ProjectSubControl,
            ResourceKind::ProjectPolicy,
            ResourceKind::Evidence,
            ResourceKind::ProjectComment,
            ResourceKind::ControlComment,
            ResourceKind::AuditorFeedback,
            ResourceKind::SubControlComment,
        ];

        ALL
    }

    /// Returns the edge this kind follows to its parent.
    #[must_use]
    pub fn parent_edge(&self) -> ParentEdge {
        match self {
            Self::Tenant => ParentEdge::Root,
            Self::Project
            | Self::Control
            | Self::Policy
            | Self::Framework
            | Self::Tag
            | Self::PolicyLabel
            | Self::Vendor
            | Self::Questionnaire => ParentEdge::Tenant,
            Self::VendorApp | Self::Assessment => ParentEdge::Resource(Self::Vendor),
            Self::AssessmentItem => ParentEdge::Resource(Self::Assessment),
            Self::Risk => ParentEdge::ProjectOrTenant,
            Self::ProjectControl
            | Self::ProjectPolicy
            | Self::Evidence
            | Self::ProjectComment => ParentEdge::Project,
            Self::ProjectSubControl | Self::ControlComment | Self::AuditorFeedback => {
                ParentEdge::Resource(Self::ProjectControl)
            }
            Self::SubControlComment => ParentEdge::Resource(Self::ProjectSubControl),
        }
    }

    /// Returns which anchor this kind is authorized against.
    #[must_use]
    pub fn anchor_scope(&self) -> AnchorScope {
        if matches!(self, Self::Project) {
            return AnchorScope::Project;
        }

        match self.parent_edge() {
            ParentEdge::Root | ParentEdge::Tenant => AnchorScope::Tenant,
            ParentEdge::Project => AnchorScope::Project,
            ParentEdge::ProjectOrTenant => AnchorScope::ProjectOrTenant,
            ParentEdge::Resource(parent) => parent.anchor_scope(),
        }
    }

    /// Returns whether rows of this kind carry a review status.
    #[must_use]
    pub fn carries_review_status(&self) -> bool {
        matches!(self, Self::ProjectControl | Self::ProjectSubControl)
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| AppError::Validation(format!("unknown resource kind '{value}'")))
    }
}

/// Foreign key from a resource to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    /// Parent is a tenant.
    Tenant(TenantId),
    /// Parent is a project.
    Project(ProjectId),
    /// Parent is another registered resource.
    Resource(ResourceKind, ResourceId),
}

impl ParentRef {
    fn satisfies(&self, edge: ParentEdge) -> bool {
        match (edge, self) {
            (ParentEdge::Root, _) => false,
            (ParentEdge::Tenant, Self::Tenant(_)) | (ParentEdge::Project, Self::Project(_)) => {
                true
            }
            (ParentEdge::ProjectOrTenant, Self::Tenant(_) | Self::Project(_)) => true,
            (ParentEdge::Resource(expected), Self::Resource(kind, _)) => expected == *kind,
            _ => false,
        }
    }
}

/// Top-level isolation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    id: TenantId,
    name: String,
    owner_id: UserId,
}

impl Tenant {
    /// Creates a tenant with exactly one owner.
    pub fn new(id: TenantId, name: impl Into<String>, owner_id: UserId) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "tenant name must not be empty".to_owned(),
            ));
        }

        Ok(Self { id, name, owner_id })
    }

    /// Returns the tenant identifier.
    #[must_use]
    pub fn id(&self) -> TenantId {
        self.id
    }

    /// Returns the tenant display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the tenant owner.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Auditor permission toggles stored on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPermissionToggles {
    /// Auditors may read the scratchpad.
    pub can_auditor_read_scratchpad: bool,
    /// Auditors may write the scratchpad.
    pub can_auditor_write_scratchpad: bool,
    /// Auditors may read comments.
    pub can_auditor_read_comments: bool,
    /// Auditors may write comments.
    pub can_auditor_write_comments: bool,
}

impl Default for ProjectPermissionToggles {
    fn default() -> Self {
        Self {
            can_auditor_read_scratchpad: true,
            can_auditor_write_scratchpad: false,
            can_auditor_read_comments: true,
            can_auditor_write_comments: false,
        }
    }
}

impl ProjectPermissionToggles {
    /// Returns the value of one toggle.
    #[must_use]
    pub fn allows(&self, toggle: crate::AuditorToggle) -> bool {
        match toggle {
            crate::AuditorToggle::ReadScratchpad => self.can_auditor_read_scratchpad,
            crate::AuditorToggle::WriteScratchpad => self.can_auditor_write_scratchpad,
            crate::AuditorToggle::ReadComments => self.can_auditor_read_comments,
            crate::AuditorToggle::WriteComments => self.can_auditor_write_comments,
        }
    }
}

/// Unit of audit/assessment work inside one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    tenant_id: TenantId,
    owner_id: UserId,
    name: String,
    toggles: ProjectPermissionToggles,
}

impl Project {
    /// Creates a project belonging to exactly one tenant.
    pub fn new(
        id: ProjectId,
        tenant_id: TenantId,
        owner_id: UserId,
        name: impl Into<String>,
        toggles: ProjectPermissionToggles,
    ) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "project name must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            tenant_id,
            owner_id,
            name,
            toggles,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the owning tenant.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the project owner.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the project display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the auditor permission toggles.
    #[must_use]
    pub fn toggles(&self) -> ProjectPermissionToggles {
        self.toggles
    }

    /// Returns a copy with replaced toggles.
    #[must_use]
    pub fn with_toggles(mut self, toggles: ProjectPermissionToggles) -> Self {
        self.toggles = toggles;
        self
    }
}

/// Any registered resource below tenants and projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedResource {
    kind: ResourceKind,
    id: ResourceId,
    parent: ParentRef,
    owner_ids: Vec<UserId>,
    review_status: Option<ReviewStatus>,
}

impl OwnedResource {
    /// Creates a resource whose parent matches the kind's registered edge.
    pub fn new(
        kind: ResourceKind,
        id: ResourceId,
        parent: ParentRef,
        owner_ids: impl IntoIterator<Item = UserId>,
    ) -> AppResult<Self> {
        if matches!(kind, ResourceKind::Tenant | ResourceKind::Project) {
            return Err(AppError::Validation(format!(
                "'{}' is not an owned resource kind",
                kind.as_str()
            )));
        }

        if !parent.satisfies(kind.parent_edge()) {
            return Err(AppError::Validation(format!(
                "parent {parent:?} does not match the registered edge of '{}'",
                kind.as_str()
            )));
        }

        let mut owner_ids: Vec<UserId> = owner_ids.into_iter().collect();
        owner_ids.dedup();

        Ok(Self {
            kind,
            id,
            parent,
            owner_ids,
            review_status: None,
        })
    }

    /// Attaches a review status; only kinds that carry one accept it.
    pub fn with_review_status(mut self, status: ReviewStatus) -> AppResult<Self> {
        if !self.kind.carries_review_status() {
            return Err(AppError::Validation(format!(
                "'{}' does not carry a review status",
                self.kind.as_str()
            )));
        }

        self.review_status = Some(status);
        Ok(self)
    }

    /// Returns the resource kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the resource identifier.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns the parent foreign key.
    #[must_use]
    pub fn parent(&self) -> ParentRef {
        self.parent
    }

    /// Returns every recorded owner (owner, operator, responder).
    #[must_use]
    pub fn owner_ids(&self) -> &[UserId] {
        self.owner_ids.as_slice()
    }

    /// Returns the current review status, when the kind carries one.
    #[must_use]
    pub fn review_status(&self) -> Option<ReviewStatus> {
        self.review_status
    }
}

/// A resolved resource of any registered kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    /// A tenant.
    Tenant(Tenant),
    /// A project.
    Project(Project),
    /// Any other registered kind.
    Owned(OwnedResource),
}

impl Resource {
    /// Returns the resource kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Tenant(_) => ResourceKind::Tenant,
            Self::Project(_) => ResourceKind::Project,
            Self::Owned(resource) => resource.kind(),
        }
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Tenant(tenant) => tenant.id().as_uuid(),
            Self::Project(project) => project.id().as_uuid(),
            Self::Owned(resource) => resource.id().as_uuid(),
        }
    }

    /// Returns the parent foreign key; tenants have none.
    #[must_use]
    pub fn parent(&self) -> Option<ParentRef> {
        match self {
            Self::Tenant(_) => None,
            Self::Project(project) => Some(ParentRef::Tenant(project.tenant_id())),
            Self::Owned(resource) => Some(resource.parent()),
        }
    }

    /// Returns whether the user is recorded as an owner of this resource.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        match self {
            Self::Tenant(tenant) => tenant.owner_id() == user_id,
            Self::Project(project) => project.owner_id() == user_id,
            Self::Owned(resource) => resource.owner_ids().contains(&user_id),
        }
    }
}

/// Either an identifier to look up or an object the caller already fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    /// Primary key to resolve.
    Id(Uuid),
    /// Already-resolved object, passed through unchanged.
    Resolved(Resource),
}

impl From<Uuid> for ResourceRef {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

impl From<Resource> for ResourceRef {
    fn from(value: Resource) -> Self {
        Self::Resolved(value)
    }
}

impl From<TenantId> for ResourceRef {
    fn from(value: TenantId) -> Self {
        Self::Id(value.as_uuid())
    }
}

impl From<ProjectId> for ResourceRef {
    fn from(value: ProjectId) -> Self {
        Self::Id(value.as_uuid())
    }
}

impl From<ResourceId> for ResourceRef {
    fn from(value: ResourceId) -> Self {
        Self::Id(value.as_uuid())
    }
}
