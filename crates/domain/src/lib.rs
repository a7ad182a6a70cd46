//! Domain entities and invariants of the access-control engine.

#![forbid(unsafe_code)]

mod capability;
mod ids;
mod resource;
mod review;
mod security;
mod user;

pub use capability::{
    AccessRequirement, AuditorToggle, Capability, CapabilityLevel, RoleRequirement,
};
pub use ids::{ProjectId, ResourceId, UserId};
pub use resource::{
    AnchorScope, OwnedResource, ParentEdge, ParentRef, Project, ProjectPermissionToggles,
    Resource, ResourceKind, ResourceRef, Tenant,
};
pub use review::{ReviewStatus, TransitionAuthority};
pub use security::{AccessLevel, TenantRole, TenantRoleSet};
pub use user::Principal;
