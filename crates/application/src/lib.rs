//! Application services and ports of the access-control engine.

#![forbid(unsafe_code)]

mod access_engine;
mod access_ports;
mod resource_locator;
mod role_service;

#[cfg(test)]
mod test_support;

pub use access_engine::{
    AccessEngine, AccessExtra, AccessRequest, Decision, EnforcementMode, Grant, Outcome,
};
pub use access_ports::{ResourceRepository, RoleRepository, TenantRoleAssignment};
pub use resource_locator::{RELATED_KEY, ResolvedResources, ResourceLocator};
pub use role_service::RoleService;
