use std::collections::BTreeSet;
use std::str::FromStr;

use bastion_core::AppError;
use serde::{Deserialize, Serialize};

/// Tenant-scoped role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantRole {
    /// Full administrative control over the tenant.
    Admin,
    /// May manage and edit tenant content.
    Editor,
    /// May read tenant content.
    Viewer,
    /// Implicit role held by every non-vendor member.
    User,
    /// External vendor; exclusive with every other role.
    Vendor,
}

impl TenantRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
            Self::User => "user",
            Self::Vendor => "vendor",
        }
    }

    /// Returns all known tenant roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[TenantRole] = &[
            TenantRole::Admin,
            TenantRole::Editor,
            TenantRole::Viewer,
            TenantRole::User,
            TenantRole::Vendor,
        ];

        ALL
    }
}

impl FromStr for TenantRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            "user" => Ok(Self::User),
            "vendor" => Ok(Self::Vendor),
            _ => Err(AppError::Validation(format!(
                "unknown tenant role value '{value}'"
            ))),
        }
    }
}

/// The set of roles one user holds in one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRoleSet(BTreeSet<TenantRole>);

impl TenantRoleSet {
    /// Wraps roles exactly as stored, without applying grant rules.
    #[must_use]
    pub fn from_stored(roles: impl IntoIterator<Item = TenantRole>) -> Self {
        Self(roles.into_iter().collect())
    }

    /// Applies the grant rules to a requested role list.
    ///
    /// `vendor` is exclusive and discards every other requested role. Any
    /// other non-empty request gains the implicit `user` role, and an empty
    /// request yields `{user}`.
    #[must_use]
    pub fn normalize(requested: impl IntoIterator<Item = TenantRole>) -> Self {
        let mut roles: BTreeSet<TenantRole> = requested.into_iter().collect();
        if roles.contains(&TenantRole::Vendor) {
            return Self(BTreeSet::from([TenantRole::Vendor]));
        }

        roles.insert(TenantRole::User);
        Self(roles)
    }

    /// Parses and normalizes transport role names.
    pub fn parse_requested<S: AsRef<str>>(values: &[S]) -> Result<Self, AppError> {
        let roles = values
            .iter()
            .map(|value| TenantRole::from_str(value.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::normalize(roles))
    }

    /// Returns whether the set holds the role.
    #[must_use]
    pub fn contains(&self, role: TenantRole) -> bool {
        self.0.contains(&role)
    }

    /// Returns the first role of `candidates` held by this set.
    #[must_use]
    pub fn first_match(&self, candidates: &[TenantRole]) -> Option<TenantRole> {
        candidates
            .iter()
            .copied()
            .find(|role| self.0.contains(role))
    }

    /// Returns whether the user holds no role at all (not a tenant member).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates roles in stable order.
    pub fn iter(&self) -> impl Iterator<Item = TenantRole> + '_ {
        self.0.iter().copied()
    }

    /// Returns the number of roles held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Project-scoped access level; at most one per user and project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Manages the project.
    Manager,
    /// Edits project content.
    Contributor,
    /// Reads project content.
    Viewer,
    /// External auditor; access governed by the audit capability and toggles.
    Auditor,
}

impl AccessLevel {
    /// Returns a stable storage value for this access level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Contributor => "contributor",
            Self::Viewer => "viewer",
            Self::Auditor => "auditor",
        }
    }

    /// Returns all known access levels.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AccessLevel] = &[
            AccessLevel::Manager,
            AccessLevel::Contributor,
            AccessLevel::Viewer,
            AccessLevel::Auditor,
        ];

        ALL
    }
}

impl FromStr for AccessLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "contributor" => Ok(Self::Contributor),
            "viewer" => Ok(Self::Viewer),
            "auditor" => Ok(Self::Auditor),
            _ => Err(AppError::Validation(format!(
                "unknown access level value '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{AccessLevel, TenantRole, TenantRoleSet};

    fn role_strategy() -> impl Strategy<Value = TenantRole> {
        prop::sample::select(TenantRole::all().to_vec())
    }

    #[test]
    fn role_roundtrip_storage_value() {
        for role in TenantRole::all() {
            let restored = TenantRole::from_str(role.as_str());
            assert!(matches!(restored, Ok(value) if value == *role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(TenantRole::from_str("riskmanager").is_err());
    }

    #[test]
    fn access_level_parse_is_case_insensitive() {
        assert!(matches!(
            AccessLevel::from_str(" Auditor "),
            Ok(AccessLevel::Auditor)
        ));
        assert!(AccessLevel::from_str("owner").is_err());
    }

    #[test]
    fn vendor_discards_other_requested_roles() {
        let roles = TenantRoleSet::normalize([TenantRole::Editor, TenantRole::Vendor]);
        assert_eq!(roles, TenantRoleSet::from_stored([TenantRole::Vendor]));
    }

    #[test]
    fn empty_request_yields_user_role() {
        let roles = TenantRoleSet::normalize([]);
        assert_eq!(roles, TenantRoleSet::from_stored([TenantRole::User]));
    }

    #[test]
    fn parse_requested_rejects_unknown_names() {
        assert!(TenantRoleSet::parse_requested(&["admin", "superhero"]).is_err());
    }

    proptest! {
        #[test]
        fn normalized_sets_without_vendor_always_hold_user(
            requested in prop::collection::vec(role_strategy(), 0..6)
        ) {
            let roles = TenantRoleSet::normalize(requested.clone());
            if requested.contains(&TenantRole::Vendor) {
                prop_assert_eq!(roles, TenantRoleSet::from_stored([TenantRole::Vendor]));
            } else {
                prop_assert!(roles.contains(TenantRole::User));
                for role in requested {
                    prop_assert!(roles.contains(role));
                }
            }
        }

        #[test]
        fn normalization_is_idempotent(
            requested in prop::collection::vec(role_strategy(), 0..6)
        ) {
            let once = TenantRoleSet::normalize(requested);
            let twice = TenantRoleSet::normalize(once.iter().collect::<Vec<_>>());
            prop_assert_eq!(once, twice);
        }
    }
}
