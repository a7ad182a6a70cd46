//! Authenticated principals.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// An authenticated actor making a request.
///
/// Principals are always passed explicitly into access checks; nothing in the
/// engine reads ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: UserId,
    is_superuser: bool,
}

impl Principal {
    /// Creates a regular principal.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            is_superuser: false,
        }
    }

    /// Creates a platform super-user principal.
    #[must_use]
    pub fn superuser(id: UserId) -> Self {
        Self {
            id,
            is_superuser: true,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns whether this principal bypasses every capability check.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}
