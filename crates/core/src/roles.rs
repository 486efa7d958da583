//! Well-known roles and the authenticated principal.
//!
//! Role names must match the `role` check constraint on the `users` table.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MAID: &str = "maid";
pub const ROLE_SENIOR_CLEANER: &str = "senior_cleaner";

/// The three user roles of the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// Cleaning worker; fills the cleaning checklist.
    Maid,
    /// Inspector; fills the inspection checklist after completion.
    SeniorCleaner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Maid => ROLE_MAID,
            Role::SeniorCleaner => ROLE_SENIOR_CLEANER,
        }
    }

    /// Roles that can be put on an assignment and earn a salary.
    pub fn is_worker(self) -> bool {
        matches!(self, Role::Maid | Role::SeniorCleaner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MAID => Ok(Role::Maid),
            ROLE_SENIOR_CLEANER => Ok(Role::SeniorCleaner),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_ADMIN}, {ROLE_MAID}, {ROLE_SENIOR_CLEANER}"
            ))),
        }
    }
}

/// The authenticated caller of a core operation.
///
/// Every lifecycle operation takes the principal explicitly; nothing in the
/// core reads ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject with `Forbidden` unless the principal is an admin.
    pub fn require_admin(&self) -> Result<(), CoreError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Admin role required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in [Role::Admin, Role::Maid, Role::SeniorCleaner] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_rejected() {
        let err = "janitor".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("Invalid role"));
    }

    #[test]
    fn only_admin_passes_require_admin() {
        assert!(Principal::new(1, Role::Admin).require_admin().is_ok());
        assert!(Principal::new(2, Role::Maid).require_admin().is_err());
        assert!(Principal::new(3, Role::SeniorCleaner).require_admin().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SeniorCleaner).unwrap(),
            "\"senior_cleaner\""
        );
    }
}
