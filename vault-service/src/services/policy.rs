//! Role and assignment rules for every protected operation.
//!
//! Pure functions over the live user record; callers fetch the user first.

use std::fmt;

use super::ServiceError;
use crate::models::{Role, User};

/// Operation being attempted by the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    ReadCredentials { division_id: &'a str },
    AddCredential { division_id: &'a str },
    UpdateCredential { division_id: &'a str },
    ListUsers,
    AssignUser,
    UnassignUser,
    ChangeRole,
}

impl fmt::Display for Action<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ReadCredentials { division_id } => {
                write!(f, "read credentials of division '{}'", division_id)
            }
            Action::AddCredential { division_id } => {
                write!(f, "add credential to division '{}'", division_id)
            }
            Action::UpdateCredential { division_id } => {
                write!(f, "update credential in division '{}'", division_id)
            }
            Action::ListUsers => write!(f, "list users"),
            Action::AssignUser => write!(f, "assign users"),
            Action::UnassignUser => write!(f, "unassign users"),
            Action::ChangeRole => write!(f, "change roles"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolicyService;

impl PolicyService {
    /// `Ok(())` if `actor` may perform `action`, otherwise `Forbidden`.
    pub fn authorize(actor: &User, action: &Action<'_>) -> Result<(), ServiceError> {
        if Self::permits(actor, action) {
            return Ok(());
        }

        tracing::warn!(
            user_id = %actor.id,
            role = %actor.role,
            action = %action,
            "Authorization denied"
        );
        Err(ServiceError::Forbidden(format!(
            "Role '{}' may not {}",
            actor.role, action
        )))
    }

    pub fn permits(actor: &User, action: &Action<'_>) -> bool {
        match action {
            Action::ReadCredentials { division_id } | Action::AddCredential { division_id } => {
                actor.role.is_elevated() || actor.division_id.as_deref() == Some(*division_id)
            }
            Action::UpdateCredential { .. } => actor.role.is_elevated(),
            Action::ListUsers | Action::AssignUser | Action::UnassignUser => {
                actor.role.is_elevated()
            }
            Action::ChangeRole => actor.role == Role::Admin,
        }
    }
}
