use std::sync::Arc;

use super::hierarchy::OrgStore;
use super::identity::IdentityStore;
use super::policy::{Action, PolicyService};
use super::ServiceError;
use crate::models::{DivisionRef, Role, User};

/// Outcome of a role change.
#[derive(Debug, Clone)]
pub struct RoleChange {
    pub user: User,
    /// The acting user changed their own role; their token is stale.
    pub require_relogin: bool,
}

/// User listing, division assignment and role management.
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn IdentityStore>,
    org: Arc<dyn OrgStore>,
}

impl AdminService {
    pub fn new(users: Arc<dyn IdentityStore>, org: Arc<dyn OrgStore>) -> Self {
        Self { users, org }
    }

    pub async fn list_users(&self, actor: &User) -> Result<Vec<User>, ServiceError> {
        PolicyService::authorize(actor, &Action::ListUsers)?;
        self.users.list_users().await
    }

    /// Move `user_id` to `division_id` of `unit_id`. Both references change together.
    pub async fn assign(
        &self,
        actor: &User,
        user_id: &str,
        unit_id: &str,
        division_id: &str,
    ) -> Result<User, ServiceError> {
        PolicyService::authorize(actor, &Action::AssignUser)?;

        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        let unit = self
            .org
            .find_unit(unit_id)
            .await?
            .ok_or(ServiceError::NotFound("Organizational unit"))?;

        if unit.division(division_id).is_none() {
            return Err(ServiceError::InvalidReference(format!(
                "Division '{}' does not belong to unit '{}'",
                division_id, unit_id
            )));
        }

        let target = DivisionRef {
            org_unit_id: unit.id,
            division_id: division_id.to_string(),
        };
        let user = self
            .users
            .set_assignment(user_id, Some(&target))
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        tracing::info!(
            actor_id = %actor.id,
            user_id = %user.id,
            org_unit_id = %target.org_unit_id,
            division_id = %target.division_id,
            "User assigned to division"
        );
        Ok(user)
    }

    /// Clear both references. Unassigning an unassigned user succeeds.
    pub async fn unassign(&self, actor: &User, user_id: &str) -> Result<User, ServiceError> {
        PolicyService::authorize(actor, &Action::UnassignUser)?;

        let user = self
            .users
            .set_assignment(user_id, None)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        tracing::info!(actor_id = %actor.id, user_id = %user.id, "User unassigned");
        Ok(user)
    }

    pub async fn change_role(
        &self,
        actor: &User,
        user_id: &str,
        role: &str,
    ) -> Result<RoleChange, ServiceError> {
        PolicyService::authorize(actor, &Action::ChangeRole)?;

        let role: Role = role.parse().map_err(ServiceError::Validation)?;

        let user = self
            .users
            .update_role(user_id, role)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        tracing::info!(
            actor_id = %actor.id,
            user_id = %user.id,
            role = %role,
            "User role changed"
        );

        Ok(RoleChange {
            require_relogin: user.id == actor.id,
            user,
        })
    }
}
