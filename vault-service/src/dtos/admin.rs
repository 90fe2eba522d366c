use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::UserResponse;
use crate::services::RoleChange;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub items: Vec<UserResponse>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[schema(example = "news-management")]
    pub unit_id: String,
    #[schema(example = "news-management-it")]
    pub division_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

/// Read only after the admin check; non-admins get 403 for any body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeRoleRequest {
    #[schema(example = "management")]
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleChangeResponse {
    pub user: UserResponse,
    /// The caller changed their own role and must log in again.
    #[serde(rename = "requireReLogin")]
    pub require_relogin: bool,
}

impl From<RoleChange> for RoleChangeResponse {
    fn from(change: RoleChange) -> Self {
        Self {
            user: change.user.sanitized(),
            require_relogin: change.require_relogin,
        }
    }
}
