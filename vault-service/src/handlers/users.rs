use service_core::{
    axum::{
        extract::{Path, State},
        Json,
    },
    error::AppError,
};

use crate::{
    dtos::{
        admin::{
            AssignRequest, ChangeRoleRequest, RoleChangeResponse, UserEnvelope, UserListResponse,
        },
        ErrorResponse,
    },
    middleware::CurrentUser,
    services::{Action, PolicyService},
    utils::ValidatedJson,
    AppState,
};

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users in creation order", body = UserListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Management or admin role required", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state.admin_service.list_users(&actor).await?;
    Ok(Json(UserListResponse {
        items: users.iter().map(|u| u.sanitized()).collect(),
    }))
}

/// Assign a user to a division
#[utoipa::path(
    post,
    path = "/users/{id}/assign",
    params(("id" = String, Path, description = "User id")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "User after assignment", body = UserEnvelope),
        (status = 400, description = "Division does not belong to the unit", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Management or admin role required", body = ErrorResponse),
        (status = 404, description = "User or unit not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn assign_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
    body: Result<ValidatedJson<AssignRequest>, AppError>,
) -> Result<Json<UserEnvelope>, AppError> {
    PolicyService::authorize(&actor, &Action::AssignUser)?;
    let ValidatedJson(req) = body?;

    let user = state
        .admin_service
        .assign(&actor, &user_id, &req.unit_id, &req.division_id)
        .await?;
    Ok(Json(UserEnvelope {
        user: user.sanitized(),
    }))
}

/// Remove a user's division assignment
#[utoipa::path(
    delete,
    path = "/users/{id}/assign",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User after unassignment", body = UserEnvelope),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Management or admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn unassign_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = state.admin_service.unassign(&actor, &user_id).await?;
    Ok(Json(UserEnvelope {
        user: user.sanitized(),
    }))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "User after the change", body = RoleChangeResponse),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn change_role(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
    body: Result<ValidatedJson<ChangeRoleRequest>, AppError>,
) -> Result<Json<RoleChangeResponse>, AppError> {
    PolicyService::authorize(&actor, &Action::ChangeRole)?;
    let ValidatedJson(req) = body?;

    let change = state
        .admin_service
        .change_role(&actor, &user_id, &req.role)
        .await?;
    Ok(Json(RoleChangeResponse::from(change)))
}
