use service_core::{
    axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
        Json,
    },
    error::AppError,
};

use crate::{
    dtos::{
        credentials::{
            CreateCredentialRequest, CredentialListResponse, CredentialResponse,
            DivisionCredentialsResponse, StructureResponse, UpdateCredentialRequest,
        },
        ErrorResponse,
    },
    middleware::CurrentUser,
    services::{Action, PolicyService},
    utils::ValidatedJson,
    AppState,
};

/// Organizational units and their divisions
#[utoipa::path(
    get,
    path = "/structure",
    responses(
        (status = 200, description = "Hierarchy without credentials", body = StructureResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Hierarchy",
    security(("bearer_auth" = []))
)]
pub async fn get_structure(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<StructureResponse>, AppError> {
    let units = state.credential_service.structure().await?;
    Ok(Json(StructureResponse { units }))
}

/// Credentials stored in a division
#[utoipa::path(
    get,
    path = "/divisions/{id}/credentials",
    params(("id" = String, Path, description = "Division id")),
    responses(
        (status = 200, description = "Division and its credentials", body = DivisionCredentialsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not permitted for this division", body = ErrorResponse),
        (status = 404, description = "Division not found", body = ErrorResponse)
    ),
    tag = "Credentials",
    security(("bearer_auth" = []))
)]
pub async fn list_credentials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(division_id): Path<String>,
) -> Result<Json<DivisionCredentialsResponse>, AppError> {
    let (division, credentials) = state
        .credential_service
        .list_credentials(&user, &division_id)
        .await?;
    Ok(Json(DivisionCredentialsResponse {
        division,
        credentials,
    }))
}

/// Add a credential to a division
#[utoipa::path(
    post,
    path = "/divisions/{id}/credentials",
    params(("id" = String, Path, description = "Division id")),
    request_body = CreateCredentialRequest,
    responses(
        (status = 201, description = "Division credentials after the append", body = CredentialListResponse),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not permitted for this division", body = ErrorResponse),
        (status = 404, description = "Division not found", body = ErrorResponse)
    ),
    tag = "Credentials",
    security(("bearer_auth" = []))
)]
pub async fn add_credential(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(division_id): Path<String>,
    body: Result<ValidatedJson<CreateCredentialRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    PolicyService::authorize(&user, &Action::AddCredential { division_id: &division_id })?;
    let ValidatedJson(req) = body?;

    let credentials = state
        .credential_service
        .add_credential(&user, &division_id, &req.system, &req.username, &req.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CredentialListResponse { credentials }),
    ))
}

/// Update some fields of a credential
#[utoipa::path(
    put,
    path = "/divisions/{id}/credentials/{credential_id}",
    params(
        ("id" = String, Path, description = "Division id"),
        ("credential_id" = String, Path, description = "Credential id")
    ),
    request_body = UpdateCredentialRequest,
    responses(
        (status = 200, description = "Credential after the update", body = CredentialResponse),
        (status = 400, description = "Empty or malformed field", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Management or admin role required", body = ErrorResponse),
        (status = 404, description = "Division or credential not found", body = ErrorResponse)
    ),
    tag = "Credentials",
    security(("bearer_auth" = []))
)]
pub async fn update_credential(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((division_id, credential_id)): Path<(String, String)>,
    body: Result<ValidatedJson<UpdateCredentialRequest>, AppError>,
) -> Result<Json<CredentialResponse>, AppError> {
    PolicyService::authorize(&user, &Action::UpdateCredential { division_id: &division_id })?;
    let ValidatedJson(req) = body?;

    let credential = state
        .credential_service
        .update_credential(&user, &division_id, &credential_id, req.into())
        .await?;
    Ok(Json(CredentialResponse { credential }))
}
