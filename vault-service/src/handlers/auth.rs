use service_core::{
    axum::{extract::State, http::StatusCode, response::IntoResponse, Json},
    error::AppError,
};

use crate::{
    dtos::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        ErrorResponse,
    },
    utils::{Password, ValidatedJson},
    AppState,
};

/// Register a new account and receive a session token
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .auth_service
        .register(&req.name, &req.email, Password::new(req.password))
        .await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .auth_service
        .login(&req.email, Password::new(req.password))
        .await?;
    Ok((StatusCode::OK, Json(AuthResponse::from(session))))
}
