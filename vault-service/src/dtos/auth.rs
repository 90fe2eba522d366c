use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::UserResponse;
use crate::services::Session;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    /// Surrounding whitespace is ignored; case is normalized.
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub token: String,
    /// Seconds until the token expires.
    #[schema(example = 3600)]
    pub expires_in: i64,
    pub user: UserResponse,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            expires_in: session.expires_in,
            user: session.user.sanitized(),
        }
    }
}
