use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{models::User, AppState};

/// Live user record of the authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Token from an `Authorization: Bearer <token>` header. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Middleware to require authentication.
///
/// Resolves the token to the user's current record so role changes and
/// deletions take effect without waiting for the token to expire.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .map(str::to_owned)
        .ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!(
                "Missing or invalid Authorization header"
            ))
        })?;

    let user = state.auth_service.authenticate(&token).await?;

    tracing::Span::current().record("user_id", user.id.as_str());
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| {
                AppError::InternalError(anyhow::anyhow!(
                    "Authenticated user missing from request extensions"
                ))
            })
    }
}
