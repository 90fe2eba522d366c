use std::sync::Arc;
use validator::ValidateEmail;

use super::identity::{normalize_email, IdentityStore};
use super::{ServiceError, SessionService};
use crate::models::{Role, User};
use crate::utils::{hash_password, verify_password, Password};

/// Token plus the public view of the user it was issued for.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Registration, login and bearer-token resolution.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn IdentityStore>,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(users: Arc<dyn IdentityStore>, sessions: SessionService) -> Self {
        Self { users, sessions }
    }

    /// Create a `normal`, unassigned user and open a session for it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: Password,
    ) -> Result<Session, ServiceError> {
        let user = self.create_user(name, email, password, Role::Normal).await?;
        tracing::info!(user_id = %user.id, "User registered");
        self.open_session(user)
    }

    /// Persist a new user with the given role. Used by registration and provisioning.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: Password,
        role: Role,
    ) -> Result<User, ServiceError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.as_str().is_empty() {
            return Err(ServiceError::Validation(
                "name, email and password are required".to_string(),
            ));
        }
        if !email.validate_email() {
            return Err(ServiceError::Validation("Invalid email format".to_string()));
        }

        let password_hash = hash_password(&password).map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e))
        })?;

        let mut user = User::new(name.to_string(), email, password_hash);
        user.role = role;

        // The store enforces email uniqueness, including under concurrent registrations.
        self.users.insert_user(&user).await?;
        Ok(user)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: Password) -> Result<Session, ServiceError> {
        let user = self
            .users
            .find_user_by_email(&normalize_email(email))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let matches = verify_password(&password, &user.password_hash).map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
            ServiceError::Internal(e)
        })?;
        if !matches {
            tracing::info!(user_id = %user.id, "Login rejected");
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.open_session(user)
    }

    /// Resolve a bearer token to the user's current stored record.
    ///
    /// The role embedded in the token is ignored; callers authorize against
    /// the returned record.
    pub async fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        let claims = self.sessions.verify(token)?;

        self.users
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
                ServiceError::Unauthenticated("User no longer exists".to_string())
            })
    }

    fn open_session(&self, user: User) -> Result<Session, ServiceError> {
        Ok(Session {
            token: self.sessions.issue(&user)?,
            expires_in: self.sessions.ttl_seconds(),
            user,
        })
    }
}
