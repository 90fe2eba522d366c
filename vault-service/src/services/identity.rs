use async_trait::async_trait;

use super::ServiceError;
use crate::models::{DivisionRef, Role, User};

/// Persistence for user records.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a new user. Fails with `EmailAlreadyRegistered` if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<(), ServiceError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError>;

    /// All users in creation order.
    async fn list_users(&self) -> Result<Vec<User>, ServiceError>;

    /// Returns the updated user, or `None` if it does not exist.
    async fn update_role(&self, user_id: &str, role: Role) -> Result<Option<User>, ServiceError>;

    /// Set or clear both assignment references in a single write.
    async fn set_assignment(
        &self,
        user_id: &str,
        assignment: Option<&DivisionRef>,
    ) -> Result<Option<User>, ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

/// Emails are compared case-insensitively and stored normalized.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
