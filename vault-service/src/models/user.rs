//! User model - login identity, role and division assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

/// Reference to a division together with the unit that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionRef {
    pub org_unit_id: String,
    pub division_id: String,
}

/// Persisted user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub org_unit_id: Option<String>,
    #[serde(default)]
    pub division_id: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New unassigned user with the `normal` role.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            role: Role::Normal,
            org_unit_id: None,
            division_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current assignment; `None` unless both references are set.
    pub fn assignment(&self) -> Option<DivisionRef> {
        match (&self.org_unit_id, &self.division_id) {
            (Some(org_unit_id), Some(division_id)) => Some(DivisionRef {
                org_unit_id: org_unit_id.clone(),
                division_id: division_id.clone(),
            }),
            _ => None,
        }
    }

    pub fn apply_assignment(&mut self, assignment: Option<&DivisionRef>) {
        self.org_unit_id = assignment.map(|a| a.org_unit_id.clone());
        self.division_id = assignment.map(|a| a.division_id.clone());
        self.updated_at = Utc::now();
    }

    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self)
    }
}

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub org_unit_id: Option<String>,
    pub division_id: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            org_unit_id: u.org_unit_id.clone(),
            division_id: u.division_id.clone(),
        }
    }
}
