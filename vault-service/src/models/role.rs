use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Permission tier of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Normal,
    Management,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Normal, Role::Management, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::Management => "management",
            Role::Admin => "admin",
        }
    }

    /// Management and admin see every division.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Management | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Role::Normal),
            "management" => Ok(Role::Management),
            "admin" => Ok(Role::Admin),
            other => Err(format!(
                "Invalid role '{}': expected one of normal, management, admin",
                other
            )),
        }
    }
}
