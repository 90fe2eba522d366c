//! Startup provisioning: default hierarchy and the first admin account.

use super::hierarchy::OrgStore;
use super::identity::{normalize_email, IdentityStore};
use super::{AuthService, ServiceError};
use crate::config::BootstrapAdmin;
use crate::models::{Division, OrgUnit, Role};
use crate::utils::Password;

pub const DEFAULT_UNITS: [&str; 4] = [
    "News management",
    "Software reviews",
    "Hardware reviews",
    "Opinion publishing",
];

pub const DEFAULT_DIVISIONS: [&str; 4] = ["Finance", "IT", "Writing", "Development"];

/// Lower-case, dash-separated identifier: "News management" -> "news-management".
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// The default organization. Division ids are prefixed with their unit slug.
pub fn default_hierarchy() -> Vec<OrgUnit> {
    DEFAULT_UNITS
        .iter()
        .map(|unit_name| {
            let unit_id = slugify(unit_name);
            let divisions = DEFAULT_DIVISIONS
                .iter()
                .map(|name| Division::new(format!("{}-{}", unit_id, slugify(name)), *name))
                .collect();
            OrgUnit::new(unit_id, *unit_name, divisions)
        })
        .collect()
}

/// Insert the default hierarchy when no unit exists. Returns the number of units created.
pub async fn seed_hierarchy(org: &dyn OrgStore) -> Result<usize, ServiceError> {
    if org.count_units().await? > 0 {
        tracing::debug!("Organization hierarchy already present, skipping seed");
        return Ok(0);
    }

    let units = default_hierarchy();
    for unit in &units {
        org.insert_unit(unit).await?;
    }

    tracing::info!(units = units.len(), "Seeded default organization hierarchy");
    Ok(units.len())
}

/// Create the configured admin unless a user with that email exists.
///
/// An existing account is left untouched, whatever its role.
pub async fn bootstrap_admin(
    auth: &AuthService,
    users: &dyn IdentityStore,
    admin: &BootstrapAdmin,
) -> Result<bool, ServiceError> {
    if users
        .find_user_by_email(&normalize_email(&admin.email))
        .await?
        .is_some()
    {
        tracing::debug!("Bootstrap admin already exists");
        return Ok(false);
    }

    match auth
        .create_user(
            &admin.name,
            &admin.email,
            Password::new(admin.password.clone()),
            Role::Admin,
        )
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Bootstrap admin created");
            Ok(true)
        }
        // Another instance created it between the lookup and the insert.
        Err(ServiceError::EmailAlreadyRegistered) => Ok(false),
        Err(e) => Err(e),
    }
}
