//! In-process store used by tests and local runs without MongoDB.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use super::hierarchy::{ensure_distinct_divisions, OrgStore};
use super::identity::IdentityStore;
use super::ServiceError;
use crate::models::{Credential, Division, DivisionRef, OrgUnit, Role, User};

/// Implements both store traits over plain vectors.
///
/// Vectors keep insertion order, which doubles as creation order for users.
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    units: Mutex<Vec<OrgUnit>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            units: Mutex::new(Vec::new()),
        }
    }

    fn users(&self) -> Result<MutexGuard<'_, Vec<User>>, ServiceError> {
        self.users
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Memory user store mutex poisoned: {}", e)))
    }

    fn units(&self) -> Result<MutexGuard<'_, Vec<OrgUnit>>, ServiceError> {
        self.units
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Memory unit store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        let mut users = self.users()?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(ServiceError::EmailAlreadyRegistered);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users()?.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users()?.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users()?.clone())
    }

    async fn update_role(&self, user_id: &str, role: Role) -> Result<Option<User>, ServiceError> {
        let mut users = self.users()?;
        Ok(users.iter_mut().find(|u| u.id == user_id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_assignment(
        &self,
        user_id: &str,
        assignment: Option<&DivisionRef>,
    ) -> Result<Option<User>, ServiceError> {
        let mut users = self.users()?;
        Ok(users.iter_mut().find(|u| u.id == user_id).map(|user| {
            user.apply_assignment(assignment);
            user.clone()
        }))
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[async_trait]
impl OrgStore for MemoryStore {
    async fn insert_unit(&self, unit: &OrgUnit) -> Result<(), ServiceError> {
        ensure_distinct_divisions(unit)?;

        let mut units = self.units()?;
        if units.iter().any(|u| u.id == unit.id) {
            return Err(ServiceError::Conflict(format!(
                "Unit '{}' already exists",
                unit.id
            )));
        }
        if let Some(taken) = unit
            .divisions
            .iter()
            .find(|d| units.iter().any(|u| u.division(&d.id).is_some()))
        {
            return Err(ServiceError::Conflict(format!(
                "Division id '{}' already exists",
                taken.id
            )));
        }

        units.push(unit.clone());
        Ok(())
    }

    async fn count_units(&self) -> Result<u64, ServiceError> {
        Ok(self.units()?.len() as u64)
    }

    async fn list_units(&self) -> Result<Vec<OrgUnit>, ServiceError> {
        let mut units = self.units()?.clone();
        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }

    async fn find_unit(&self, unit_id: &str) -> Result<Option<OrgUnit>, ServiceError> {
        Ok(self.units()?.iter().find(|u| u.id == unit_id).cloned())
    }

    async fn find_unit_by_division(
        &self,
        division_id: &str,
    ) -> Result<Option<OrgUnit>, ServiceError> {
        Ok(self
            .units()?
            .iter()
            .find(|u| u.division(division_id).is_some())
            .cloned())
    }

    async fn push_credential(
        &self,
        unit_id: &str,
        division_id: &str,
        credential: &Credential,
    ) -> Result<Option<Division>, ServiceError> {
        let mut units = self.units()?;
        let division = units
            .iter_mut()
            .find(|u| u.id == unit_id)
            .and_then(|u| u.division_mut(division_id));

        Ok(division.map(|d| {
            d.credentials.push(credential.clone());
            d.clone()
        }))
    }

    async fn replace_credential(
        &self,
        unit_id: &str,
        division_id: &str,
        credential: &Credential,
    ) -> Result<bool, ServiceError> {
        let mut units = self.units()?;
        let slot = units
            .iter_mut()
            .find(|u| u.id == unit_id)
            .and_then(|u| u.division_mut(division_id))
            .and_then(|d| d.credentials.iter_mut().find(|c| c.id == credential.id));

        match slot {
            Some(existing) => {
                *existing = credential.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
