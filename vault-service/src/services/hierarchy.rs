use async_trait::async_trait;

use super::ServiceError;
use crate::models::{Credential, Division, OrgUnit};

/// Persistence for the unit → division → credential tree.
///
/// Divisions are embedded in their unit, so lookups by division id scan the
/// units' division lists. Division ids must be unique across all units.
#[async_trait]
pub trait OrgStore: Send + Sync {
    /// Provision a unit. Fails with `Conflict` if the unit id or any division id exists.
    async fn insert_unit(&self, unit: &OrgUnit) -> Result<(), ServiceError>;

    async fn count_units(&self) -> Result<u64, ServiceError>;

    /// All units sorted by name. Credentials may be omitted from the result.
    async fn list_units(&self) -> Result<Vec<OrgUnit>, ServiceError>;

    async fn find_unit(&self, unit_id: &str) -> Result<Option<OrgUnit>, ServiceError>;

    async fn find_unit_by_division(
        &self,
        division_id: &str,
    ) -> Result<Option<OrgUnit>, ServiceError>;

    /// Append a credential; returns the division as stored afterwards.
    async fn push_credential(
        &self,
        unit_id: &str,
        division_id: &str,
        credential: &Credential,
    ) -> Result<Option<Division>, ServiceError>;

    /// Overwrite the credential with the same id. Returns false if nothing matched.
    async fn replace_credential(
        &self,
        unit_id: &str,
        division_id: &str,
        credential: &Credential,
    ) -> Result<bool, ServiceError>;
}

/// Reject units whose own division list repeats an id.
pub fn ensure_distinct_divisions(unit: &OrgUnit) -> Result<(), ServiceError> {
    match unit.duplicate_division_id() {
        Some(id) => Err(ServiceError::Conflict(format!(
            "Division id '{}' appears more than once in unit '{}'",
            id, unit.id
        ))),
        None => Ok(()),
    }
}
