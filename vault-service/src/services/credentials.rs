use std::sync::Arc;

use super::hierarchy::OrgStore;
use super::policy::{Action, PolicyService};
use super::ServiceError;
use crate::models::{Credential, CredentialPatch, DivisionDetail, OrgUnit, UnitSummary, User};

/// Hierarchy browsing and per-division credential repositories.
#[derive(Clone)]
pub struct CredentialService {
    org: Arc<dyn OrgStore>,
}

impl CredentialService {
    pub fn new(org: Arc<dyn OrgStore>) -> Self {
        Self { org }
    }

    /// Units and their divisions, without credentials.
    pub async fn structure(&self) -> Result<Vec<UnitSummary>, ServiceError> {
        let units = self.org.list_units().await?;
        Ok(units.iter().map(UnitSummary::from).collect())
    }

    pub async fn list_credentials(
        &self,
        actor: &User,
        division_id: &str,
    ) -> Result<(DivisionDetail, Vec<Credential>), ServiceError> {
        PolicyService::authorize(actor, &Action::ReadCredentials { division_id })?;

        let unit = self.owning_unit(division_id).await?;
        let division = unit
            .division(division_id)
            .ok_or(ServiceError::NotFound("Division"))?;

        Ok((DivisionDetail::new(&unit, division), division.credentials.clone()))
    }

    /// Append a credential and return the division's full list afterwards.
    pub async fn add_credential(
        &self,
        actor: &User,
        division_id: &str,
        system: &str,
        username: &str,
        password: &str,
    ) -> Result<Vec<Credential>, ServiceError> {
        PolicyService::authorize(actor, &Action::AddCredential { division_id })?;

        if [system, username, password].iter().any(|v| v.trim().is_empty()) {
            return Err(ServiceError::Validation(
                "system, username and password are required".to_string(),
            ));
        }

        let unit = self.owning_unit(division_id).await?;
        let credential = Credential::new(
            system.trim().to_string(),
            username.trim().to_string(),
            password.to_string(),
        );

        let division = self
            .org
            .push_credential(&unit.id, division_id, &credential)
            .await?
            .ok_or(ServiceError::NotFound("Division"))?;

        tracing::info!(
            user_id = %actor.id,
            division_id = %division_id,
            credential_id = %credential.id,
            system = %credential.system,
            "Credential added"
        );

        Ok(division.credentials)
    }

    /// Replace the supplied fields of one credential. An empty patch changes nothing.
    pub async fn update_credential(
        &self,
        actor: &User,
        division_id: &str,
        credential_id: &str,
        patch: CredentialPatch,
    ) -> Result<Credential, ServiceError> {
        PolicyService::authorize(actor, &Action::UpdateCredential { division_id })?;

        if [&patch.system, &patch.username, &patch.password]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| v.trim().is_empty()))
        {
            return Err(ServiceError::Validation(
                "Credential fields must not be empty".to_string(),
            ));
        }

        let unit = self.owning_unit(division_id).await?;
        let current = unit
            .division(division_id)
            .and_then(|d| d.credential(credential_id))
            .ok_or(ServiceError::NotFound("Credential"))?;

        if patch.is_empty() {
            return Ok(current.clone());
        }

        let updated = current.patched(&patch);
        if !self
            .org
            .replace_credential(&unit.id, division_id, &updated)
            .await?
        {
            return Err(ServiceError::NotFound("Credential"));
        }

        tracing::info!(
            user_id = %actor.id,
            division_id = %division_id,
            credential_id = %updated.id,
            changed_system = patch.system.is_some(),
            changed_username = patch.username.is_some(),
            changed_password = patch.password.is_some(),
            "Credential updated"
        );

        Ok(updated)
    }

    async fn owning_unit(&self, division_id: &str) -> Result<OrgUnit, ServiceError> {
        self.org
            .find_unit_by_division(division_id)
            .await?
            .ok_or(ServiceError::NotFound("Division"))
    }
}
