//! Organizational hierarchy: units own divisions, divisions own credentials.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

/// Top-level grouping. Stored as one document with its divisions embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUnit {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub divisions: Vec<Division>,
}

/// Division embedded in its unit. The id is unique across all units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

/// Third-party system login kept in a division's repository.
///
/// The secret is stored and returned in plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Credential {
    pub id: String,
    pub system: String,
    pub username: String,
    pub password: String,
}

/// Partial update for a credential; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CredentialPatch {
    pub system: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl OrgUnit {
    pub fn new(id: impl Into<String>, name: impl Into<String>, divisions: Vec<Division>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            divisions,
        }
    }

    pub fn division(&self, division_id: &str) -> Option<&Division> {
        self.divisions.iter().find(|d| d.id == division_id)
    }

    pub fn division_mut(&mut self, division_id: &str) -> Option<&mut Division> {
        self.divisions.iter_mut().find(|d| d.id == division_id)
    }

    /// First division id that appears more than once within this unit.
    pub fn duplicate_division_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.divisions
            .iter()
            .map(|d| d.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}

impl Division {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            credentials: Vec::new(),
        }
    }

    pub fn credential(&self, credential_id: &str) -> Option<&Credential> {
        self.credentials.iter().find(|c| c.id == credential_id)
    }
}

impl Credential {
    pub fn new(system: String, username: String, password: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            system,
            username,
            password,
        }
    }

    /// Copy of this credential with the supplied fields replaced.
    pub fn patched(&self, patch: &CredentialPatch) -> Self {
        Self {
            id: self.id.clone(),
            system: patch.system.clone().unwrap_or_else(|| self.system.clone()),
            username: patch.username.clone().unwrap_or_else(|| self.username.clone()),
            password: patch.password.clone().unwrap_or_else(|| self.password.clone()),
        }
    }
}

impl CredentialPatch {
    pub fn is_empty(&self) -> bool {
        self.system.is_none() && self.username.is_none() && self.password.is_none()
    }
}

/// Division as listed in the structure view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DivisionSummary {
    pub id: String,
    pub name: String,
}

/// Unit as listed in the structure view, without any credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
    pub divisions: Vec<DivisionSummary>,
}

impl From<&OrgUnit> for UnitSummary {
    fn from(unit: &OrgUnit) -> Self {
        Self {
            id: unit.id.clone(),
            name: unit.name.clone(),
            divisions: unit
                .divisions
                .iter()
                .map(|d| DivisionSummary {
                    id: d.id.clone(),
                    name: d.name.clone(),
                })
                .collect(),
        }
    }
}

/// Division header returned alongside its credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DivisionDetail {
    pub id: String,
    pub name: String,
    pub unit_id: String,
    pub unit_name: String,
}

impl DivisionDetail {
    pub fn new(unit: &OrgUnit, division: &Division) -> Self {
        Self {
            id: division.id.clone(),
            name: division.name.clone(),
            unit_id: unit.id.clone(),
            unit_name: unit.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("WordPress".into(), "editor".into(), "hunter2".into())
    }

    #[test]
    fn patch_replaces_only_supplied_fields() {
        let original = credential();
        let patch = CredentialPatch {
            password: Some("correct horse".into()),
            ..Default::default()
        };

        let updated = original.patched(&patch);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.system, "WordPress");
        assert_eq!(updated.username, "editor");
        assert_eq!(updated.password, "correct horse");
    }

    #[test]
    fn empty_patch_is_identity() {
        let original = credential();
        let patch = CredentialPatch::default();
        assert!(patch.is_empty());
        assert_eq!(original.patched(&patch), original);
    }

    #[test]
    fn summary_omits_credentials() {
        let mut division = Division::new("news-it", "IT");
        division.credentials.push(credential());
        let unit = OrgUnit::new("news", "News management", vec![division]);

        let json = serde_json::to_value(UnitSummary::from(&unit)).expect("serialize");
        assert_eq!(json["divisions"][0]["id"], "news-it");
        assert!(json["divisions"][0].get("credentials").is_none());
    }

    #[test]
    fn detects_duplicate_division_ids() {
        let unit = OrgUnit::new(
            "news",
            "News management",
            vec![Division::new("a", "A"), Division::new("b", "B"), Division::new("a", "A2")],
        );
        assert_eq!(unit.duplicate_division_id(), Some("a"));

        let unique = OrgUnit::new("news", "News", vec![Division::new("a", "A")]);
        assert_eq!(unique.duplicate_division_id(), None);
    }
}
