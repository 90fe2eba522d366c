use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Credential, CredentialPatch, DivisionDetail, UnitSummary};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StructureResponse {
    pub units: Vec<UnitSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DivisionCredentialsResponse {
    pub division: DivisionDetail,
    pub credentials: Vec<Credential>,
}

/// All three fields must be non-empty. Read only after the division access check.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCredentialRequest {
    #[schema(example = "WordPress")]
    pub system: String,
    #[schema(example = "editor")]
    pub username: String,
    #[schema(example = "s3cret")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CredentialListResponse {
    pub credentials: Vec<Credential>,
}

/// Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCredentialRequest {
    #[schema(example = "WordPress")]
    pub system: Option<String>,
    #[schema(example = "editor")]
    pub username: Option<String>,
    #[schema(example = "rotated-s3cret")]
    pub password: Option<String>,
}

impl From<UpdateCredentialRequest> for CredentialPatch {
    fn from(req: UpdateCredentialRequest) -> Self {
        Self {
            system: req.system,
            username: req.username,
            password: req.password,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CredentialResponse {
    pub credential: Credential,
}
