pub mod org_unit;
pub mod role;
pub mod user;

pub use org_unit::{
    Credential, CredentialPatch, Division, DivisionDetail, DivisionSummary, OrgUnit, UnitSummary,
};
pub use role::Role;
pub use user::{DivisionRef, User, UserResponse};
