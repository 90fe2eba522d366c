//! Services layer for vault-service.
//!
//! Stores are trait objects so the binary runs on MongoDB and the tests on
//! the in-memory implementation.

mod admin;
mod auth;
mod credentials;
mod database;
pub mod error;
pub mod hierarchy;
pub mod identity;
mod memory;
pub mod policy;
pub mod provisioning;
mod session;

pub use admin::{AdminService, RoleChange};
pub use auth::{AuthService, Session};
pub use credentials::CredentialService;
pub use database::MongoDb;
pub use error::ServiceError;
pub use hierarchy::OrgStore;
pub use identity::IdentityStore;
pub use memory::MemoryStore;
pub use policy::{Action, PolicyService};
pub use session::{SessionClaims, SessionService};
