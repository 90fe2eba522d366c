pub mod auth;

pub use auth::{auth_middleware, bearer_token, CurrentUser};
