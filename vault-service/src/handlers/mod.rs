pub mod auth;
pub mod credentials;
pub mod health;
pub mod users;
