use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Read an environment variable, falling back to `default` outside production.
///
/// In production every key must be set explicitly.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Read an optional environment variable, treating empty values as unset.
pub fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_outside_prod() {
        let value = get_env("SERVICE_CORE_TEST_UNSET_KEY", Some("fallback"), false)
            .expect("default should apply");
        assert_eq!(value, "fallback");
    }

    #[test]
    fn missing_key_without_default_is_an_error() {
        let result = get_env("SERVICE_CORE_TEST_UNSET_KEY", None, false);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn prod_ignores_defaults() {
        let result = get_env("SERVICE_CORE_TEST_UNSET_KEY", Some("fallback"), true);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn optional_env_is_none_when_unset() {
        assert!(get_optional_env("SERVICE_CORE_TEST_UNSET_KEY").is_none());
    }
}
