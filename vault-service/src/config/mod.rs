use service_core::config::{self as core_config, get_env, get_optional_env};
use service_core::error::AppError;
use std::fmt;

/// Minimum HS256 secret length accepted in production.
pub const MIN_PROD_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub provisioning: ProvisioningConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// HS256 signing secret. Tokens always last `SESSION_EXPIRY_MINUTES`.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    pub seed_hierarchy: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account created at startup when it does not exist yet.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Sessions last one hour from issuance.
pub const SESSION_EXPIRY_MINUTES: i64 = 60;

impl VaultConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = VaultConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("vault-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("vault_db"), is_prod)?,
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET", None, is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: parse_origins(&get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?),
            },
            provisioning: ProvisioningConfig {
                seed_hierarchy: parse_bool(
                    "SEED_HIERARCHY",
                    &get_env("SEED_HIERARCHY", Some("true"), is_prod)?,
                )?,
                bootstrap_admin: match (
                    get_optional_env("BOOTSTRAP_ADMIN_EMAIL"),
                    get_optional_env("BOOTSTRAP_ADMIN_PASSWORD"),
                ) {
                    (Some(email), Some(password)) => Some(BootstrapAdmin {
                        name: get_optional_env("BOOTSTRAP_ADMIN_NAME")
                            .unwrap_or_else(|| "Administrator".to_string()),
                        email,
                        password,
                    }),
                    _ => None,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn is_prod(&self) -> bool {
        self.environment == Environment::Prod
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.secret.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must not be empty"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.jwt.secret.len() < MIN_PROD_SECRET_BYTES {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} bytes in production",
                    MIN_PROD_SECRET_BYTES
                )));
            }
        }

        Ok(())
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a boolean, got '{}'",
            key,
            other
        ))),
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
