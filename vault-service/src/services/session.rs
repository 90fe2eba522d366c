use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::config::{JwtConfig, SESSION_EXPIRY_MINUTES};
use crate::models::{Role, User};

/// Signed session tokens (HS256) valid for `SESSION_EXPIRY_MINUTES`.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Claims carried by a session token.
///
/// `role` is informational; authorization always re-reads the stored user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.is_empty() {
            return Err(anyhow::anyhow!("JWT secret must not be empty"));
        }

        tracing::info!(
            expiry_minutes = SESSION_EXPIRY_MINUTES,
            "Session service initialized with HS256 secret"
        );

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    pub fn issue(&self, user: &User) -> Result<String, ServiceError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if it were `issued_at`.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, ServiceError> {
        let exp = issued_at + Duration::minutes(SESSION_EXPIRY_MINUTES);
        let claims = SessionClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))?;
        Ok(token)
    }

    /// Check signature and expiry. Any failure is reported as unauthenticated.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Session token rejected");
                ServiceError::Unauthenticated("Invalid or expired token".to_string())
            })
    }

    pub fn ttl_seconds(&self) -> i64 {
        SESSION_EXPIRY_MINUTES * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
        }
    }

    fn user() -> User {
        let mut user = User::new("Ada".into(), "ada@example.com".into(), "hash".into());
        user.role = Role::Management;
        user
    }

    #[test]
    fn issued_token_verifies() {
        let service = SessionService::new(&config("test-secret-that-is-long-enough-123")).unwrap();
        let user = user();

        let token = service.issue(&user).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, Role::Management);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(service.ttl_seconds(), 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = SessionService::new(&config("test-secret-that-is-long-enough-123")).unwrap();
        let token = service
            .issue_at(&user(), Utc::now() - Duration::minutes(61))
            .unwrap();

        let err = service.verify(&token).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = SessionService::new(&config("one-secret-that-is-long-enough-1234")).unwrap();
        let verifier = SessionService::new(&config("another-secret-that-is-long-enough")).unwrap();
        let token = issuer.issue(&user()).unwrap();

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        let service = SessionService::new(&config("test-secret-that-is-long-enough-123")).unwrap();
        assert!(service.verify("not-a-jwt").is_err());
        assert!(service.verify("").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(SessionService::new(&config("")).is_err());
    }
}
