//! Shared setup for vault-service integration tests.
//!
//! Drives the full router in-process against the in-memory store.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use service_core::config::Config;
use std::sync::Arc;
use tower::ServiceExt;
use vault_service::{
    build_router,
    config::{
        Environment, JwtConfig, MongoConfig, ProvisioningConfig, SecurityConfig, VaultConfig,
    },
    models::Role,
    services::{provisioning, IdentityStore, MemoryStore},
    utils::Password,
    AppState,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Division ids from the seeded default hierarchy.
pub const NEWS_IT: &str = "news-management-it";
pub const NEWS_FINANCE: &str = "news-management-finance";
pub const SOFTWARE_WRITING: &str = "software-reviews-writing";

pub fn test_config() -> VaultConfig {
    VaultConfig {
        common: Config { port: 8080 },
        environment: Environment::Dev,
        service_name: "vault-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: "mongodb://unused".to_string(),
            database: "unused".to_string(),
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        provisioning: ProvisioningConfig {
            seed_hierarchy: true,
            bootstrap_admin: None,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

/// A user created directly in the store, with a fresh token.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Router over an in-memory store holding the default hierarchy.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        provisioning::seed_hierarchy(&*store)
            .await
            .expect("seed hierarchy");

        let state = AppState::new(test_config(), store.clone(), store.clone())
            .expect("build app state");
        let router = build_router(state.clone()).expect("build router");

        Self {
            router,
            state,
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register through the HTTP API.
    pub async fn register(&self, name: &str, email: &str) -> TestUser {
        let res = self
            .post(
                "/register",
                None,
                serde_json::json!({ "name": name, "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);

        TestUser {
            id: res.body["user"]["id"].as_str().expect("user id").to_string(),
            email: email.to_string(),
            token: res.body["token"].as_str().expect("token").to_string(),
        }
    }

    /// Login through the HTTP API and return the new token.
    pub async fn login(&self, email: &str) -> String {
        let res = self
            .post(
                "/login",
                None,
                serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().expect("token").to_string()
    }

    /// Create a user with `role` directly in the store and log it in.
    pub async fn user_with_role(&self, email: &str, role: Role) -> TestUser {
        let user = self
            .state
            .auth_service
            .create_user("Test User", email, Password::new(TEST_PASSWORD.to_string()), role)
            .await
            .expect("create user");
        let token = self.login(email).await;

        TestUser {
            id: user.id,
            email: email.to_string(),
            token,
        }
    }

    pub async fn stored_division(&self, user_id: &str) -> Option<String> {
        self.store
            .find_user_by_id(user_id)
            .await
            .expect("lookup")
            .expect("user exists")
            .division_id
    }
}
