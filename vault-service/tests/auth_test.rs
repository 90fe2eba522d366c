mod common;

use axum::http::StatusCode;
use common::{TestApp, TEST_PASSWORD};
use serde_json::json;
use vault_service::models::Role;

#[tokio::test]
async fn register_returns_token_for_normal_unassigned_user() {
    let app = TestApp::new().await;

    let res = app
        .post(
            "/register",
            None,
            json!({ "name": "Ada", "email": "Ada@Example.com", "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["expiresIn"], 3600);

    let user = &res.body["user"];
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["role"], "normal");
    assert!(user["orgUnitId"].is_null());
    assert!(user["divisionId"].is_null());
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password_hash").is_none());

    let token = res.body["token"].as_str().expect("token");
    let claims = app.state.sessions.verify(token).expect("token verifies");
    assert_eq!(claims.role, Role::Normal);
    assert_eq!(claims.sub, user["id"].as_str().expect("id"));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@example.com").await;

    let res = app
        .post(
            "/register",
            None,
            json!({ "name": "Imposter", "email": "ADA@example.com", "password": "other" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "Email already registered");
}

#[tokio::test]
async fn register_rejects_missing_or_invalid_fields() {
    let app = TestApp::new().await;

    let cases = [
        json!({ "email": "a@example.com", "password": "pw" }),
        json!({ "name": "", "email": "a@example.com", "password": "pw" }),
        json!({ "name": "A", "email": "not-an-email", "password": "pw" }),
        json!({ "name": "A", "email": "a@example.com", "password": "" }),
        json!({ "name": "   ", "email": "a@example.com", "password": "pw" }),
    ];

    for body in cases {
        let res = app.post("/register", None, body.clone()).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert!(res.body["error"].is_string());
    }
}

#[tokio::test]
async fn login_succeeds_with_correct_password() {
    let app = TestApp::new().await;
    let user = app.register("Ada", "ada@example.com").await;

    let res = app
        .post(
            "/login",
            None,
            json!({ "email": " ADA@example.com ", "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["id"], user.id.as_str());
    assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_identically() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@example.com").await;

    let wrong_password = app
        .post(
            "/login",
            None,
            json!({ "email": "ada@example.com", "password": "nope" }),
        )
        .await;
    let unknown_email = app
        .post(
            "/login",
            None,
            json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_with_missing_field_is_bad_request() {
    let app = TestApp::new().await;

    let res = app
        .post("/login", None, json!({ "email": "ada@example.com" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post("/login", None, json!({ "email": "", "password": "pw" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_trims_email_before_checking_its_format() {
    let app = TestApp::new().await;

    let res = app
        .post(
            "/register",
            None,
            json!({ "name": "Bob", "email": " Bob@Example.com ", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "body: {}", res.body);
    assert_eq!(res.body["user"]["email"], "bob@example.com");

    app.login("bob@example.com").await;

    let res = app
        .post(
            "/register",
            None,
            json!({ "name": "Bob", "email": " not an email ", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Invalid email format");
}
