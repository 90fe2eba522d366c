mod common;

use axum::http::StatusCode;
use common::{TestApp, NEWS_IT, SOFTWARE_WRITING};
use serde_json::json;
use vault_service::models::Role;

#[tokio::test]
async fn listing_users_requires_management_or_admin() {
    let app = TestApp::new().await;
    let normal = app.register("Ada", "ada@example.com").await;
    let manager = app.user_with_role("manager@example.com", Role::Management).await;

    assert_eq!(app.get("/users", &normal.token).await.status, StatusCode::FORBIDDEN);

    let res = app.get("/users", &manager.token).await;
    assert_eq!(res.status, StatusCode::OK);

    let items = res.body["items"].as_array().expect("items");
    let emails: Vec<_> = items.iter().map(|u| u["email"].as_str().expect("email")).collect();
    assert_eq!(emails, ["ada@example.com", "manager@example.com"]);
    for item in items {
        assert!(item.get("passwordHash").is_none());
        assert!(item.get("password_hash").is_none());
    }
}

#[tokio::test]
async fn assign_sets_unit_and_division_together() {
    let app = TestApp::new().await;
    let manager = app.user_with_role("manager@example.com", Role::Management).await;
    let user = app.register("Ada", "ada@example.com").await;

    let res = app
        .post(
            &format!("/users/{}/assign", user.id),
            Some(&manager.token),
            json!({ "unitId": "news-management", "divisionId": NEWS_IT }),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["orgUnitId"], "news-management");
    assert_eq!(res.body["user"]["divisionId"], NEWS_IT);
}

#[tokio::test]
async fn assign_with_division_of_another_unit_keeps_prior_assignment() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("admin@example.com", Role::Admin).await;
    let user = app.register("Ada", "ada@example.com").await;
    let uri = format!("/users/{}/assign", user.id);

    app.post(
        &uri,
        Some(&admin.token),
        json!({ "unitId": "news-management", "divisionId": NEWS_IT }),
    )
    .await;

    let res = app
        .post(
            &uri,
            Some(&admin.token),
            json!({ "unitId": "news-management", "divisionId": SOFTWARE_WRITING }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_division(&user.id).await.as_deref(), Some(NEWS_IT));
}

#[tokio::test]
async fn assign_reports_missing_user_and_unit() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("admin@example.com", Role::Admin).await;
    let user = app.register("Ada", "ada@example.com").await;

    let res = app
        .post(
            "/users/no-such-user/assign",
            Some(&admin.token),
            json!({ "unitId": "news-management", "divisionId": NEWS_IT }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .post(
            &format!("/users/{}/assign", user.id),
            Some(&admin.token),
            json!({ "unitId": "no-such-unit", "divisionId": NEWS_IT }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .post(
            &format!("/users/{}/assign", user.id),
            Some(&admin.token),
            json!({ "unitId": "news-management" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn normal_user_cannot_assign_or_unassign() {
    let app = TestApp::new().await;
    let user = app.register("Ada", "ada@example.com").await;
    let uri = format!("/users/{}/assign", user.id);

    let res = app
        .post(
            &uri,
            Some(&user.token),
            json!({ "unitId": "news-management", "divisionId": NEWS_IT }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, &user.token).await.status, StatusCode::FORBIDDEN);
    assert!(app.stored_division(&user.id).await.is_none());
}

#[tokio::test]
async fn unassign_is_idempotent() {
    let app = TestApp::new().await;
    let manager = app.user_with_role("manager@example.com", Role::Management).await;
    let user = app.register("Ada", "ada@example.com").await;
    let uri = format!("/users/{}/assign", user.id);

    app.post(
        &uri,
        Some(&manager.token),
        json!({ "unitId": "news-management", "divisionId": NEWS_IT }),
    )
    .await;

    for _ in 0..2 {
        let res = app.delete(&uri, &manager.token).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.body["user"]["orgUnitId"].is_null());
        assert!(res.body["user"]["divisionId"].is_null());
    }

    let res = app.delete("/users/no-such-user/assign", &manager.token).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_change_flags_relogin_only_for_self() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("admin@example.com", Role::Admin).await;
    let user = app.register("Ada", "ada@example.com").await;

    let res = app
        .put(
            &format!("/users/{}/role", user.id),
            &admin.token,
            json!({ "role": "management" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["role"], "management");
    assert_eq!(res.body["requireReLogin"], false);

    let res = app
        .put(
            &format!("/users/{}/role", admin.id),
            &admin.token,
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["requireReLogin"], true);
}

#[tokio::test]
async fn role_change_is_admin_only() {
    let app = TestApp::new().await;
    let manager = app.user_with_role("manager@example.com", Role::Management).await;
    let user = app.register("Ada", "ada@example.com").await;

    let res = app
        .put(
            &format!("/users/{}/role", user.id),
            &manager.token,
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_change_validates_role_then_target() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("admin@example.com", Role::Admin).await;
    let user = app.register("Ada", "ada@example.com").await;

    let res = app
        .put(
            &format!("/users/{}/role", user.id),
            &admin.token,
            json!({ "role": "superuser" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .put("/users/no-such-user/role", &admin.token, json!({ "role": "normal" }))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn permission_is_checked_before_the_body() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("admin@example.com", Role::Admin).await;
    let manager = app.user_with_role("manager@example.com", Role::Management).await;
    let user = app.register("Ada", "ada@example.com").await;
    let role_uri = format!("/users/{}/role", user.id);
    let assign_uri = format!("/users/{}/assign", user.id);

    for token in [&user.token, &manager.token] {
        let res = app.put(&role_uri, token, json!({})).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
    }
    let res = app.put(&role_uri, &admin.token, json!({})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.post(&assign_uri, Some(&user.token), json!({})).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.post(&assign_uri, Some(&manager.token), json!({})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
