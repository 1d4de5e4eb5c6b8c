mod common;

use chrono::Duration;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_normalizes_email_and_hides_hash() {
    let app = TestApp::spawn().await;

    let body = app.register("  A@B.com ", "secret123").await;

    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["email"], "a@b.com");
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["is_verified"], false);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"].get("password_hash").is_none());
    assert!(!body.to_string().contains("pbkdf2"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register("a@b.com", "secret123").await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({ "email": "A@B.COM", "password": "secret456" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_bad_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.com", "password": "short" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].as_str().unwrap().contains("at least 8"));

    let response = app
        .post("/api/auth/register")
        .json(&json!({ "email": "not-an-email", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_success_and_wrong_password() {
    let app = TestApp::spawn().await;
    let registered = app.register("a@b.com", "secret123").await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "email": "A@B.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["token_type"], "bearer");
    let token = body["data"]["access_token"].as_str().unwrap();
    let claims = app.token_service.verify(token).unwrap();
    assert_eq!(claims.sub, registered["data"]["id"].as_str().unwrap());

    let wrong = app
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body: serde_json::Value = wrong.json().await.expect("Failed to parse response");

    let unknown = app
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@b.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body: serde_json::Value = unknown.json().await.expect("Failed to parse response");

    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = TestApp::spawn().await;
    app.register("a@b.com", "secret123").await;
    let token = app.login("a@b.com", "secret123").await;

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "a@b.com");

    let missing = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .get_authenticated("/api/auth/me", "not-a-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_strict_and_permissive() {
    let app = TestApp::spawn().await;
    let registered = app.register("a@b.com", "secret123").await;
    let subject = registered["data"]["id"].as_str().unwrap();

    let expired = app
        .token_service
        .issue(subject, Duration::seconds(-3600))
        .unwrap();

    let strict = app
        .get_authenticated("/api/auth/me", &expired)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(strict.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = strict.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].as_str().unwrap().contains("expired"));

    let permissive = app
        .get_authenticated("/api/auth/session", &expired)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(permissive.status(), StatusCode::OK);
    let body: serde_json::Value = permissive.json().await.expect("Failed to parse response");
    assert_eq!(body["data"], json!({ "authenticated": false }));
}

#[tokio::test]
async fn test_session_reports_account() {
    let app = TestApp::spawn().await;
    app.register("a@b.com", "secret123").await;
    let token = app.login("a@b.com", "secret123").await;

    let response = app
        .get_authenticated("/api/auth/session", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["authenticated"], true);
    assert_eq!(body["data"]["account"]["email"], "a@b.com");

    let anonymous = app
        .get("/api/auth/session")
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = anonymous.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["authenticated"], false);
}

#[tokio::test]
async fn test_update_me() {
    let app = TestApp::spawn().await;
    app.register("a@b.com", "secret123").await;
    app.register("taken@b.com", "secret123").await;
    let token = app.login("a@b.com", "secret123").await;

    let response = app
        .patch_authenticated("/api/auth/me", &token)
        .json(&json!({ "display_name": "Alice", "email": "New@B.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["display_name"], "Alice");
    assert_eq!(body["data"]["email"], "new@b.com");

    let conflict = app
        .patch_authenticated("/api/auth/me", &token)
        .json(&json!({ "email": "taken@b.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(conflict.status(), StatusCode::CONFLICT);

    // Token stays valid: it names the account id, not the email.
    let token = app.login("new@b.com", "secret123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::spawn().await;
    app.register("a@b.com", "secret123").await;
    let token = app.login("a@b.com", "secret123").await;

    let wrong = app
        .put_authenticated("/api/auth/password", &token)
        .json(&json!({ "current_password": "nope", "new_password": "better-secret" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .put_authenticated("/api/auth/password", &token)
        .json(&json!({ "current_password": "secret123", "new_password": "better-secret" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get("content-type").is_none());
    let body = response.bytes().await.expect("Failed to read body");
    assert!(body.is_empty());

    let old = app
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    app.login("a@b.com", "better-secret").await;
}

#[tokio::test]
async fn test_inactive_account_is_forbidden_and_rejected() {
    use account_service::domain::account::models::AccountId;
    use account_service::domain::account::models::AccountUpdate;
    use account_service::domain::account::ports::AccountRepository;

    let app = TestApp::spawn().await;
    let registered = app.register("a@b.com", "secret123").await;
    let token = app.login("a@b.com", "secret123").await;
    let id = AccountId::from_string(registered["data"]["id"].as_str().unwrap()).unwrap();

    app.repository
        .update_account(
            &id,
            AccountUpdate {
                is_active: Some(false),
                ..AccountUpdate::default()
            },
        )
        .await
        .unwrap();

    let login = app
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(login.status(), StatusCode::FORBIDDEN);

    let me = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_cookie_and_logout() {
    let app = TestApp::spawn().await;
    app.register("a@b.com", "secret123").await;
    let token = app.login("a@b.com", "secret123").await;
    let cookie = format!("access_token={}", token);

    let me = app
        .get("/api/auth/me")
        .header("cookie", &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status(), StatusCode::OK);

    let session = app
        .get("/api/auth/session")
        .header("cookie", &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = session.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["authenticated"], true);

    let logout = app
        .post("/api/auth/logout")
        .header("cookie", &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let set_cookie = logout
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .expect("Missing set-cookie header");
    assert!(set_cookie.starts_with("access_token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
