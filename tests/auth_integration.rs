mod common;

use chrono::Duration;
use common::{error_code, spawn_app, tamper_signature, TTL_SECONDS};
use serde_json::Value;

// --- Login Tests ---

#[tokio::test]
async fn login_returns_token_for_valid_credentials() {
    let app = spawn_app().await;

    let response = app.post_login("admin", "123456").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_head"], "Bearer");
    assert_eq!(body["expires_in"], TTL_SECONDS);

    let token = body["token"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(app.tokens.verify(token).unwrap(), "admin");
}

#[tokio::test]
async fn login_returns_401_for_wrong_password_and_unknown_user_alike() {
    let app = spawn_app().await;

    let wrong_password = app.post_login("admin", "wrong-password").await;
    assert_eq!(401, wrong_password.status().as_u16());
    let wrong_password_body: Value = wrong_password.json().await.unwrap();

    let unknown_user = app.post_login("nobody", "123456").await;
    assert_eq!(401, unknown_user.status().as_u16());
    let unknown_user_body: Value = unknown_user.json().await.unwrap();

    assert_eq!(wrong_password_body["code"], "INVALID_CREDENTIALS");
    assert_eq!(wrong_password_body["code"], unknown_user_body["code"]);
    assert_eq!(wrong_password_body["message"], unknown_user_body["message"]);
}

#[tokio::test]
async fn login_returns_403_for_disabled_account() {
    let app = spawn_app().await;

    let response = app.post_login("frozen", "123456").await;

    assert_eq!(403, response.status().as_u16());
    assert_eq!(error_code(response).await, "ACCOUNT_DISABLED");
}

#[tokio::test]
async fn login_returns_400_for_invalid_username() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("", "empty username"),
        ("a", "too short"),
        ("admin' OR '1'='1", "sql injection"),
    ];

    for (username, description) in test_cases {
        let response = app.post_login(username, "123456").await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 when the username was {}.",
            description
        );
    }
}

#[tokio::test]
async fn logout_returns_200() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(&format!("{}/logout", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

// --- Protected Route Tests ---

#[tokio::test]
async fn admin_info_returns_profile_for_valid_token() {
    let app = spawn_app().await;
    let token = app.login_admin().await;

    let response = app.get("/api/admin/info", Some(&token)).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "admin");
    assert_eq!(body["name"], "System Administrator");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn admin_info_returns_401_without_token() {
    let app = spawn_app().await;

    let response = app.get("/api/admin/info", None).await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");
}

#[tokio::test]
async fn admin_info_returns_401_for_wrong_scheme() {
    let app = spawn_app().await;
    let token = app.login_admin().await;

    let response = app
        .client
        .get(&format!("{}/api/admin/info", &app.address))
        .header("Authorization", format!("Basic {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");
}

#[tokio::test]
async fn admin_info_returns_401_for_tampered_signature() {
    let app = spawn_app().await;
    let token = app.login_admin().await;

    let response = app.get("/api/admin/info", Some(&tamper_signature(&token))).await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_SIGNATURE_INVALID");
}

#[tokio::test]
async fn admin_info_returns_401_for_garbage_token() {
    let app = spawn_app().await;

    let response = app.get("/api/admin/info", Some("not-a-token")).await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_MALFORMED");
}

#[tokio::test]
async fn admin_info_returns_401_once_token_expires() {
    let app = spawn_app().await;
    let token = app.login_admin().await;

    app.clock.advance(Duration::seconds(TTL_SECONDS - 1));
    let still_valid = app.get("/api/admin/info", Some(&token)).await;
    assert_eq!(200, still_valid.status().as_u16());

    app.clock.advance(Duration::seconds(1));
    let expired = app.get("/api/admin/info", Some(&token)).await;
    assert_eq!(401, expired.status().as_u16());
    assert_eq!(error_code(expired).await, "TOKEN_EXPIRED");
}

#[tokio::test]
async fn admin_info_returns_401_for_token_of_unknown_user() {
    let app = spawn_app().await;
    let token = app.tokens.issue("ghost").unwrap();

    let response = app.get("/api/admin/info", Some(&token)).await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "UNKNOWN_SUBJECT");
}

#[tokio::test]
async fn admin_info_returns_403_after_account_is_disabled() {
    let app = spawn_app().await;
    let token = app.login_admin().await;

    app.users
        .insert(common::admin_user(1, "admin", false))
        .await;

    let response = app.get("/api/admin/info", Some(&token)).await;

    assert_eq!(403, response.status().as_u16());
    assert_eq!(error_code(response).await, "ACCOUNT_DISABLED");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(&format!("{}/health_check", &app.address))
        .header("x-request-id", "trace-me-42")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("trace-me-42")
    );
}

#[tokio::test]
async fn rejected_request_error_id_matches_request_id_header() {
    let app = spawn_app().await;

    let response = app.get("/api/admin/info", None).await;

    assert_eq!(401, response.status().as_u16());
    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("x-request-id missing on rejected request");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error_id"], header.as_str());
}

#[tokio::test]
async fn caller_request_id_becomes_error_id() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(&format!("{}/login", &app.address))
        .header("x-request-id", "login-attempt-7")
        .json(&serde_json::json!({ "username": "admin", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("login-attempt-7")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error_id"], "login-attempt-7");
}

// --- Refresh Tests ---

#[tokio::test]
async fn refresh_returns_token_with_later_expiration() {
    let app = spawn_app().await;
    let token = app.login_admin().await;
    let original = app.tokens.claims(&token).unwrap();

    app.clock.advance(Duration::seconds(60));

    let response = app
        .client
        .post(&format!("{}/auth/refresh", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let refreshed = body["token"].as_str().unwrap();
    let renewed = app.tokens.claims(refreshed).unwrap();

    assert_eq!(renewed.sub, "admin");
    assert!(renewed.exp > original.exp);
    assert!(renewed.created > original.created);

    let me = app.get("/api/admin/info", Some(refreshed)).await;
    assert_eq!(200, me.status().as_u16());
}

#[tokio::test]
async fn refresh_right_after_login_still_extends_expiration() {
    let app = spawn_app().await;
    let token = app.login_admin().await;
    let original = app.tokens.claims(&token).unwrap();

    let response = app.post_refresh(&token).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let first = body["token"].as_str().unwrap().to_string();
    let first_claims = app.tokens.claims(&first).unwrap();
    assert!(first_claims.exp > original.exp);

    app.clock.advance(Duration::milliseconds(300));
    let response = app.post_refresh(&first).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let second = app.tokens.claims(body["token"].as_str().unwrap()).unwrap();
    assert!(second.exp > first_claims.exp);
}

#[tokio::test]
async fn refresh_returns_401_for_expired_token() {
    let app = spawn_app().await;
    let token = app.login_admin().await;
    app.clock.advance(Duration::seconds(TTL_SECONDS));

    let response = app
        .client
        .post(&format!("{}/auth/refresh", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_EXPIRED");
}

#[tokio::test]
async fn refresh_returns_401_without_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(&format!("{}/auth/refresh", &app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");
}

#[tokio::test]
async fn refresh_returns_401_for_tampered_token() {
    let app = spawn_app().await;
    let token = app.login_admin().await;

    let response = app
        .client
        .post(&format!("{}/auth/refresh", &app.address))
        .header("Authorization", format!("Bearer {}", tamper_signature(&token)))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_SIGNATURE_INVALID");
}
