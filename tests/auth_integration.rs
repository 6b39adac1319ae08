mod common;

use common::{spawn_app, TEST_PASSWORD};
use serde_json::{json, Value};

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_201_and_the_user() {
    let app = spawn_app();

    let response = app.register("Alice@Example.com", TEST_PASSWORD).await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].as_str().is_some());
    assert!(body.get("password_hash").is_none());
    assert_eq!(app.store.user_count(), 1);
}

#[tokio::test]
async fn register_returns_400_for_invalid_input() {
    let app = spawn_app();
    let test_cases = vec![
        (json!({"email": "not-an-email", "password": TEST_PASSWORD}), "invalid email"),
        (json!({"email": "alice@example.com", "password": "short"}), "short password"),
        (json!({"email": "alice@example.com"}), "missing password"),
        (json!({"password": TEST_PASSWORD}), "missing email"),
    ];

    for (body, description) in test_cases {
        let response = app.post_json("/auth/register", &body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "Expected 400 for {}",
            description
        );
    }
    assert_eq!(app.store.user_count(), 0);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = spawn_app();
    app.register("alice@example.com", TEST_PASSWORD).await;

    let response = app.register("ALICE@example.com", "otherpassword").await;
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["message"], "user with this email already exists");
}

#[tokio::test]
async fn malformed_json_returns_400_with_error_body() {
    let app = spawn_app();

    let response = app
        .client
        .post(&app.url("/auth/register"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], 400);
    assert!(body["error_id"].as_str().is_some());
    assert!(body["timestamp"].as_str().is_some());
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_tokens_and_records_refresh_token() {
    let app = spawn_app();
    let body = app.signed_in_user("alice@example.com").await;

    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert_eq!(body["user"]["email"], "alice@example.com");

    let refresh_token = body["refresh_token"].as_str().unwrap();
    let user_id = body["user"]["id"].as_str().unwrap();
    assert_eq!(app.ledger.lookup(refresh_token).as_deref(), Some(user_id));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    app.register("alice@example.com", TEST_PASSWORD).await;

    let wrong_password = app.login("alice@example.com", "password124").await;
    let unknown_user = app.login("bob@example.com", TEST_PASSWORD).await;

    assert_eq!(400, wrong_password.status().as_u16());
    assert_eq!(400, unknown_user.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
    assert!(app.ledger.is_empty());
}

// --- Refresh / Logout Tests ---

#[tokio::test]
async fn refresh_issues_new_access_token() {
    let app = spawn_app();
    let login = app.signed_in_user("alice@example.com").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = app
        .post_json("/auth/refresh", &json!({ "refresh_token": refresh_token }))
        .await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    let access_token = body["access_token"].as_str().unwrap();
    assert_ne!(access_token, login["access_token"].as_str().unwrap());
    assert!(body.get("refresh_token").is_none());

    let me = app
        .client
        .get(&app.url("/auth/me"))
        .bearer_auth(access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, me.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_unknown_and_access_tokens() {
    let app = spawn_app();
    let login = app.signed_in_user("alice@example.com").await;

    for token in ["never-issued", login["access_token"].as_str().unwrap()] {
        let response = app
            .post_json("/auth/refresh", &json!({ "refresh_token": token }))
            .await;
        assert_eq!(400, response.status().as_u16());
    }
}

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let app = spawn_app();
    let login = app.signed_in_user("alice@example.com").await;
    let body = json!({ "refresh_token": login["refresh_token"] });

    let response = app.post_json("/auth/logout", &body).await;
    assert_eq!(204, response.status().as_u16());
    assert!(app.ledger.is_empty());

    let response = app.post_json("/auth/refresh", &body).await;
    assert_eq!(400, response.status().as_u16());

    // Logging out twice is harmless.
    let response = app.post_json("/auth/logout", &body).await;
    assert_eq!(204, response.status().as_u16());
}

// --- Authentication Gate Tests ---

#[tokio::test]
async fn me_returns_the_token_identity() {
    let app = spawn_app();
    let login = app.signed_in_user("alice@example.com").await;

    let response = app
        .client
        .get(&app.url("/auth/me"))
        .bearer_auth(login["access_token"].as_str().unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], login["user"]["id"]);
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn me_returns_401_without_valid_token() {
    let app = spawn_app();
    let login = app.signed_in_user("alice@example.com").await;

    let missing = app.client.get(&app.url("/auth/me")).send().await.unwrap();
    assert_eq!(401, missing.status().as_u16());

    let garbage = app
        .client
        .get(&app.url("/auth/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(401, garbage.status().as_u16());

    let wrong_scheme = app
        .client
        .get(&app.url("/auth/me"))
        .header("Authorization", "Basic abc")
        .send()
        .await
        .unwrap();
    assert_eq!(401, wrong_scheme.status().as_u16());

    // A refresh token is not an access token.
    let refresh = app
        .client
        .get(&app.url("/auth/me"))
        .bearer_auth(login["refresh_token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(401, refresh.status().as_u16());
}

// --- Error correlation ---

#[tokio::test]
async fn error_id_matches_request_id_header() {
    let app = spawn_app();

    let rejected_input = app.register("not-an-email", TEST_PASSWORD).await;
    let rejected_token = app
        .client
        .get(&app.url("/auth/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();

    for (response, expected_status) in [(rejected_input, 400), (rejected_token, 401)] {
        assert_eq!(expected_status, response.status().as_u16());
        let request_id = response
            .headers()
            .get("x-request-id")
            .expect("missing x-request-id")
            .to_str()
            .unwrap()
            .to_string();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error_id"], request_id.as_str());
    }
}

#[tokio::test]
async fn register_rejects_password_over_72_bytes() {
    let app = spawn_app();
    let password = "a".repeat(72) + "correct-suffix";

    let response = app.register("alice@example.com", &password).await;
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "password must not exceed 72 bytes");
    assert_eq!(app.store.user_count(), 0);
}
