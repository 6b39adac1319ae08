#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use qa_service::auth::{RefreshTokenLedger, TokenSigner, MIN_HASH_COST};
use qa_service::configuration::JwtSettings;
use qa_service::repository::InMemoryStore;
use qa_service::startup::{run, AppServices};
use serde_json::{json, Value};

pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub ledger: Arc<RefreshTokenLedger>,
    pub store: Arc<InMemoryStore>,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
        issuer: "qa-service-test".to_string(),
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryStore::new());
    let ledger = Arc::new(RefreshTokenLedger::new());
    let services = AppServices::new(
        store.clone(),
        TokenSigner::new(&jwt_settings()),
        ledger.clone(),
        MIN_HASH_COST,
    );

    let server = run(listener, services).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        ledger,
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/auth/register", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    /// Registers `email` and logs in, returning the login response body.
    pub async fn signed_in_user(&self, email: &str) -> Value {
        assert_eq!(201, self.register(email, TEST_PASSWORD).await.status().as_u16());
        let response = self.login(email, TEST_PASSWORD).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}
