#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::net::TcpListener;
use std::sync::Arc;
use yeb_server::auth::{hash_password, ManualClock, TokenService};
use yeb_server::configuration::JwtSettings;
use yeb_server::department::InMemoryDepartmentRepository;
use yeb_server::startup::run;
use yeb_server::user::{InMemoryUserRepository, User};

pub const TTL_SECONDS: i64 = 3600;
pub const PASSWORD: &str = "123456";

pub struct TestApp {
    pub address: String,
    pub clock: Arc<ManualClock>,
    pub tokens: TokenService,
    pub users: Arc<InMemoryUserRepository>,
    pub departments: Arc<InMemoryDepartmentRepository>,
    pub client: reqwest::Client,
}

pub fn admin_user(id: i32, username: &str, enabled: bool) -> User {
    User {
        id,
        username: username.to_string(),
        password_hash: hash_password(PASSWORD, 4).expect("Failed to hash password"),
        name: "System Administrator".to_string(),
        enabled,
    }
}

/// Server on a random port with in-memory stores and a clock the test drives.
pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // whole second, so "advance by TTL" lands exactly on `exp`
    let start = DateTime::from_timestamp(Utc::now().timestamp(), 0).expect("valid timestamp");
    let clock = Arc::new(ManualClock::new(start));
    let jwt_config = JwtSettings::new("integration-test-secret", TTL_SECONDS);
    let tokens = TokenService::with_clock(&jwt_config, clock.clone());

    let users = Arc::new(InMemoryUserRepository::with_users([
        admin_user(1, "admin", true),
        admin_user(2, "frozen", false),
    ]));
    let departments = Arc::new(InMemoryDepartmentRepository::new());

    let server = run(
        listener,
        tokens.clone(),
        departments.clone(),
        users.clone(),
        jwt_config,
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        clock,
        tokens,
        users,
        departments,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post_login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/login", &self.address))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Log in as `admin` and return the raw token.
    pub async fn login_admin(&self) -> String {
        let response = self.post_login("admin", PASSWORD).await;
        assert_eq!(200, response.status().as_u16());
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().expect("token missing").to_string()
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}{}", &self.address, path));
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(&format!("{}{}", &self.address, path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_refresh(&self, token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/auth/refresh", &self.address))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Flip the first character of the signature segment.
pub fn tamper_signature(token: &str) -> String {
    let signature_start = token.rfind('.').expect("not a JWS") + 1;
    let mut bytes = token.as_bytes().to_vec();
    bytes[signature_start] = if bytes[signature_start] == b'A' { b'B' } else { b'A' };
    String::from_utf8(bytes).unwrap()
}

pub async fn error_code(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Failed to parse error body");
    body["code"].as_str().unwrap_or_default().to_string()
}
