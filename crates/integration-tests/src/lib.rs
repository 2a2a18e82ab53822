//! Integration tests for Bazaar.
//!
//! These tests drive a running server over HTTP and are `#[ignore]`d by
//! default.
//!
//! # Requirements
//!
//! - A running `PostgreSQL` database with migrations applied
//!   (`cargo run -p bazaar-cli -- migrate`)
//! - The server running (`cargo run -p bazaar-server`)
//! - An admin account matching `BAZAAR_ADMIN_EMAIL` / `BAZAAR_ADMIN_PASSWORD`
//!   (`cargo run -p bazaar-cli -- admin create -e admin@example.com -p ... -n Admin`)
//!
//! # Running
//!
//! ```bash
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("BAZAAR_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_owned())
}

/// A test session: one cookie-holding client against the configured server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a fresh context with its own cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url(),
        }
    }

    /// Build a full URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register an account.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn register(&self, email: &str, password: &str, fullname: &str) -> reqwest::Response {
        self.client
            .post(self.url("/user"))
            .json(&json!({ "email": email, "password": password, "fullname": fullname }))
            .send()
            .await
            .expect("register request failed")
    }

    /// Log in; on success the session cookie lands in this context's jar.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/compare"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed")
    }

    /// Register a fresh user and log them in, returning their email.
    ///
    /// # Panics
    ///
    /// Panics if registration or login does not succeed.
    pub async fn signed_in_user(&self, prefix: &str) -> String {
        let email = unique_email(prefix);
        let resp = self.register(&email, "secret1", prefix).await;
        assert!(
            resp.status().is_success(),
            "registration failed: {}",
            resp.status()
        );

        let resp = self.login(&email, "secret1").await;
        assert!(resp.status().is_success(), "login failed: {}", resp.status());
        email
    }

    /// Parse a response body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    pub async fn body(resp: reqwest::Response) -> Value {
        resp.json().await.expect("response body was not JSON")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A context logged in as the environment-provided admin account.
///
/// # Panics
///
/// Panics if the admin login fails (see crate docs for bootstrap).
pub async fn admin_context() -> TestContext {
    let email =
        std::env::var("BAZAAR_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_owned());
    let password =
        std::env::var("BAZAAR_ADMIN_PASSWORD").unwrap_or_else(|_| "integration-admin".to_owned());

    let ctx = TestContext::new();
    let resp = ctx.login(&email, &password).await;
    assert!(
        resp.status().is_success(),
        "admin login failed ({}): create the account with bazaar-cli first",
        resp.status()
    );
    ctx
}

/// Generate a unique email so tests don't collide across runs.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@integration.test", Uuid::new_v4())
}
