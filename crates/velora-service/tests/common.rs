//! Common test utilities for velora-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use velora_core::UserId;
use velora_service::crypto::hmac_sha256_hex;
use velora_service::{create_router, AppState, ServiceConfig};
use velora_store::RocksStore;

/// Razorpay key secret used by the test configuration.
pub const TEST_KEY_SECRET: &str = "test_key_secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and default config.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness with config adjustments (e.g. mock provider URLs).
    pub fn with_config(customize: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_base_url: "http://localhost".into(),
            auth_audience: "velora".into(),
            razorpay_key_id: Some("rzp_test_key".into()),
            razorpay_key_secret: Some(TEST_KEY_SECRET.into()),
            ..ServiceConfig::default()
        };
        customize(&mut config);

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_id,
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        let other_user = UserId::generate();
        format!("Bearer test-token:{other_user}")
    }

    /// Create the test user's account (new accounts get the welcome bonus).
    pub async fn create_account(&self) {
        self.server
            .post("/v1/accounts")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({}))
            .await
            .assert_status_ok();
    }

    /// Grant coins to the test user through the API.
    pub async fn grant_coins(&self, amount: i64, description: &str) {
        self.server
            .post("/v1/coins/grant")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({ "amount": amount, "description": description }))
            .await
            .assert_status_ok();
    }

    /// Spend coins through the API, asserting success.
    pub async fn spend_coins(&self, amount: i64, description: &str) {
        self.server
            .post("/v1/coins/spend")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({ "amount": amount, "description": description }))
            .await
            .assert_status_ok();
    }

    /// Get the test user's current balance.
    pub async fn balance(&self) -> i64 {
        let response = self
            .server
            .get("/v1/coins/balance")
            .add_header("authorization", self.user_auth_header())
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["balance"].as_i64().expect("balance is an integer")
    }

    /// Compute a valid payment signature with the test key secret.
    pub fn sign_payment(&self, order_id: &str, payment_id: &str) -> String {
        hmac_sha256_hex(TEST_KEY_SECRET, &format!("{order_id}|{payment_id}"))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
