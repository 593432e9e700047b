//! Common test utilities for daswos-coins integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use daswos_coins_core::UserId;
use daswos_coins_service::{create_router, AppState, ServiceConfig};
use daswos_coins_store::RocksStore;

/// Default system wallet reserve used by tests.
pub const TEST_RESERVE: i64 = 1_000;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user id for authenticated requests.
    pub test_user_id: UserId,
    /// The admin API key for grant requests.
    pub admin_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and the default
    /// system reserve.
    pub fn new() -> Self {
        Self::with_reserve(TEST_RESERVE)
    }

    /// Create a harness whose system wallet starts at `reserve` coins.
    pub fn with_reserve(reserve: i64) -> Self {
        Self::build(reserve, None)
    }

    /// Create a harness with a Stripe webhook secret configured (and no
    /// Stripe API key, as in a deployment that only consumes webhooks).
    pub fn with_webhook_secret(secret: &str) -> Self {
        Self::build(TEST_RESERVE, Some(secret.to_string()))
    }

    fn build(reserve: i64, stripe_webhook_secret: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let admin_api_key = "test-admin-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            admin_api_key: Some(admin_api_key.clone()),
            stripe_webhook_secret,
            system_reserve_coins: reserve,
            coin_supply_cap: 1_000_000,
            ..ServiceConfig::default()
        };

        let state = AppState::new(Arc::new(store), config);
        state
            .ledger
            .provision(reserve, 1_000_000)
            .expect("Failed to provision ledger");

        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_id: UserId::new(42),
            admin_api_key,
        }
    }

    /// Get the authorization header for the default test user.
    pub fn user_auth_header(&self) -> String {
        Self::auth_header_for(self.test_user_id)
    }

    /// Get the authorization header for an arbitrary user.
    pub fn auth_header_for(user_id: UserId) -> String {
        format!("Bearer test-token:{user_id}")
    }

    /// Grant coins to a user through the admin endpoint.
    pub async fn give_coins(&self, user_id: UserId, amount: i64) {
        self.server
            .post("/v1/coins/give")
            .add_header("x-admin-key", self.admin_api_key.clone())
            .json(&serde_json::json!({
                "user_id": user_id.as_i64(),
                "amount": amount,
                "reason": "test seed"
            }))
            .await
            .assert_status_ok();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
