//! Account management integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn create_account_grants_welcome_bonus() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["coin_balance"], 10);
    assert_eq!(body["subscription_tier"], "free");
    assert_eq!(body["subscription_active"], false);

    // The bonus is on the audit trail.
    let response = harness
        .server
        .get("/v1/coins/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount"], 10);
    assert_eq!(transactions[0]["transaction_type"], "bonus");
}

#[tokio::test]
async fn create_account_twice_conflicts() {
    let harness = TestHarness::new();
    harness.create_account().await;

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({}))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    // No second welcome bonus.
    assert_eq!(harness.balance().await, 10);
}

#[tokio::test]
async fn get_account_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/accounts/me").await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn get_missing_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/accounts/me")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn delete_account() {
    let harness = TestHarness::new();
    harness.create_account().await;

    harness
        .server
        .delete("/v1/accounts/me")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    harness
        .server
        .get("/v1/accounts/me")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn accounts_are_isolated_per_user() {
    let harness = TestHarness::new();
    harness.create_account().await;

    // A different user has no account.
    let response = harness
        .server
        .get("/v1/accounts/me")
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}
