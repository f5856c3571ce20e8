//! Coin balance, spend, and grant integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

/// ULIDs within the same millisecond have random ordering; tests that
/// assert listing order space their writes across timestamp ticks.
async fn pause_for_ulid_tick() {
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
}

// ============================================================================
// Balance
// ============================================================================

#[tokio::test]
async fn get_balance_after_signup() {
    let harness = TestHarness::new();
    harness.create_account().await;

    assert_eq!(harness.balance().await, 10);
}

#[tokio::test]
async fn get_balance_without_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/coins/balance")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn get_balance_without_auth_fails() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/coins/balance")
        .await
        .assert_status_unauthorized();
}

// ============================================================================
// Spend
// ============================================================================

#[tokio::test]
async fn spend_coins_success() {
    let harness = TestHarness::new();
    harness.create_account().await;
    pause_for_ulid_tick().await;

    let response = harness
        .server
        .post("/v1/coins/spend")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "amount": 5, "description": "Test purchase" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["balance"], 5);

    // One new record with the signed amount.
    let response = harness
        .server
        .get("/v1/coins/transactions?limit=1")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let newest = &body["transactions"][0];
    assert_eq!(newest["amount"], -5);
    assert_eq!(newest["transaction_type"], "spent");
    assert_eq!(newest["description"], "Test purchase");
}

#[tokio::test]
async fn spend_more_than_balance_fails_closed() {
    let harness = TestHarness::new();
    harness.create_account().await;
    harness.spend_coins(8, "Burn down to 2").await;
    assert_eq!(harness.balance().await, 2);

    let response = harness
        .server
        .post("/v1/coins/spend")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "amount": 5, "description": "Test purchase" }))
        .await;

    response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_coins");
    assert_eq!(body["error"]["message"], "Insufficient coins");
    assert_eq!(body["error"]["details"]["balance"], 2);
    assert_eq!(body["error"]["details"]["required"], 5);

    // Balance and log are untouched.
    assert_eq!(harness.balance().await, 2);
}

#[tokio::test]
async fn spend_rejects_non_positive_amounts() {
    let harness = TestHarness::new();
    harness.create_account().await;

    for amount in [0, -3] {
        let response = harness
            .server
            .post("/v1/coins/spend")
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({ "amount": amount, "description": "Bad spend" }))
            .await;
        response.assert_status_bad_request();
    }

    assert_eq!(harness.balance().await, 10);
}

#[tokio::test]
async fn spend_without_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/coins/spend")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "amount": 1, "description": "Chat message" }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn spend_rejects_credit_transaction_type() {
    let harness = TestHarness::new();
    harness.create_account().await;

    let response = harness
        .server
        .post("/v1/coins/spend")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "amount": 5,
            "description": "Sneaky",
            "transaction_type": "earned"
        }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(harness.balance().await, 10);
}

// ============================================================================
// Grant
// ============================================================================

#[tokio::test]
async fn grant_coins_success() {
    let harness = TestHarness::new();
    harness.create_account().await;

    let response = harness
        .server
        .post("/v1/coins/grant")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "amount": 10, "description": "Bonus coins" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["balance"], 20);
}

#[tokio::test]
async fn sequential_grants_produce_distinct_records() {
    let harness = TestHarness::new();
    harness.create_account().await;

    harness.grant_coins(10, "Bonus coins").await;
    harness.grant_coins(10, "Bonus coins").await;

    let response = harness
        .server
        .get("/v1/coins/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();

    // Welcome bonus + two grants, all distinct records.
    assert_eq!(transactions.len(), 3);
    assert_ne!(transactions[0]["id"], transactions[1]["id"]);
    assert_eq!(harness.balance().await, 30);
}

#[tokio::test]
async fn grant_defaults_to_earned_type() {
    let harness = TestHarness::new();
    harness.create_account().await;
    pause_for_ulid_tick().await;

    harness.grant_coins(3, "Refund: Recipe generation failed").await;

    let response = harness
        .server
        .get("/v1/coins/transactions?limit=1")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"][0]["transaction_type"], "earned");
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn list_transactions_pagination() {
    let harness = TestHarness::new();
    harness.create_account().await;

    for i in 1..=4 {
        pause_for_ulid_tick().await;
        harness.spend_coins(1, &format!("Spend {i}")).await;
    }

    // 5 records total (welcome bonus + 4 spends), newest first.
    let response = harness
        .server
        .get("/v1/coins/transactions?limit=2&offset=0")
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let page = body["transactions"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["description"], "Spend 4");
    assert_eq!(body["has_more"], true);

    let response = harness
        .server
        .get("/v1/coins/transactions?limit=10&offset=4")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let page = body["transactions"].as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["description"], "Welcome bonus");
    assert_eq!(body["has_more"], false);
}
