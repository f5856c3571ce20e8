//! Velora HTTP client implementation.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    AccountResponse, ApiErrorResponse, BalanceResponse, ChatResponse, ChatTurn,
    CoinMutationResponse, CreateOrderResponse, GenerateRecipeResponse, ListTransactionsResponse,
    SubscriptionStatusResponse, VerifyPaymentResponse,
};

/// Options for constructing a [`VeloraClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
        }
    }
}

/// Velora API client.
///
/// Authenticates with the caller's bearer token (the identity provider's
/// JWT); the service resolves it to the acting user.
#[derive(Debug, Clone)]
pub struct VeloraClient {
    client: Client,
    base_url: String,
    bearer_token: String,
}

impl VeloraClient {
    /// Create a new Velora client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the service (e.g., `"http://localhost:8080"`)
    /// * `bearer_token` - The user's JWT
    #[must_use]
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self::with_options(base_url, bearer_token, ClientOptions::default())
    }

    /// Create a new Velora client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create the caller's account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the account already exists.
    pub async fn create_account(
        &self,
        email: Option<&str>,
    ) -> Result<AccountResponse, ClientError> {
        let response = self
            .post("/v1/accounts")
            .json(&json!({ "email": email }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Get the caller's account summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no account exists.
    pub async fn get_account(&self) -> Result<AccountResponse, ClientError> {
        let response = self.get("/v1/accounts/me").send().await?;

        Self::handle_response(response).await
    }

    // =========================================================================
    // Coins
    // =========================================================================

    /// Get the caller's coin balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_balance(&self) -> Result<BalanceResponse, ClientError> {
        let response = self.get("/v1/coins/balance").send().await?;

        Self::handle_response(response).await
    }

    /// List the caller's transaction history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_transactions(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<ListTransactionsResponse, ClientError> {
        let url = format!(
            "{}/v1/coins/transactions?limit={limit}&offset={offset}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Spend coins.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InsufficientCoins`] when the balance can't
    /// cover the spend; other failures map to their API errors.
    pub async fn spend_coins(
        &self,
        amount: i64,
        description: &str,
    ) -> Result<CoinMutationResponse, ClientError> {
        let response = self
            .post("/v1/coins/spend")
            .json(&json!({ "amount": amount, "description": description }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Grant coins (refunds, rewards).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn grant_coins(
        &self,
        amount: i64,
        description: &str,
    ) -> Result<CoinMutationResponse, ClientError> {
        let response = self
            .post("/v1/coins/grant")
            .json(&json!({ "amount": amount, "description": description }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    // =========================================================================
    // AI
    // =========================================================================

    /// Send a chat message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the caller is rate limited, or
    /// the balance can't cover the message.
    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<ChatResponse, ClientError> {
        let response = self
            .post("/v1/ai/chat")
            .json(&json!({ "message": message, "history": history }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Generate a recipe.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the caller is rate limited, or
    /// the balance can't cover the generation.
    pub async fn generate_recipe(
        &self,
        ingredients: &[String],
        dietary_preferences: Option<&str>,
    ) -> Result<GenerateRecipeResponse, ClientError> {
        let response = self
            .post("/v1/ai/recipes")
            .json(&json!({
                "ingredients": ingredients,
                "dietary_preferences": dietary_preferences
            }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Create a payment order for checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects it.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: Option<&str>,
    ) -> Result<CreateOrderResponse, ClientError> {
        let response = self
            .post("/v1/payments/orders")
            .json(&json!({ "amount": amount, "currency": currency }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Verify a completed payment and settle the subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::PaymentAlreadyProcessed`] on a replayed
    /// payment; other failures map to their API errors.
    pub async fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
        tier: &str,
    ) -> Result<VerifyPaymentResponse, ClientError> {
        let response = self
            .post("/v1/payments/verify")
            .json(&json!({
                "order_id": order_id,
                "payment_id": payment_id,
                "signature": signature,
                "tier": tier
            }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Get the caller's subscription status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn subscription_status(&self) -> Result<SubscriptionStatusResponse, ClientError> {
        let response = self.get("/v1/subscription").send().await?;

        Self::handle_response(response).await
    }

    /// Cancel the caller's subscription. Remaining coins are retained.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn cancel_subscription(&self) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/v1/subscription", self.base_url);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn get(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{endpoint}", self.base_url))
            .bearer_auth(&self.bearer_token)
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{endpoint}", self.base_url))
            .bearer_auth(&self.bearer_token)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse the error envelope
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message.clone();

                // Map specific error codes to typed errors
                match code {
                    "insufficient_coins" => {
                        let balance = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("balance"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);
                        let required = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("required"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);

                        Err(ClientError::InsufficientCoins { balance, required })
                    }
                    "rate_limited" => Err(ClientError::RateLimited),
                    "payment_already_processed" => Err(ClientError::PaymentAlreadyProcessed),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}
