//! Razorpay API client implementation.

use reqwest::Client;
use std::time::Duration;

use super::types::{ApiErrorResponse, Order, OrderRequest};

/// Error type for Razorpay operations.
#[derive(Debug, thiserror::Error)]
pub enum RazorpayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error.
    #[error("Razorpay API error: {description}")]
    Api {
        /// Provider error code.
        code: Option<String>,
        /// Provider error description.
        description: String,
    },
}

/// Razorpay API client.
///
/// Authenticates with Basic auth over the server-held key pair. The secret
/// never leaves the server; only the key ID is handed to checkout clients.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API base URL (production: `https://api.razorpay.com`)
    /// * `key_id` - Razorpay key ID (`rzp_...`)
    /// * `key_secret` - Razorpay key secret
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// The public key ID, for the checkout client.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a payment order upstream.
    ///
    /// Creating an order has no financial effect on the ledger; coins move
    /// only after the payment callback verifies.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects the
    /// order; the provider's description is preserved.
    pub async fn create_order(&self, request: &OrderRequest) -> Result<Order, RazorpayError> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json().await?);
        }

        let status = response.status();
        let description = match response.json::<ApiErrorResponse>().await {
            Ok(body) => {
                let description = body
                    .error
                    .description
                    .unwrap_or_else(|| "Failed to create order".to_string());
                return Err(RazorpayError::Api {
                    code: body.error.code,
                    description,
                });
            }
            Err(_) => format!("Order creation failed with status {status}"),
        };

        Err(RazorpayError::Api {
            code: None,
            description,
        })
    }
}
