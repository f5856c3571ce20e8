//! Application state.

use std::sync::Arc;
use std::time::Duration;

use velora_store::RocksStore;

use crate::config::ServiceConfig;
use crate::ledger::CoinLedger;
use crate::llm::GeminiClient;
use crate::ratelimit::RateLimiter;
use crate::razorpay::RazorpayClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// The charge/grant engine.
    pub ledger: CoinLedger,

    /// Per-user throttle for paid AI endpoints.
    pub rate_limiter: Arc<RateLimiter>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Razorpay client for order creation (optional).
    pub razorpay: Option<Arc<RazorpayClient>>,

    /// Gemini client for AI endpoints (optional).
    pub llm: Option<Arc<GeminiClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let razorpay = config
            .razorpay_key_id
            .as_ref()
            .zip(config.razorpay_key_secret.as_ref())
            .map(|(key_id, key_secret)| {
                tracing::info!("Razorpay integration enabled");
                Arc::new(RazorpayClient::new(
                    &config.razorpay_api_url,
                    key_id,
                    key_secret,
                ))
            });

        if razorpay.is_none() {
            tracing::warn!("Razorpay not configured - payments will not be available");
        }

        let llm = config.gemini_api_key.as_ref().map(|api_key| {
            tracing::info!(model = %config.gemini_model, "Gemini integration enabled");
            Arc::new(GeminiClient::new(
                &config.gemini_api_url,
                api_key,
                &config.gemini_model,
            ))
        });

        if llm.is_none() {
            tracing::warn!("Gemini not configured - AI endpoints will not be available");
        }

        let rate_limiter = Arc::new(RateLimiter::in_memory(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_seconds),
        ));

        Self {
            ledger: CoinLedger::new(Arc::clone(&store)),
            store,
            rate_limiter,
            config,
            razorpay,
            llm,
        }
    }

    /// Check if Razorpay is configured.
    #[must_use]
    pub fn has_razorpay(&self) -> bool {
        self.razorpay.is_some()
    }

    /// Check if the LLM provider is configured.
    #[must_use]
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }
}
