//! Client SDK for the Velora service.
//!
//! This crate provides a typed HTTP client over the Velora API: accounts,
//! coin balance and transactions, AI endpoints, and payment flows. It is the
//! access path the mobile app uses.
//!
//! # Example
//!
//! ```no_run
//! use velora_client::VeloraClient;
//!
//! # async fn example() -> Result<(), velora_client::ClientError> {
//! let client = VeloraClient::new("http://localhost:8080", "user-jwt");
//!
//! let balance = client.get_balance().await?;
//! println!("{} coins on the {} tier", balance.balance, balance.tier);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientOptions, VeloraClient};
pub use error::ClientError;
pub use types::{
    AccountResponse, BalanceResponse, ChatResponse, CoinMutationResponse, CreateOrderResponse,
    GenerateRecipeResponse, ListTransactionsResponse, SubscriptionStatusResponse,
    TransactionResponse, VerifyPaymentResponse,
};
