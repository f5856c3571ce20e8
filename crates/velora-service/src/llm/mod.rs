//! LLM provider integration.
//!
//! The provider is an opaque external service: the core triggers a charge
//! before calling it and issues a compensating grant if the call fails. No
//! domain parsing happens here beyond extracting the generated text.

pub mod client;

pub use client::{GeminiClient, LlmError};
