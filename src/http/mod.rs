//! HTTP client module
//!
//! Authenticated content calls with retry, backoff and courtesy pacing.
//!
//! # Features
//!
//! - **Header injection**: bearer token, `x-auth-token` and `x-client-id`
//! - **Forced refresh**: one credential refresh per call on a 401
//! - **Backoff**: exponential with jitter for 5xx, 429 and transport errors
//! - **Pacing**: fixed delay between consecutive calls

mod backoff;
mod client;
mod pacing;

pub use backoff::{RetryPolicy, JITTER_CEILING_MS};
pub use client::{ContentSource, HttpClientConfig, RetryingClient};
pub use pacing::Pacer;
