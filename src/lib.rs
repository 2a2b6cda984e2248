// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # quran-sync
//!
//! Resumable harvester for a paginated, OAuth-protected Quran content API,
//! with a streaming bulk loader into PostgreSQL.
//!
//! ## Features
//!
//! - **OAuth2 client credentials**: cached token, refreshed ahead of expiry
//!   and once more on a 401
//! - **Retry with backoff**: exponential with jitter for 5xx, 429 and
//!   transport failures
//! - **Resumable sweeps**: every finished unit or page is recorded in a
//!   checkpoint ledger, so a restart skips completed work
//! - **Append-only logs**: one newline-delimited JSON file per resource kind
//! - **Bulk load**: truncate and streaming CSV `COPY` per table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quran_sync::{
//!     config::HarvestSettings, harvest::Harvester, http::RetryingClient,
//!     output::NdjsonSink, state::CheckpointStore, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = HarvestSettings::default();
//!     let client = RetryingClient::new(http_config, oauth_config)?;
//!     let mut store = CheckpointStore::open(Some("checkpoint.json".into())).await?;
//!     let mut sink = NdjsonSink::new("out");
//!
//!     let stats = Harvester::new(&client, &mut store, &mut sink, &settings)
//!         .run()
//!         .await?;
//!     println!("{} records", stats.records_emitted);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Harvester                               │
//! │  resources → chapters → verses → juz → quran → translations ... │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │    Engine     │   State   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ OAuth2   │ Retry     │ Unit groups   │ Ledger    │ NDJSON logs │
//! │ Refresh  │ Backoff   │ Page number   │ Journal   │             │
//! │          │ Pacing    │ Normalizers   │ Compact   │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    │  Database (COPY csv)  │
//!                    └───────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Resource kinds and records
pub mod types;

/// Path template rendering
pub mod template;

/// Remote endpoint paths
pub mod endpoints;

/// OAuth2 client-credentials tokens
pub mod auth;

/// HTTP client with retry and pacing
pub mod http;

/// Page number pagination
pub mod pagination;

/// Work units and their domains
pub mod units;

/// Field decoding and normalizers
pub mod decode;

/// Resource language filtering
pub mod filter;

/// Checkpoint ledger
pub mod state;

/// Output logs
pub mod output;

/// Sweep scheduler
pub mod engine;

/// Export sections
pub mod harvest;

/// Settings
pub mod config;

/// PostgreSQL bulk loader
pub mod database;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
