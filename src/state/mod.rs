//! Checkpoint module
//!
//! Tracks sweep progress so an interrupted harvest resumes where it
//! stopped.
//!
//! # Overview
//!
//! - `Ledger` - section -> key -> scalar progress document
//! - `CheckpointStore` - file-backed ledger with a write-ahead journal
//! - A store opened without a path is disabled and never persists

mod manager;
mod types;

pub use manager::{CheckpointStore, DEFAULT_COMPACT_EVERY};
pub use types::{Ledger, Section};
