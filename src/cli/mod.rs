//! CLI module
//!
//! Command-line interface for harvesting and loading.
//!
//! # Commands
//!
//! - `export` - Harvest the content API into the output logs
//! - `import` - Bulk load the output logs into PostgreSQL
//! - `checkpoint` - Print the checkpoint ledger

mod commands;
mod runner;

pub use commands::{ApiArgs, Cli, Commands, HarvestArgs, ImportArgs};
pub use runner::Runner;
