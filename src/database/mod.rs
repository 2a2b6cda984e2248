//! PostgreSQL bulk loading
//!
//! Turns the output logs into strict tabular rows and replaces each table
//! wholesale through `TRUNCATE` and a streaming CSV `COPY`.
//!
//! # Overview
//!
//! - `specs` - the 13 log to table mappings, in load order
//! - `encode` - CSV record encoding
//! - `loader` - truncate-and-copy driver with per-row fault isolation

mod encode;
mod loader;
mod specs;

pub use encode::{encode_row, scalar, Row};
pub use loader::{connect, copy_log, BulkLoader, LoadReport, TableReport};
pub use specs::{spec_for_table, ImportSpec, RowTransform, IMPORT_SPECS};

#[cfg(test)]
mod tests;
