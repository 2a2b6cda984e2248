//! Output module
//!
//! Append-only record logs, one newline-delimited JSON file per resource
//! kind. The bulk loader reads these files back.

mod sink;

pub use sink::{log_path, InMemorySink, NdjsonSink, RecordSink};

#[cfg(test)]
mod tests;
