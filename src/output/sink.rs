//! Record sinks
//!
//! One append-only newline-delimited JSON log per resource kind.

use crate::error::{Error, Result};
use crate::types::{Record, ResourceKind};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for normalized records
pub trait RecordSink: Send {
    /// Append one JSON value to the log of `kind`
    fn append(&mut self, kind: ResourceKind, record: &Value) -> Result<()>;

    /// Make every appended record durable
    fn flush(&mut self) -> Result<()>;

    /// Append a batch of records in order
    fn append_all(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.append(record.kind, &record.body)?;
        }
        Ok(())
    }
}

/// Path of a kind's log inside `dir`
pub fn log_path(dir: &Path, kind: ResourceKind) -> PathBuf {
    dir.join(kind.file_name())
}

// ============================================================================
// NDJSON Sink
// ============================================================================

/// File-backed sink with one lazily opened, buffered handle per kind
#[derive(Debug)]
pub struct NdjsonSink {
    dir: PathBuf,
    writers: HashMap<ResourceKind, BufWriter<File>>,
    lines_written: usize,
}

impl NdjsonSink {
    /// Create a sink writing under `dir`; nothing is touched until the first append
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writers: HashMap::new(),
            lines_written: 0,
        }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lines appended through this sink
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    fn writer(&mut self, kind: ResourceKind) -> Result<&mut BufWriter<File>> {
        if !self.writers.contains_key(&kind) {
            std::fs::create_dir_all(&self.dir).map_err(|e| {
                Error::sink(kind.as_str(), format!("Failed to create output directory: {e}"))
            })?;
            let path = log_path(&self.dir, kind);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| Error::sink(kind.as_str(), format!("Failed to open log: {e}")))?;
            debug!(path = %path.display(), "sink: opened log");
            self.writers.insert(kind, BufWriter::new(file));
        }

        self.writers
            .get_mut(&kind)
            .ok_or_else(|| Error::sink(kind.as_str(), "log handle unavailable"))
    }
}

impl RecordSink for NdjsonSink {
    fn append(&mut self, kind: ResourceKind, record: &Value) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        self.writer(kind)?
            .write_all(&line)
            .map_err(|e| Error::sink(kind.as_str(), format!("Failed to append: {e}")))?;
        self.lines_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for (kind, writer) in &mut self.writers {
            writer
                .flush()
                .map_err(|e| Error::sink(kind.as_str(), format!("Failed to flush: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for NdjsonSink {
    fn drop(&mut self) {
        let _ = RecordSink::flush(self);
    }
}

// ============================================================================
// In-Memory Sink
// ============================================================================

/// Sink that keeps records in memory (tests and dry runs)
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Vec<Record>,
    flushes: usize,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record appended so far
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Bodies of the records of one kind
    pub fn bodies(&self, kind: ResourceKind) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| &r.body)
            .collect()
    }

    /// Number of flushes observed
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl RecordSink for InMemorySink {
    fn append(&mut self, kind: ResourceKind, record: &Value) -> Result<()> {
        self.records.push(Record::new(kind, record.clone()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
