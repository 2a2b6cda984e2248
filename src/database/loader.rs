//! Bulk loader
//!
//! For each spec: reset the table, then stream the log through the row
//! transform into a `COPY ... FROM STDIN`. Sending a row awaits the copy
//! sink's readiness, which bounds memory for large tables.

use super::encode::encode_row;
use super::specs::ImportSpec;
use crate::error::{Error, Result};
use crate::output::log_path;
use bytes::Bytes;
use futures::{Sink, SinkExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_postgres::{Client, GenericClient, NoTls};
use tracing::{error, info, warn};

/// Rows copied and skipped for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: &'static str,
    pub copied: u64,
    pub skipped: u64,
}

/// Result of a whole load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Loaded tables in load order
    pub tables: Vec<TableReport>,
    /// Tables whose log was absent
    pub missing: Vec<&'static str>,
}

impl LoadReport {
    /// Total rows copied
    pub fn copied(&self) -> u64 {
        self.tables.iter().map(|t| t.copied).sum()
    }

    /// Total rows skipped
    pub fn skipped(&self) -> u64 {
        self.tables.iter().map(|t| t.skipped).sum()
    }
}

/// Connect to PostgreSQL and drive the connection on a background task.
///
/// The connection is plain TCP; a `DATABASE_URL` with `sslmode=require`
/// is rejected by the driver.
pub async fn connect(database_url: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!(error = %e, "postgres: connection error");
        }
    });
    Ok(client)
}

/// Loads output logs into PostgreSQL tables
pub struct BulkLoader<'a> {
    client: &'a mut Client,
    out_dir: PathBuf,
    transactional: bool,
}

impl<'a> BulkLoader<'a> {
    /// Create a loader reading logs from `out_dir`; transactional by default
    pub fn new(client: &'a mut Client, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            out_dir: out_dir.into(),
            transactional: true,
        }
    }

    /// Run reset and copy of each table in one transaction, or as two steps
    #[must_use]
    pub fn transactional(mut self, transactional: bool) -> Self {
        self.transactional = transactional;
        self
    }

    /// Load every spec in order; the first failure stops the load
    pub async fn load_all(&mut self, specs: &[ImportSpec]) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for spec in specs {
            match self.load(spec).await {
                Ok(Some(table)) => report.tables.push(table),
                Ok(None) => report.missing.push(spec.table),
                Err(e) => {
                    error!(table = spec.table, error = %e, "import: failed, stopping");
                    return Err(e);
                }
            }
        }
        info!(
            tables = report.tables.len(),
            copied = report.copied(),
            skipped = report.skipped(),
            "import: done"
        );
        Ok(report)
    }

    /// Load one spec; `None` when its log does not exist
    pub async fn load(&mut self, spec: &ImportSpec) -> Result<Option<TableReport>> {
        let path = log_path(&self.out_dir, spec.kind);
        if !tokio::fs::try_exists(&path).await? {
            warn!(file = %path.display(), table = spec.table, "import: log not found, skipping");
            return Ok(None);
        }

        let start = Instant::now();
        info!(file = %path.display(), table = spec.table, "import: start");

        let report = if self.transactional {
            let tx = self.client.transaction().await?;
            let report = reset_and_copy(&tx, &path, spec).await?;
            tx.commit().await?;
            report
        } else {
            reset_and_copy(&*self.client, &path, spec).await?
        };

        info!(
            table = spec.table,
            copied = report.copied,
            skipped = report.skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "import: done"
        );
        Ok(Some(report))
    }
}

/// Truncate the table, then stream the log into a `COPY`
async fn reset_and_copy<C: GenericClient>(
    db: &C,
    path: &Path,
    spec: &ImportSpec,
) -> Result<TableReport> {
    db.batch_execute(&spec.truncate_statement())
        .await
        .map_err(|e| load_error(spec, "truncate", &e))?;

    // Same session as `db`, so an open transaction covers the copy too
    let sink = db
        .client()
        .copy_in::<_, Bytes>(spec.copy_statement().as_str())
        .await
        .map_err(|e| load_error(spec, "copy", &e))?;
    let mut sink = Box::pin(sink);
    let report = copy_log(path, spec, &mut sink).await?;
    sink.as_mut()
        .finish()
        .await
        .map_err(|e| load_error(spec, "copy", &e))?;
    Ok(report)
}

fn load_error(spec: &ImportSpec, step: &str, e: &tokio_postgres::Error) -> Error {
    Error::load(spec.table, format!("{step}: {e}"))
}

/// Stream a log through the spec's transform into `sink`.
///
/// Blank lines are ignored. Lines that are not JSON (torn writes and
/// invalid UTF-8 included), or that the transform rejects, are logged with
/// their line number and skipped. A sink error aborts the copy.
pub async fn copy_log<S>(path: &Path, spec: &ImportSpec, sink: &mut S) -> Result<TableReport>
where
    S: Sink<Bytes> + Unpin,
    S::Error: Into<Error>,
{
    let file = tokio::fs::File::open(path).await?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut report = TableReport {
        table: spec.table,
        copied: 0,
        skipped: 0,
    };
    let mut line_number = 0u64;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        line_number += 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let row = serde_json::from_slice::<Value>(&line)
            .map_err(Error::from)
            .and_then(|record| (spec.transform)(&record));
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(
                    table = spec.table,
                    line = line_number,
                    error = %e,
                    "import: skipping malformed row"
                );
                report.skipped += 1;
                continue;
            }
        };

        sink.send(Bytes::from(encode_row(&row)))
            .await
            .map_err(|e| {
                let e: Error = e.into();
                Error::load(spec.table, e.to_string())
            })?;
        report.copied += 1;
    }

    Ok(report)
}
