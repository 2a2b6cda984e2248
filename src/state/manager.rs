//! Checkpoint store implementation
//!
//! The ledger document is loaded once. Each mutation appends one line to a
//! sidecar journal (`<path>.wal`); the journal is folded back into the
//! document periodically and on flush with a write-then-rename.

use super::types::{JournalEntry, Ledger};
use crate::error::{Error, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Journal writes between automatic compactions
pub const DEFAULT_COMPACT_EVERY: u32 = 256;

/// Durable, namespaced progress ledger
#[derive(Debug)]
pub struct CheckpointStore {
    /// Document path; `None` disables persistence
    path: Option<PathBuf>,
    ledger: Ledger,
    journal: Option<File>,
    pending: u32,
    compact_every: u32,
}

impl CheckpointStore {
    /// Open a store at `path`, or a disabled store when `path` is `None`.
    ///
    /// A missing or corrupt document is treated as an empty ledger. The
    /// journal is replayed on top; torn lines are ignored.
    pub async fn open(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(Self::disabled());
        };

        let mut ledger = read_document(&path).await;
        let replayed = replay_journal(&journal_path(&path), &mut ledger).await;
        if replayed > 0 {
            info!(path = %path.display(), replayed, "checkpoint: journal replayed");
        }

        Ok(Self {
            path: Some(path),
            ledger,
            journal: None,
            pending: replayed,
            compact_every: DEFAULT_COMPACT_EVERY,
        })
    }

    /// A store that never persists: reads return defaults, writes are no-ops
    pub fn disabled() -> Self {
        Self {
            path: None,
            ledger: Ledger::new(),
            journal: None,
            pending: 0,
            compact_every: DEFAULT_COMPACT_EVERY,
        }
    }

    /// Set how many journal writes trigger a compaction
    #[must_use]
    pub fn with_compact_every(mut self, writes: u32) -> Self {
        self.compact_every = writes.max(1);
        self
    }

    /// Whether persistence is enabled
    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Document path, if persistence is enabled
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The in-memory ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Raw cell value
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.ledger.get(section, key)
    }

    /// Numeric cell, or `default` when absent or not a `u32`
    pub fn get_u32(&self, section: &str, key: &str, default: u32) -> u32 {
        self.get(section, key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(default)
    }

    /// Boolean cell, or `default` when absent or not a boolean
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get(section, key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Write one cell and journal it. No-op when persistence is disabled.
    pub async fn set(&mut self, section: &str, key: &str, value: impl Into<Value>) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let value = value.into();
        self.ledger.set(section, key, value.clone());

        let entry = JournalEntry {
            section: section.to_string(),
            key: key.to_string(),
            value,
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let journal = self.journal_handle(&path).await?;
        journal
            .write_all(&line)
            .await
            .map_err(|e| Error::checkpoint(format!("Failed to append journal: {e}")))?;
        journal
            .flush()
            .await
            .map_err(|e| Error::checkpoint(format!("Failed to flush journal: {e}")))?;

        debug!(section, key, "checkpoint: committed");

        self.pending += 1;
        if self.pending >= self.compact_every {
            self.compact().await?;
        }
        Ok(())
    }

    /// Fold pending journal entries into the document
    pub async fn flush(&mut self) -> Result<()> {
        if self.pending > 0 {
            self.compact().await?;
        }
        Ok(())
    }

    /// Rewrite the document from the ledger and truncate the journal
    pub async fn compact(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::checkpoint(format!("Failed to create directory: {e}")))?;
        }

        let contents = serde_json::to_string_pretty(&self.ledger)
            .map_err(|e| Error::checkpoint(format!("Failed to serialize ledger: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::checkpoint(format!("Failed to write ledger: {e}")))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| Error::checkpoint(format!("Failed to rename ledger: {e}")))?;

        match self.journal.as_mut() {
            Some(journal) => journal
                .set_len(0)
                .await
                .map_err(|e| Error::checkpoint(format!("Failed to truncate journal: {e}")))?,
            None => match tokio::fs::remove_file(journal_path(&path)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::checkpoint(format!("Failed to remove journal: {e}")));
                }
            },
        }

        debug!(path = %path.display(), cells = self.ledger.len(), "checkpoint: compacted");
        self.pending = 0;
        Ok(())
    }

    /// Pretty-printed ledger document
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.ledger)?)
    }

    async fn journal_handle(&mut self, path: &Path) -> Result<&mut File> {
        if self.journal.is_none() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::checkpoint(format!("Failed to create directory: {e}")))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(journal_path(path))
                .await
                .map_err(|e| Error::checkpoint(format!("Failed to open journal: {e}")))?;
            self.journal = Some(file);
        }

        self.journal
            .as_mut()
            .ok_or_else(|| Error::checkpoint("journal unavailable"))
    }
}

/// Sidecar journal path: `<path>.wal`
pub(crate) fn journal_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".wal");
    PathBuf::from(name)
}

async fn read_document(path: &Path) -> Ledger {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ledger::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "checkpoint: unreadable ledger, starting empty");
            return Ledger::new();
        }
    };

    if contents.trim().is_empty() {
        return Ledger::new();
    }

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "checkpoint: corrupt ledger, starting empty");
        Ledger::new()
    })
}

async fn replay_journal(path: &Path, ledger: &mut Ledger) -> u32 {
    let Ok(contents) = tokio::fs::read_to_string(path).await else {
        return 0;
    };

    let mut applied = 0;
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<JournalEntry>(line) {
            Ok(entry) => {
                ledger.apply(entry);
                applied += 1;
            }
            Err(e) => warn!(error = %e, "checkpoint: ignoring torn journal line"),
        }
    }
    applied
}
