//! Checkpoint ledger types
//!
//! The ledger is persisted as one JSON document shaped
//! `{section: {key: scalar}}`; journal entries record single-cell updates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys and scalar values of one section
pub type Section = BTreeMap<String, Value>;

/// Namespaced progress ledger: section -> key -> scalar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    sections: BTreeMap<String, Section>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up one cell
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section)?.get(key)
    }

    /// Write one cell, creating the section if needed
    pub fn set(&mut self, section: &str, key: &str, value: Value) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// All keys of a section
    pub fn section(&self, section: &str) -> Option<&Section> {
        self.sections.get(section)
    }

    /// Section names in sorted order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// Whether the ledger holds no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn apply(&mut self, entry: JournalEntry) {
        self.set(&entry.section, &entry.key, entry.value);
    }
}

/// One line of the write-ahead journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct JournalEntry {
    pub section: String,
    pub key: String,
    pub value: Value,
}
