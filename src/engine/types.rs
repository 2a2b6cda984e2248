//! Engine types
//!
//! Sweep definitions and run statistics.

use crate::decode::Normalizer;
use crate::units::UnitGroup;
use serde_json::Value;

/// How items are pulled out of a response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// First array found under these keys, in order. When none is present
    /// and the payload itself is an array, the payload is used.
    Keys(&'static [&'static str]),
    /// The whole payload is one item
    Whole,
}

impl Extract {
    /// Items of `body`
    pub fn items(&self, body: &Value) -> Vec<Value> {
        match self {
            Extract::Whole => vec![body.clone()],
            Extract::Keys(keys) => keys
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_array))
                .or_else(|| body.as_array())
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// One resumable sweep: unit groups plus how to turn responses into records
#[derive(Debug, Clone)]
pub struct Sweep {
    /// Name used in logs
    pub name: String,
    /// Groups in iteration order
    pub groups: Vec<UnitGroup>,
    /// Item extraction
    pub extract: Extract,
    /// Item normalization
    pub normalize: Normalizer,
}

impl Sweep {
    /// Create a sweep
    pub fn new(
        name: impl Into<String>,
        groups: Vec<UnitGroup>,
        extract: Extract,
        normalize: Normalizer,
    ) -> Self {
        Self {
            name: name.into(),
            groups,
            extract,
            normalize,
        }
    }

    /// Total number of units across groups
    pub fn unit_count(&self) -> usize {
        self.groups.iter().map(|g| g.units.len()).sum()
    }
}

/// Statistics from a sweep or a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Units skipped because the ledger marked them complete
    pub units_skipped: usize,
    /// Units fetched and committed
    pub units_completed: usize,
    /// Pages of paged units fetched
    pub pages_fetched: usize,
    /// Remote calls issued
    pub requests: usize,
    /// Records appended to the sink
    pub records_emitted: usize,
}

impl SweepStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_skipped(&mut self, units: usize) {
        self.units_skipped += units;
    }

    pub fn add_completed(&mut self) {
        self.units_completed += 1;
    }

    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    pub fn add_request(&mut self) {
        self.requests += 1;
    }

    pub fn add_records(&mut self, count: usize) {
        self.records_emitted += count;
    }

    /// Counts accumulated since `earlier`
    pub fn since(&self, earlier: &SweepStats) -> SweepStats {
        SweepStats {
            units_skipped: self.units_skipped - earlier.units_skipped,
            units_completed: self.units_completed - earlier.units_completed,
            pages_fetched: self.pages_fetched - earlier.pages_fetched,
            requests: self.requests - earlier.requests,
            records_emitted: self.records_emitted - earlier.records_emitted,
        }
    }
}
