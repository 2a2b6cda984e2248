//! Sweep unit types
//!
//! A sweep is an ordered list of unit groups. Each unit is one checkpointed
//! request (possibly paged); each group shares one ledger section.

use super::domains::{ScopeDimension, ScriptKind};
use crate::types::QueryPairs;
use std::fmt::Display;

/// Path and query of one remote request, before pagination parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRequest {
    /// Rendered path relative to the API base
    pub path: String,
    /// Ordered query pairs
    pub query: QueryPairs,
}

impl UnitRequest {
    /// Create a request without query parameters
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// How a unit's completion is recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Always fetched, never checkpointed (small catalogs)
    Untracked,
    /// Boolean at the unit key; skipped once true
    Flag,
    /// Numeric watermark at the unit key; skipped once it reaches the value
    Watermark(u32),
    /// Last committed page at the unit key, completion flag at `done_key`.
    ///
    /// Resumes at the page after the last committed one.
    Paged {
        /// Key of the completion flag in the same section
        done_key: String,
    },
}

/// A single ledger cell address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointCell {
    pub section: String,
    pub key: String,
}

impl CheckpointCell {
    /// Create a cell address
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }
}

/// Coordinates of a unit, handed to the normalizer with each item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitScope {
    pub resource_id: Option<u64>,
    pub script_kind: Option<ScriptKind>,
    pub dimension: Option<ScopeDimension>,
    pub value: Option<u32>,
    pub chapter: Option<u32>,
    pub reciter_id: Option<u64>,
}

impl UnitScope {
    /// A scope with no coordinates
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resource(mut self, id: u64) -> Self {
        self.resource_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_script(mut self, kind: ScriptKind) -> Self {
        self.script_kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: ScopeDimension, value: u32) -> Self {
        self.dimension = Some(dimension);
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_chapter(mut self, chapter: u32) -> Self {
        self.chapter = Some(chapter);
        self
    }

    #[must_use]
    pub fn with_reciter(mut self, id: u64) -> Self {
        self.reciter_id = Some(id);
        self
    }
}

/// Smallest progress granule of a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepUnit {
    /// Ledger key, unique within the group's section
    pub key: String,
    /// Remote request
    pub request: UnitRequest,
    /// Coordinates passed to the normalizer
    pub scope: UnitScope,
    /// Completion tracking
    pub progress: Progress,
}

impl SweepUnit {
    /// Create a unit
    pub fn new(
        key: impl Into<String>,
        request: UnitRequest,
        scope: UnitScope,
        progress: Progress,
    ) -> Self {
        Self {
            key: key.into(),
            request,
            scope,
            progress,
        }
    }
}

/// Units sharing a ledger section, with an optional range-done sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitGroup {
    /// Ledger section of every unit key
    pub section: String,
    /// Set once every unit completed; when already set the group is skipped
    pub done: Option<CheckpointCell>,
    /// Units in iteration order
    pub units: Vec<SweepUnit>,
}

impl UnitGroup {
    /// Create a group without a done sentinel
    pub fn new(section: impl Into<String>, units: Vec<SweepUnit>) -> Self {
        Self {
            section: section.into(),
            done: None,
            units,
        }
    }

    /// Set the done sentinel
    #[must_use]
    pub fn with_done(mut self, cell: CheckpointCell) -> Self {
        self.done = Some(cell);
        self
    }

    /// A single untracked request
    pub fn single(section: impl Into<String>, request: UnitRequest, scope: UnitScope) -> Self {
        let section = section.into();
        let unit = SweepUnit::new(section.clone(), request, scope, Progress::Untracked);
        Self::new(section, vec![unit])
    }
}
