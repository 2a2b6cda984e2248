//! Execution engine module
//!
//! Generic resumable sweep: iterate a unit domain, skip what the ledger
//! marks complete, fetch, emit, checkpoint.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SweepScheduler` - Runs sweeps against a content source, a checkpoint
//!   store and a record sink
//! - `Sweep` - Unit groups plus extraction and normalization
//! - `SweepStats` - Counters for a sweep or a whole run
//!
//! A checkpoint is only written after the records it covers were flushed to
//! the sink, so a crash re-fetches at most one page or unit.

mod types;

pub use types::{Extract, Sweep, SweepStats};

use crate::error::Result;
use crate::http::{ContentSource, Pacer};
use crate::output::RecordSink;
use crate::pagination::{NextPage, PageNumberPaginator};
use crate::state::CheckpointStore;
use crate::types::Record;
use crate::units::{Progress, SweepUnit, UnitGroup, UnitRequest};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

/// Sweep scheduler over one content source, store and sink
pub struct SweepScheduler<'a, S: ContentSource + ?Sized, K: RecordSink + ?Sized> {
    source: &'a S,
    store: &'a mut CheckpointStore,
    sink: &'a mut K,
    pacer: Pacer,
    paginator: PageNumberPaginator,
    stats: SweepStats,
}

impl<'a, S: ContentSource + ?Sized, K: RecordSink + ?Sized> SweepScheduler<'a, S, K> {
    /// Create a scheduler with default pacing and page size
    pub fn new(source: &'a S, store: &'a mut CheckpointStore, sink: &'a mut K) -> Self {
        Self {
            source,
            store,
            sink,
            pacer: Pacer::default(),
            paginator: PageNumberPaginator::default(),
            stats: SweepStats::default(),
        }
    }

    /// Set the inter-call pacer
    #[must_use]
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Set the paginator
    #[must_use]
    pub fn with_paginator(mut self, paginator: PageNumberPaginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// Run totals
    pub fn stats(&self) -> &SweepStats {
        &self.stats
    }

    /// The checkpoint store
    pub fn store(&self) -> &CheckpointStore {
        &*self.store
    }

    /// Issue one paced remote call
    pub async fn fetch(&mut self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.pacer.pace().await;
        self.stats.add_request();
        self.source.get_json(path, query).await
    }

    /// Fetch a request and return its extracted items (unpaged, untracked)
    pub async fn fetch_items(
        &mut self,
        request: &UnitRequest,
        extract: Extract,
    ) -> Result<Vec<Value>> {
        let body = self.fetch(&request.path, &request.query).await?;
        Ok(extract.items(&body))
    }

    /// Append records to the sink
    pub fn emit(&mut self, records: &[Record]) -> Result<()> {
        self.sink.append_all(records)?;
        self.stats.add_records(records.len());
        Ok(())
    }

    /// Flush the sink and compact the ledger
    pub async fn finish(&mut self) -> Result<()> {
        self.sink.flush()?;
        self.store.flush().await
    }

    /// Run one sweep to completion
    pub async fn run(&mut self, sweep: &Sweep) -> Result<SweepStats> {
        let start = Instant::now();
        let before = self.stats;
        info!(sweep = %sweep.name, units = sweep.unit_count(), "sweep: start");

        for group in &sweep.groups {
            self.run_group(sweep, group).await?;
        }

        let delta = self.stats.since(&before);
        info!(
            sweep = %sweep.name,
            completed = delta.units_completed,
            skipped = delta.units_skipped,
            records = delta.records_emitted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "sweep: done"
        );
        Ok(delta)
    }

    async fn run_group(&mut self, sweep: &Sweep, group: &UnitGroup) -> Result<()> {
        if let Some(done) = &group.done {
            if self.store.get_bool(&done.section, &done.key, false) {
                debug!(section = %group.section, key = %done.key, "sweep: group already done");
                self.stats.add_skipped(group.units.len());
                return Ok(());
            }
        }

        for unit in &group.units {
            self.run_unit(sweep, &group.section, unit).await?;
        }

        if let Some(done) = &group.done {
            self.store.set(&done.section, &done.key, true).await?;
        }
        Ok(())
    }

    async fn run_unit(&mut self, sweep: &Sweep, section: &str, unit: &SweepUnit) -> Result<()> {
        match &unit.progress {
            Progress::Untracked => {
                let items = self.fetch_items(&unit.request, sweep.extract).await?;
                self.emit_items(sweep, unit, items)?;
                self.stats.add_completed();
            }
            Progress::Flag => {
                if self.store.get_bool(section, &unit.key, false) {
                    self.stats.add_skipped(1);
                    return Ok(());
                }
                let items = self.fetch_items(&unit.request, sweep.extract).await?;
                self.emit_items(sweep, unit, items)?;
                self.sink.flush()?;
                self.store.set(section, &unit.key, true).await?;
                self.stats.add_completed();
            }
            Progress::Watermark(value) => {
                if self.store.get_u32(section, &unit.key, 0) >= *value {
                    self.stats.add_skipped(1);
                    return Ok(());
                }
                let items = self.fetch_items(&unit.request, sweep.extract).await?;
                self.emit_items(sweep, unit, items)?;
                self.sink.flush()?;
                self.store.set(section, &unit.key, *value).await?;
                self.stats.add_completed();
            }
            Progress::Paged { done_key } => {
                if self.store.get_bool(section, done_key, false) {
                    self.stats.add_skipped(1);
                    return Ok(());
                }
                self.run_pages(sweep, section, unit).await?;
                self.store.set(section, done_key, true).await?;
                self.stats.add_completed();
            }
        }
        Ok(())
    }

    async fn run_pages(&mut self, sweep: &Sweep, section: &str, unit: &SweepUnit) -> Result<()> {
        let mut page = self.store.get_u32(section, &unit.key, 0).saturating_add(1);

        loop {
            let query = self.paginator.params(&unit.request.query, page);
            let body = self.fetch(&unit.request.path, &query).await?;
            self.stats.add_page();

            let items = sweep.extract.items(&body);
            let count = items.len();
            debug!(section, key = %unit.key, page, items = count, "sweep: page fetched");
            if count == 0 {
                break;
            }

            self.emit_items(sweep, unit, items)?;
            self.sink.flush()?;
            self.store.set(section, &unit.key, page).await?;

            match self.paginator.next(&body, page, count) {
                NextPage::Continue(next) => page = next,
                NextPage::Done => break,
            }
        }
        Ok(())
    }

    fn emit_items(&mut self, sweep: &Sweep, unit: &SweepUnit, items: Vec<Value>) -> Result<()> {
        for item in items {
            let records = (sweep.normalize)(&unit.scope, item);
            self.emit(&records)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
