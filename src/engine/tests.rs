//! Tests for engine module

use super::*;
use crate::decode::normalizers;
use crate::error::Error;
use crate::http::ContentSource;
use crate::output::InMemorySink;
use crate::types::{QueryPairs, ResourceKind};
use crate::units::{CheckpointCell, UnitScope};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

/// Serves canned pages per path and records every call
#[derive(Default)]
struct ScriptedSource {
    pages: HashMap<String, Vec<Value>>,
    failing: Option<String>,
    calls: Mutex<Vec<(String, QueryPairs)>>,
}

impl ScriptedSource {
    fn with(mut self, path: &str, pages: Vec<Value>) -> Self {
        self.pages.insert(path.to_string(), pages);
        self
    }

    fn failing_on(mut self, path: &str) -> Self {
        self.failing = Some(path.to_string());
        self
    }

    fn calls(&self) -> Vec<(String, QueryPairs)> {
        self.calls.lock().unwrap().clone()
    }

    fn requested_pages(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|(_, q)| q.iter().find(|(k, _)| k == "page").map(|(_, v)| v.clone()))
            .collect()
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> crate::Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_vec()));

        if self.failing.as_deref() == Some(path) {
            return Err(Error::http_status(500, "boom"));
        }

        let page = query
            .iter()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(1);
        Ok(self
            .pages
            .get(path)
            .and_then(|pages| pages.get(page - 1))
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

/// Sink whose appends always fail
struct BrokenSink;

impl RecordSink for BrokenSink {
    fn append(&mut self, kind: ResourceKind, _record: &Value) -> crate::Result<()> {
        Err(Error::sink(kind.as_str(), "disk full"))
    }

    fn flush(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

fn chapter_page(ids: &[u64], total_pages: u32) -> Value {
    let items: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
    json!({"chapters": items, "pagination": {"total_pages": total_pages}})
}

fn paged_sweep(path: &str) -> Sweep {
    let unit = SweepUnit::new(
        "ch_1_page",
        UnitRequest::new(path).with_query("language", "en"),
        UnitScope::none().with_chapter(1),
        Progress::Paged {
            done_key: "ch_1_done".to_string(),
        },
    );
    Sweep::new(
        "test",
        vec![UnitGroup::new("paged", vec![unit])],
        Extract::Keys(&["chapters"]),
        normalizers::chapter,
    )
}

async fn store(dir: &TempDir) -> CheckpointStore {
    CheckpointStore::open(Some(dir.path().join("checkpoint.json")))
        .await
        .unwrap()
}

// ============================================================================
// Extract Tests
// ============================================================================

#[test]
fn test_extract_first_present_key() {
    let body = json!({"result": [{"id": 2}], "translations": [{"id": 1}]});
    let items = Extract::Keys(&["translations", "result"]).items(&body);
    assert_eq!(items, vec![json!({"id": 1})]);

    let body = json!({"result": [{"id": 2}]});
    let items = Extract::Keys(&["translations", "result"]).items(&body);
    assert_eq!(items, vec![json!({"id": 2})]);
}

#[test]
fn test_extract_falls_back_to_array_payload() {
    let body = json!([{"juz_number": 1}, {"juz_number": 2}]);
    assert_eq!(Extract::Keys(&["juzs"]).items(&body).len(), 2);
    assert!(Extract::Keys(&["juzs"]).items(&json!({"other": 1})).is_empty());
}

#[test]
fn test_extract_whole() {
    let body = json!({"chapter": {"id": 1}});
    assert_eq!(Extract::Whole.items(&body), vec![body]);
}

#[test]
fn test_stats_since() {
    let mut stats = SweepStats::new();
    stats.add_request();
    let before = stats;
    stats.add_request();
    stats.add_page();
    stats.add_records(5);
    stats.add_skipped(2);
    stats.add_completed();

    let delta = stats.since(&before);
    assert_eq!(delta.requests, 1);
    assert_eq!(delta.pages_fetched, 1);
    assert_eq!(delta.records_emitted, 5);
    assert_eq!(delta.units_skipped, 2);
    assert_eq!(delta.units_completed, 1);
}

// ============================================================================
// Paged Units
// ============================================================================

#[tokio::test]
async fn test_paged_unit_fetches_every_page_once() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with(
        "/paged",
        vec![
            chapter_page(&[1, 2], 3),
            chapter_page(&[3, 4], 3),
            chapter_page(&[5], 3),
        ],
    );
    let mut store = store(&dir).await;
    let mut sink = InMemorySink::new();

    let stats = {
        let mut scheduler = SweepScheduler::new(&source, &mut store, &mut sink)
            .with_pacer(Pacer::disabled());
        scheduler.run(&paged_sweep("/paged")).await.unwrap()
    };

    assert_eq!(source.requested_pages(), vec!["1", "2", "3"]);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.records_emitted, 5);
    assert_eq!(stats.units_completed, 1);
    assert_eq!(store.get_u32("paged", "ch_1_page", 0), 3);
    assert!(store.get_bool("paged", "ch_1_done", false));
    assert_eq!(sink.bodies(ResourceKind::Chapters).len(), 5);
}

#[tokio::test]
async fn test_paged_unit_carries_unit_query_and_page_size() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with("/paged", vec![chapter_page(&[1], 1)]);
    let mut store = store(&dir).await;
    let mut sink = InMemorySink::new();

    SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .with_paginator(PageNumberPaginator::new(25))
        .run(&paged_sweep("/paged"))
        .await
        .unwrap();

    let calls = source.calls();
    assert_eq!(
        calls[0].1,
        vec![
            ("language".to_string(), "en".to_string()),
            ("page".to_string(), "1".to_string()),
            ("per_page".to_string(), "25".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_paged_unit_resumes_after_last_committed_page() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with(
        "/paged",
        vec![
            chapter_page(&[1], 3),
            chapter_page(&[2], 3),
            chapter_page(&[3], 3),
        ],
    );
    let mut store = store(&dir).await;
    store.set("paged", "ch_1_page", 2).await.unwrap();
    let mut sink = InMemorySink::new();

    SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&paged_sweep("/paged"))
        .await
        .unwrap();

    assert_eq!(source.requested_pages(), vec!["3"]);
    assert_eq!(sink.bodies(ResourceKind::Chapters), vec![&json!({"id": 3})]);
}

#[tokio::test]
async fn test_completed_unit_issues_no_calls() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with("/paged", vec![chapter_page(&[1], 1)]);
    let mut store = store(&dir).await;
    store.set("paged", "ch_1_page", 4).await.unwrap();
    store.set("paged", "ch_1_done", true).await.unwrap();
    let mut sink = InMemorySink::new();

    let stats = SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&paged_sweep("/paged"))
        .await
        .unwrap();

    assert!(source.calls().is_empty());
    assert_eq!(stats.units_skipped, 1);
    assert_eq!(store.get_u32("paged", "ch_1_page", 0), 4);
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_empty_page_finishes_unit() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with("/paged", vec![chapter_page(&[], 5)]);
    let mut store = store(&dir).await;
    let mut sink = InMemorySink::new();

    SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&paged_sweep("/paged"))
        .await
        .unwrap();

    assert_eq!(source.requested_pages(), vec!["1"]);
    assert_eq!(store.get("paged", "ch_1_page"), None);
    assert!(store.get_bool("paged", "ch_1_done", false));
}

#[tokio::test]
async fn test_missing_total_pages_stops_after_first_page() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with(
        "/paged",
        vec![json!({"chapters": [{"id": 1}]}), chapter_page(&[2], 2)],
    );
    let mut store = store(&dir).await;
    let mut sink = InMemorySink::new();

    SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&paged_sweep("/paged"))
        .await
        .unwrap();

    assert_eq!(source.requested_pages(), vec!["1"]);
}

#[tokio::test]
async fn test_failed_append_does_not_commit_page() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with("/paged", vec![chapter_page(&[1], 2)]);
    let mut store = store(&dir).await;
    let mut sink = BrokenSink;

    let err = SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&paged_sweep("/paged"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Sink { .. }));
    assert_eq!(store.get("paged", "ch_1_page"), None);
    assert!(!store.get_bool("paged", "ch_1_done", false));
}

#[tokio::test]
async fn test_fetch_error_propagates_and_keeps_progress() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().failing_on("/paged");
    let mut store = store(&dir).await;
    store.set("paged", "ch_1_page", 1).await.unwrap();
    let mut sink = InMemorySink::new();

    let err = SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&paged_sweep("/paged"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(store.get_u32("paged", "ch_1_page", 0), 1);
}

// ============================================================================
// Flag and Watermark Units
// ============================================================================

fn flag_sweep() -> Sweep {
    let units = (1..=3)
        .map(|n| {
            SweepUnit::new(
                format!("info_{n}_done"),
                UnitRequest::new(format!("/chapters/{n}")),
                UnitScope::none().with_chapter(n),
                Progress::Flag,
            )
        })
        .collect();
    Sweep::new(
        "chapter-info",
        vec![UnitGroup::new("chapters", units)],
        Extract::Whole,
        normalizers::chapter_info,
    )
}

#[tokio::test]
async fn test_flag_units_skip_completed() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default()
        .with("/chapters/1", vec![json!({"chapter": {"text": "a"}})])
        .with("/chapters/3", vec![json!({"chapter": {"text": "c"}})]);
    let mut store = store(&dir).await;
    store.set("chapters", "info_2_done", true).await.unwrap();
    let mut sink = InMemorySink::new();

    let stats = SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&flag_sweep())
        .await
        .unwrap();

    let paths: Vec<String> = source.calls().into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["/chapters/1", "/chapters/3"]);
    assert_eq!(stats.units_skipped, 1);
    assert_eq!(stats.units_completed, 2);
    assert!(store.get_bool("chapters", "info_1_done", false));
    assert!(store.get_bool("chapters", "info_3_done", false));
    assert_eq!(
        sink.bodies(ResourceKind::ChapterInfos),
        vec![
            &json!({"text": "a", "chapter_id": 1}),
            &json!({"text": "c", "chapter_id": 3}),
        ]
    );
    assert!(sink.flushes() >= 2);
}

fn watermark_sweep(done: bool) -> Sweep {
    let units = (1..=4)
        .map(|value| {
            SweepUnit::new(
                "juz_number",
                UnitRequest::new("/quran/verses/uthmani").with_query("juz_number", value),
                UnitScope::none()
                    .with_script(crate::units::ScriptKind::Uthmani)
                    .with_dimension(crate::units::ScopeDimension::JuzNumber, value),
                Progress::Watermark(value),
            )
        })
        .collect();
    let mut group = UnitGroup::new("quran_uthmani", units);
    if done {
        group = group.with_done(CheckpointCell::new("quran_uthmani", "juz_number_done"));
    }
    Sweep::new(
        "scripts",
        vec![group],
        Extract::Whole,
        normalizers::script,
    )
}

#[tokio::test]
async fn test_watermark_resumes_after_committed_value() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with("/quran/verses/uthmani", vec![json!({"verses": []})]);
    let mut store = store(&dir).await;
    store.set("quran_uthmani", "juz_number", 2).await.unwrap();
    let mut sink = InMemorySink::new();

    let stats = SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&watermark_sweep(true))
        .await
        .unwrap();

    let values: Vec<String> = source
        .calls()
        .iter()
        .map(|(_, q)| q[0].1.clone())
        .collect();
    assert_eq!(values, vec!["3", "4"]);
    assert_eq!(stats.units_skipped, 2);
    assert_eq!(store.get_u32("quran_uthmani", "juz_number", 0), 4);
    assert!(store.get_bool("quran_uthmani", "juz_number_done", false));

    let scripts = sink.bodies(ResourceKind::QuranScripts);
    assert_eq!(scripts.len(), 2);
    assert_eq!(scripts[0]["kind"], json!("uthmani"));
    assert_eq!(scripts[0]["scope"], json!("juz_number"));
    assert_eq!(scripts[0]["value"], json!(3));
}

#[tokio::test]
async fn test_done_group_is_skipped_entirely() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default();
    let mut store = store(&dir).await;
    store
        .set("quran_uthmani", "juz_number_done", true)
        .await
        .unwrap();
    let mut sink = InMemorySink::new();

    let stats = SweepScheduler::new(&source, &mut store, &mut sink)
        .with_pacer(Pacer::disabled())
        .run(&watermark_sweep(true))
        .await
        .unwrap();

    assert!(source.calls().is_empty());
    assert_eq!(stats.units_skipped, 4);
}

#[tokio::test]
async fn test_untracked_unit_always_fetches() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with(
        "/juzs",
        vec![json!({"juzs": [{"juz_number": 1}, {"juz_number": 2}]})],
    );
    let mut store = store(&dir).await;
    let mut sink = InMemorySink::new();
    let sweep = Sweep::new(
        "juz",
        vec![UnitGroup::single(
            "juz",
            UnitRequest::new("/juzs"),
            UnitScope::none(),
        )],
        Extract::Keys(&["juzs"]),
        normalizers::juz,
    );

    {
        let mut scheduler =
            SweepScheduler::new(&source, &mut store, &mut sink).with_pacer(Pacer::disabled());
        scheduler.run(&sweep).await.unwrap();
        scheduler.run(&sweep).await.unwrap();
        assert_eq!(scheduler.stats().requests, 2);
    }

    assert_eq!(sink.bodies(ResourceKind::Juzs).len(), 4);
    assert!(store.ledger().is_empty());
}

#[tokio::test]
async fn test_disabled_store_runs_everything() {
    let source = ScriptedSource::default().with("/paged", vec![chapter_page(&[1], 1)]);
    let mut store = CheckpointStore::disabled();
    let mut sink = InMemorySink::new();

    for _ in 0..2 {
        SweepScheduler::new(&source, &mut store, &mut sink)
            .with_pacer(Pacer::disabled())
            .run(&paged_sweep("/paged"))
            .await
            .unwrap();
    }

    assert_eq!(source.calls().len(), 2);
    assert_eq!(sink.bodies(ResourceKind::Chapters).len(), 2);
}

#[tokio::test]
async fn test_finish_flushes_ledger_document() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::default().with("/paged", vec![chapter_page(&[1], 1)]);
    let mut store = store(&dir).await;
    let mut sink = InMemorySink::new();

    {
        let mut scheduler =
            SweepScheduler::new(&source, &mut store, &mut sink).with_pacer(Pacer::disabled());
        scheduler.run(&paged_sweep("/paged")).await.unwrap();
        scheduler.finish().await.unwrap();
    }

    let document = std::fs::read_to_string(dir.path().join("checkpoint.json")).unwrap();
    let ledger: Value = serde_json::from_str(&document).unwrap();
    assert_eq!(ledger["paged"]["ch_1_done"], json!(true));
}
