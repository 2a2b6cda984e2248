//! Tests for record sinks

use super::*;
use crate::types::{Record, ResourceKind};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_ndjson_sink_lazily_creates_directory() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let sink = NdjsonSink::new(&out);

    assert!(!out.exists());
    drop(sink);
    assert!(!out.exists());
}

#[test]
fn test_ndjson_sink_appends_lines_per_kind() {
    let dir = tempdir().unwrap();
    let mut sink = NdjsonSink::new(dir.path().join("out"));

    sink.append(ResourceKind::Chapters, &json!({"id": 1}))
        .unwrap();
    sink.append(ResourceKind::Chapters, &json!({"id": 2}))
        .unwrap();
    sink.append(ResourceKind::Juzs, &json!({"juz_number": 1}))
        .unwrap();
    sink.flush().unwrap();

    let chapters =
        std::fs::read_to_string(log_path(sink.dir(), ResourceKind::Chapters)).unwrap();
    let lines: Vec<serde_json::Value> = chapters
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines, vec![json!({"id": 1}), json!({"id": 2})]);

    let juzs = std::fs::read_to_string(dir.path().join("out").join("juzs.ndjson")).unwrap();
    assert_eq!(juzs, "{\"juz_number\":1}\n");
    assert_eq!(sink.lines_written(), 3);
}

#[test]
fn test_ndjson_sink_appends_across_instances() {
    let dir = tempdir().unwrap();

    for id in 1..=2 {
        let mut sink = NdjsonSink::new(dir.path());
        sink.append(ResourceKind::Verses, &json!({"id": id}))
            .unwrap();
    }

    let verses = std::fs::read_to_string(dir.path().join("verses.ndjson")).unwrap();
    assert_eq!(verses.lines().count(), 2);
}

#[test]
fn test_embedded_newlines_stay_on_one_line() {
    let dir = tempdir().unwrap();
    let mut sink = NdjsonSink::new(dir.path());
    sink.append(ResourceKind::Tafsirs, &json!({"text": "line one\nline two"}))
        .unwrap();
    sink.flush().unwrap();

    let tafsirs = std::fs::read_to_string(dir.path().join("tafsirs.ndjson")).unwrap();
    assert_eq!(tafsirs.lines().count(), 1);
}

#[test]
fn test_unwritable_directory_is_sink_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();

    let mut sink = NdjsonSink::new(blocker.join("out"));
    let err = sink
        .append(ResourceKind::Chapters, &json!({}))
        .unwrap_err();
    assert!(matches!(err, crate::Error::Sink { .. }));
}

#[test]
fn test_in_memory_sink() {
    let mut sink = InMemorySink::new();
    sink.append_all(&[
        Record::new(ResourceKind::Words, json!({"id": 1})),
        Record::new(ResourceKind::Verses, json!({"id": 2})),
    ])
    .unwrap();
    sink.flush().unwrap();

    assert_eq!(sink.records().len(), 2);
    assert_eq!(sink.bodies(ResourceKind::Verses), vec![&json!({"id": 2})]);
    assert_eq!(sink.flushes(), 1);
}
