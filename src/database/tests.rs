use super::*;
use crate::types::ResourceKind;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::TempDir;

fn spec(table: &str) -> &'static ImportSpec {
    spec_for_table(table).unwrap()
}

fn transform_row(table: &str, record: Value) -> Row {
    (spec(table).transform)(&record).unwrap()
}

fn s(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn write_log(dir: &TempDir, kind: ResourceKind, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join(kind.file_name());
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

fn parse_copied(chunks: &[Bytes]) -> Vec<Vec<String>> {
    let data: Vec<u8> = chunks.iter().flat_map(|b| b.iter().copied()).collect();
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(data.as_slice())
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

// ============================================================================
// Import Specs
// ============================================================================

#[test]
fn test_specs_in_load_order() {
    let tables: Vec<&str> = IMPORT_SPECS.iter().map(|s| s.table).collect();
    assert_eq!(
        tables,
        vec![
            "chapters",
            "chapter_infos",
            "verses",
            "words",
            "languages",
            "translation_resources",
            "tafsir_resources",
            "translations",
            "tafsirs",
            "recitations",
            "chapter_audio_files",
            "verse_timestamps",
            "word_segments",
        ]
    );
}

#[test]
fn test_transforms_match_column_count() {
    for spec in &IMPORT_SPECS {
        let row = (spec.transform)(&json!({})).unwrap();
        assert_eq!(row.len(), spec.columns.len(), "table {}", spec.table);
        assert!(row.iter().all(Option::is_none), "table {}", spec.table);
    }
}

#[test]
fn test_statements() {
    let spec = spec("tafsirs");
    assert_eq!(spec.truncate_statement(), "TRUNCATE tafsirs RESTART IDENTITY CASCADE");
    assert_eq!(
        spec.copy_statement(),
        "COPY tafsirs (resource_id,verse_key,text) FROM STDIN WITH (FORMAT csv)"
    );
    assert_eq!(spec.file_name(), "tafsirs.ndjson");
    assert!(spec_for_table("nope").is_none());
}

#[test]
fn test_non_object_is_transform_error() {
    for record in [json!([1, 2]), json!("text"), json!(null)] {
        let err = (spec("verses").transform)(&record).unwrap_err();
        assert!(matches!(err, crate::Error::Transform { .. }), "{err}");
    }
}

// ============================================================================
// Row Transforms
// ============================================================================

#[test]
fn test_chapter_row_splits_pages() {
    let row = transform_row(
        "chapters",
        json!({
            "id": 2,
            "revelation_place": "madinah",
            "revelation_order": 87,
            "bismillah_pre": true,
            "pages": [2, 49],
            "name_simple": "Al-Baqarah",
            "name_arabic": "البقرة",
            "verses_count": 286
        }),
    );
    assert_eq!(
        row,
        vec![
            s("2"),
            s("madinah"),
            s("87"),
            s("true"),
            s("2"),
            s("49"),
            s("Al-Baqarah"),
            s("البقرة"),
            s("286"),
        ]
    );
}

#[test]
fn test_chapter_row_short_pages() {
    let row = transform_row("chapters", json!({"id": 1, "pages": [1]}));
    assert_eq!(row[4], s("1"));
    assert_eq!(row[5], None);
}

#[test]
fn test_chapter_info_fallbacks() {
    let row = transform_row(
        "chapter_infos",
        json!({"id": 9, "text": "long text", "source": "src", "language": "en"}),
    );
    assert_eq!(row, vec![s("9"), s("long text"), s("src"), s("en")]);

    let row = transform_row(
        "chapter_infos",
        json!({"chapter_id": 3, "id": 9, "short_text": "", "text": "fallback"}),
    );
    assert_eq!(row[0], s("3"));
    assert_eq!(row[1], s("fallback"));
}

#[test]
fn test_verse_row_page_fallback() {
    let row = transform_row("verses", json!({"id": 1, "v1_page": 5}));
    assert_eq!(row[7], s("5"));
    let row = transform_row("verses", json!({"id": 1, "page_number": 4, "v1_page": 5}));
    assert_eq!(row[7], s("4"));
}

#[test]
fn test_language_row_fallbacks() {
    let row = transform_row("languages", json!({"iso": "id", "name": "Indonesian"}));
    assert_eq!(row, vec![s("id"), s("Indonesian"), None]);
    let row = transform_row("languages", json!({"code": "ar", "native_name": "العربية"}));
    assert_eq!(row, vec![s("ar"), None, s("العربية")]);
}

#[test]
fn test_resource_row_prefers_language_name() {
    let row = transform_row(
        "translation_resources",
        json!({"id": 33, "name": "Indonesian Ministry", "language_name": "indonesian", "language": "id", "author_name": "Kemenag", "slug": "id-kemenag"}),
    );
    assert_eq!(
        row,
        vec![s("33"), s("Indonesian Ministry"), s("indonesian"), s("Kemenag"), s("id-kemenag")]
    );
}

#[test]
fn test_translation_row_footnotes_as_json() {
    let row = transform_row(
        "translations",
        json!({"resource_id": 33, "aya": "1:1", "body": "Praise", "footnotes": {"1": "note"}}),
    );
    assert_eq!(row, vec![s("33"), s("1:1"), s("Praise"), s(r#"{"1":"note"}"#)]);

    let row = transform_row("translations", json!({"resource_id": 33, "verse_key": "1:2", "footnotes": null}));
    assert_eq!(row[3], None);
}

#[test]
fn test_recitation_row_style_object() {
    let row = transform_row(
        "recitations",
        json!({"id": 7, "name": "Mishari", "style": {"name": "Murattal"}, "files_size": 0}),
    );
    assert_eq!(row[1], s("Mishari"));
    assert_eq!(row[2], s(r#"{"name":"Murattal"}"#));
    assert_eq!(row[5], s("0"));
}

#[test]
fn test_audio_file_url_fallbacks() {
    let row = transform_row(
        "chapter_audio_files",
        json!({"id": 1, "chapter_id": 2, "recitation_id": 7, "audio_url": "https://a/1.mp3", "duration_seconds": 120}),
    );
    assert_eq!(row, vec![s("1"), s("2"), s("7"), s("https://a/1.mp3"), s("120")]);
}

// ============================================================================
// Copy
// ============================================================================

#[tokio::test]
async fn test_copy_log_skips_malformed_lines() {
    let dir = TempDir::new().unwrap();
    let path = write_log(
        &dir,
        ResourceKind::Tafsirs,
        &[
            r#"{"resource_id": 169, "verse_key": "1:1", "text": "a, \"quoted\"\nline"}"#,
            "",
            "{not json",
            r#"[1, 2]"#,
            r#"{"resource_id": 169, "verse_key": "1:2", "text": ""}"#,
        ],
    );

    let mut sink: Vec<Bytes> = Vec::new();
    let report = copy_log(&path, spec("tafsirs"), &mut sink).await.unwrap();

    assert_eq!(
        report,
        TableReport {
            table: "tafsirs",
            copied: 2,
            skipped: 2,
        }
    );
    assert_eq!(
        parse_copied(&sink),
        vec![
            vec!["169".to_string(), "1:1".to_string(), "a, \"quoted\"\nline".to_string()],
            vec!["169".to_string(), "1:2".to_string(), String::new()],
        ]
    );
}

#[tokio::test]
async fn test_copy_log_skips_torn_multibyte_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(ResourceKind::Tafsirs.file_name());
    let mut bytes = Vec::new();
    bytes.extend_from_slice(br#"{"resource_id": 169, "verse_key": "1:1", "text": "first"}"#);
    bytes.push(b'\n');
    // A crash mid-write leaves half of a two-byte Arabic letter
    bytes.extend_from_slice(b"{\"resource_id\": 169, \"text\": \"\xd8");
    bytes.push(b'\n');
    bytes.extend_from_slice(br#"{"resource_id": 169, "verse_key": "1:3", "text": "third"}"#);
    std::fs::write(&path, &bytes).unwrap();

    let mut sink: Vec<Bytes> = Vec::new();
    let report = copy_log(&path, spec("tafsirs"), &mut sink).await.unwrap();

    assert_eq!(report.copied, 2);
    assert_eq!(report.skipped, 1);
    let keys: Vec<String> = parse_copied(&sink).into_iter().map(|r| r[1].clone()).collect();
    assert_eq!(keys, vec!["1:1", "1:3"]);
}

#[tokio::test]
async fn test_copy_log_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, ResourceKind::Words, &[]);
    let mut sink: Vec<Bytes> = Vec::new();
    let report = copy_log(&path, spec("words"), &mut sink).await.unwrap();
    assert_eq!(report.copied, 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_copy_log_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut sink: Vec<Bytes> = Vec::new();
    let err = copy_log(&dir.path().join("absent.ndjson"), spec("words"), &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(err, crate::Error::Io(_)));
}

#[test]
fn test_load_report_totals() {
    let report = LoadReport {
        tables: vec![
            TableReport { table: "a", copied: 3, skipped: 1 },
            TableReport { table: "b", copied: 4, skipped: 0 },
        ],
        missing: vec!["c"],
    };
    assert_eq!(report.copied(), 7);
    assert_eq!(report.skipped(), 1);
}
