//! Database integration tests with real PostgreSQL
//!
//! These tests require a live PostgreSQL database.
//! Set POSTGRES_TEST_URL environment variable to run.

use quran_sync::database::{connect, spec_for_table, BulkLoader, IMPORT_SPECS};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const SCHEMA: &str = "quran_sync_it";

/// Get test connection string from environment or skip
fn get_test_connection() -> Option<String> {
    std::env::var("POSTGRES_TEST_URL").ok()
}

fn write_log(dir: &Path, file: &str, lines: &[&str]) {
    let mut f = std::fs::File::create(dir.join(file)).unwrap();
    for line in lines {
        writeln!(f, "{line}").unwrap();
    }
}

/// Fresh schema with an all-text table per spec, used through `search_path`
async fn prepare(client: &tokio_postgres::Client) {
    let mut ddl = format!("DROP SCHEMA IF EXISTS {SCHEMA} CASCADE; CREATE SCHEMA {SCHEMA}; SET search_path TO {SCHEMA};");
    for spec in &IMPORT_SPECS {
        let columns: Vec<String> = spec.columns.iter().map(|c| format!("{c} TEXT")).collect();
        ddl.push_str(&format!("CREATE TABLE {} ({});", spec.table, columns.join(", ")));
    }
    client.batch_execute(&ddl).await.unwrap();
}

async fn count(client: &tokio_postgres::Client, table: &str) -> i64 {
    client
        .query_one(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .await
        .unwrap()
        .get(0)
}

#[tokio::test]
async fn test_load_replaces_table_contents() {
    let Some(url) = get_test_connection() else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };

    let mut client = connect(&url).await.unwrap();
    prepare(&client).await;
    client
        .batch_execute("INSERT INTO tafsirs VALUES ('1', 'stale', 'old')")
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "tafsirs.ndjson",
        &[
            r#"{"resource_id": 169, "verse_key": "1:1", "text": "a, \"b\"\nc"}"#,
            "not json",
            r#"{"resource_id": 169, "aya": "1:2", "body": "second"}"#,
        ],
    );

    let spec = spec_for_table("tafsirs").unwrap();
    let report = BulkLoader::new(&mut client, dir.path())
        .load(spec)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.copied, 2);
    assert_eq!(report.skipped, 1);

    let rows = client
        .query("SELECT verse_key, text FROM tafsirs ORDER BY verse_key", &[])
        .await
        .unwrap();
    let rows: Vec<(String, String)> = rows.iter().map(|r| (r.get(0), r.get(1))).collect();
    assert_eq!(
        rows,
        vec![
            ("1:1".to_string(), "a, \"b\"\nc".to_string()),
            ("1:2".to_string(), "second".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_load_all_skips_missing_logs() {
    let Some(url) = get_test_connection() else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };

    let mut client = connect(&url).await.unwrap();
    prepare(&client).await;

    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "chapters.ndjson",
        &[r#"{"id": 1, "pages": [1, 1], "name_simple": "Al-Fatihah", "verses_count": 7}"#],
    );

    let report = BulkLoader::new(&mut client, dir.path())
        .transactional(false)
        .load_all(&IMPORT_SPECS)
        .await
        .unwrap();

    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.missing.len(), IMPORT_SPECS.len() - 1);
    assert_eq!(count(&client, "chapters").await, 1);
}

#[tokio::test]
async fn test_failed_copy_rolls_back_truncate() {
    let Some(url) = get_test_connection() else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };

    let mut client = connect(&url).await.unwrap();
    prepare(&client).await;
    client
        .batch_execute(
            "INSERT INTO tafsirs (verse_key, text) VALUES ('1:1', 'stale'); \
             ALTER TABLE tafsirs DROP COLUMN resource_id;",
        )
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "tafsirs.ndjson",
        &[r#"{"resource_id": 169, "verse_key": "1:2", "text": "fresh"}"#],
    );

    let spec = spec_for_table("tafsirs").unwrap();
    let err = BulkLoader::new(&mut client, dir.path()).load(spec).await;
    assert!(err.is_err());

    assert_eq!(count(&client, "tafsirs").await, 1);
}

#[tokio::test]
async fn test_non_transactional_load_replaces_rows() {
    let Some(url) = get_test_connection() else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };

    let mut client = connect(&url).await.unwrap();
    prepare(&client).await;
    client
        .batch_execute("INSERT INTO tafsirs (verse_key, text) VALUES ('9:9', 'stale')")
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "tafsirs.ndjson",
        &[
            r#"{"resource_id": 169, "verse_key": "1:1", "text": "one"}"#,
            r#"{"resource_id": 169, "verse_key": "1:2", "text": "two"}"#,
        ],
    );

    let spec = spec_for_table("tafsirs").unwrap();
    let report = BulkLoader::new(&mut client, dir.path())
        .transactional(false)
        .load(spec)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.copied, 2);
    assert_eq!(count(&client, "tafsirs").await, 2);
}
