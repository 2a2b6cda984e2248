//! Import specs: output log to table mappings
//!
//! Each spec names a log, a target table, the ordered column list of the
//! `COPY`, and a pure row transform. A transform never panics; a record it
//! cannot map (anything but a JSON object) is an `Error::Transform`.

use super::encode::{scalar, Row};
use crate::error::{Error, Result};
use crate::types::ResourceKind;
use serde_json::{Map, Value};

/// Record to row mapping
pub type RowTransform = fn(&Value) -> Result<Row>;

/// One log to table mapping
#[derive(Debug, Clone, Copy)]
pub struct ImportSpec {
    /// Source log
    pub kind: ResourceKind,
    /// Target table
    pub table: &'static str,
    /// Ordered column list
    pub columns: &'static [&'static str],
    /// Row transform; yields exactly `columns.len()` fields
    pub transform: RowTransform,
}

impl ImportSpec {
    /// `TRUNCATE` statement resetting the table
    pub fn truncate_statement(&self) -> String {
        format!("TRUNCATE {} RESTART IDENTITY CASCADE", self.table)
    }

    /// `COPY` statement over the column list
    pub fn copy_statement(&self) -> String {
        format!(
            "COPY {} ({}) FROM STDIN WITH (FORMAT csv)",
            self.table,
            self.columns.join(",")
        )
    }

    /// Source log file name
    pub fn file_name(&self) -> String {
        self.kind.file_name()
    }
}

/// Every spec in load order
pub static IMPORT_SPECS: [ImportSpec; 13] = [
    ImportSpec {
        kind: ResourceKind::Chapters,
        table: "chapters",
        columns: &[
            "id",
            "revelation_place",
            "revelation_order",
            "bismillah_pre",
            "page_start",
            "page_end",
            "name_simple",
            "name_arabic",
            "verses_count",
        ],
        transform: chapter_row,
    },
    ImportSpec {
        kind: ResourceKind::ChapterInfos,
        table: "chapter_infos",
        columns: &["chapter_id", "short_text", "source", "language"],
        transform: chapter_info_row,
    },
    ImportSpec {
        kind: ResourceKind::Verses,
        table: "verses",
        columns: &[
            "id",
            "verse_key",
            "chapter_id",
            "verse_number",
            "juz_number",
            "hizb_number",
            "rub_el_hizb_number",
            "page_number",
            "text_uthmani",
            "text_imlaei_simple",
        ],
        transform: verse_row,
    },
    ImportSpec {
        kind: ResourceKind::Words,
        table: "words",
        columns: &WORD_COLUMNS,
        transform: word_row,
    },
    ImportSpec {
        kind: ResourceKind::Languages,
        table: "languages",
        columns: &["iso_code", "name", "native_name"],
        transform: language_row,
    },
    ImportSpec {
        kind: ResourceKind::TranslationResources,
        table: "translation_resources",
        columns: &RESOURCE_COLUMNS,
        transform: resource_row,
    },
    ImportSpec {
        kind: ResourceKind::TafsirResources,
        table: "tafsir_resources",
        columns: &RESOURCE_COLUMNS,
        transform: resource_row,
    },
    ImportSpec {
        kind: ResourceKind::Translations,
        table: "translations",
        columns: &["resource_id", "verse_key", "text", "footnotes"],
        transform: translation_row,
    },
    ImportSpec {
        kind: ResourceKind::Tafsirs,
        table: "tafsirs",
        columns: &["resource_id", "verse_key", "text"],
        transform: tafsir_row,
    },
    ImportSpec {
        kind: ResourceKind::Recitations,
        table: "recitations",
        columns: &[
            "id",
            "reciter_name",
            "style",
            "relative_path",
            "format",
            "files_size",
        ],
        transform: recitation_row,
    },
    ImportSpec {
        kind: ResourceKind::ChapterAudioFiles,
        table: "chapter_audio_files",
        columns: &[
            "id",
            "chapter_id",
            "recitation_id",
            "file_url",
            "duration_seconds",
        ],
        transform: audio_file_row,
    },
    ImportSpec {
        kind: ResourceKind::VerseTimestamps,
        table: "verse_timestamps",
        columns: &["audio_file_id", "verse_key", "from_ms", "to_ms", "duration_ms"],
        transform: verse_timestamp_row,
    },
    ImportSpec {
        kind: ResourceKind::WordSegments,
        table: "word_segments",
        columns: &["audio_file_id", "verse_key", "word_index", "start_ms", "end_ms"],
        transform: word_segment_row,
    },
];

const WORD_COLUMNS: [&str; 13] = [
    "id",
    "verse_id",
    "verse_key",
    "chapter_id",
    "position",
    "line_number",
    "v1_page",
    "v2_page",
    "code_v1",
    "code_v2",
    "text_uthmani",
    "text_imlaei_simple",
    "char_type_name",
];

const RESOURCE_COLUMNS: [&str; 5] = ["id", "name", "language", "author_name", "slug"];

/// Look up a spec by table name
pub fn spec_for_table(table: &str) -> Option<&'static ImportSpec> {
    IMPORT_SPECS.iter().find(|spec| spec.table == table)
}

// ============================================================================
// Field Access
// ============================================================================

fn object(record: &Value) -> Result<&Map<String, Value>> {
    record.as_object().ok_or_else(|| {
        Error::transform(format!("expected a JSON object, got {}", kind_of(record)))
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Field rendered as text
fn field(o: &Map<String, Value>, key: &str) -> Option<String> {
    o.get(key).and_then(scalar)
}

/// First field that is present, non-null and not an empty string
fn first_field(o: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| o.get(*key))
        .find(|v| !v.is_null() && v.as_str() != Some(""))
        .and_then(scalar)
}

fn fields(o: &Map<String, Value>, keys: &[&str]) -> Row {
    keys.iter().map(|key| field(o, key)).collect()
}

// ============================================================================
// Row Transforms
// ============================================================================

fn chapter_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    let pages = o.get("pages").and_then(Value::as_array);
    let page = |index: usize| pages.and_then(|p| p.get(index)).and_then(scalar);
    Ok(vec![
        field(o, "id"),
        field(o, "revelation_place"),
        field(o, "revelation_order"),
        field(o, "bismillah_pre"),
        page(0),
        page(1),
        field(o, "name_simple"),
        field(o, "name_arabic"),
        field(o, "verses_count"),
    ])
}

fn chapter_info_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    Ok(vec![
        first_field(o, &["chapter_id", "id"]),
        first_field(o, &["short_text", "text"]),
        field(o, "source"),
        field(o, "language"),
    ])
}

fn verse_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    Ok(vec![
        field(o, "id"),
        field(o, "verse_key"),
        field(o, "chapter_id"),
        field(o, "verse_number"),
        field(o, "juz_number"),
        field(o, "hizb_number"),
        field(o, "rub_el_hizb_number"),
        first_field(o, &["page_number", "v1_page"]),
        field(o, "text_uthmani"),
        field(o, "text_imlaei_simple"),
    ])
}

fn word_row(record: &Value) -> Result<Row> {
    Ok(fields(object(record)?, &WORD_COLUMNS))
}

fn language_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    Ok(vec![
        first_field(o, &["iso_code", "iso", "code"]),
        field(o, "name"),
        first_field(o, &["native_name"]),
    ])
}

fn resource_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    Ok(vec![
        field(o, "id"),
        field(o, "name"),
        first_field(o, &["language_name", "language"]),
        field(o, "author_name"),
        field(o, "slug"),
    ])
}

fn translation_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    let footnotes = o
        .get("footnotes")
        .filter(|v| !v.is_null())
        .map(Value::to_string);
    Ok(vec![
        field(o, "resource_id"),
        first_field(o, &["verse_key", "aya"]),
        first_field(o, &["text", "body"]),
        footnotes,
    ])
}

fn tafsir_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    Ok(vec![
        field(o, "resource_id"),
        first_field(o, &["verse_key", "aya"]),
        first_field(o, &["text", "body"]),
    ])
}

fn recitation_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    Ok(vec![
        field(o, "id"),
        first_field(o, &["reciter_name", "name"]),
        field(o, "style"),
        field(o, "relative_path"),
        field(o, "format"),
        first_field(o, &["files_size"]),
    ])
}

fn audio_file_row(record: &Value) -> Result<Row> {
    let o = object(record)?;
    Ok(vec![
        field(o, "id"),
        field(o, "chapter_id"),
        field(o, "recitation_id"),
        first_field(o, &["url", "audio_url", "file_url"]),
        first_field(o, &["duration", "duration_seconds"]),
    ])
}

fn verse_timestamp_row(record: &Value) -> Result<Row> {
    Ok(fields(
        object(record)?,
        &["audio_file_id", "verse_key", "from_ms", "to_ms", "duration_ms"],
    ))
}

fn word_segment_row(record: &Value) -> Result<Row> {
    Ok(fields(
        object(record)?,
        &["audio_file_id", "verse_key", "word_index", "start_ms", "end_ms"],
    ))
}
