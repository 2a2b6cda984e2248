//! Typed record shapes written to the output logs

use super::fields::{as_u64_lenient, cloned, first, first_string, first_u32, first_u64};
use serde::Serialize;
use serde_json::Value;

/// One verse, with page and juz resolved from their aliases
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerseRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub juz_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hizb_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rub_el_hizb_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_uthmani: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_imlaei_simple: Option<String>,
}

impl VerseRow {
    pub fn decode(v: &Value) -> Self {
        Self {
            id: first_u64(v, &["id"]),
            verse_key: first_string(v, &["verse_key"]),
            chapter_id: first_u32(v, &["chapter_id"]),
            verse_number: first_u32(v, &["verse_number"]),
            juz_number: first_u32(v, &["juz_number", "juz.number"]),
            hizb_number: first_u32(v, &["hizb_number"]),
            rub_el_hizb_number: first_u32(v, &["rub_el_hizb_number"]),
            page_number: first_u32(v, &["v1_page", "page_number"]),
            text_uthmani: first_string(v, &["text_uthmani"]),
            text_imlaei_simple: first_string(v, &["text_imlaei_simple"]),
        }
    }
}

/// One word of a verse, carrying its parent verse coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v1_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v2_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_v1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_v2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_uthmani: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_imlaei_simple: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_type_name: Option<String>,
}

impl WordRow {
    pub fn decode(verse: &VerseRow, w: &Value) -> Self {
        Self {
            id: first_u64(w, &["id"]),
            verse_id: verse.id,
            verse_key: verse.verse_key.clone(),
            chapter_id: verse.chapter_id,
            position: first_u32(w, &["position"]),
            line_number: first_u32(w, &["line_number"]),
            v1_page: first_u32(w, &["v1_page", "page_number"]),
            v2_page: first_u32(w, &["v2_page"]),
            code_v1: first_string(w, &["code_v1"]),
            code_v2: first_string(w, &["code_v2"]),
            text_uthmani: first_string(w, &["text_uthmani"]),
            text_imlaei_simple: first_string(w, &["text_imlaei_simple"]),
            char_type_name: first_string(w, &["char_type_name"]),
        }
    }
}

/// A translation or tafsir text for one verse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerseTextRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub footnotes: Option<Value>,
}

impl VerseTextRow {
    pub fn decode(resource_id: Option<u64>, item: &Value) -> Self {
        Self {
            resource_id: resource_id.or_else(|| first_u64(item, &["resource_id"])),
            verse_key: first_string(item, &["verse_key", "aya", "verse.key"]),
            text: first_string(item, &["text", "body"]),
            footnotes: cloned(item, "footnotes"),
        }
    }
}

/// A recitation catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecitationRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reciter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_size: Option<Value>,
}

impl RecitationRow {
    pub fn decode(r: &Value) -> Self {
        Self {
            id: first_u64(r, &["id"]),
            reciter_name: first_string(r, &["reciter_name", "name"]),
            style: first(r, &["style"]).cloned(),
            relative_path: first_string(r, &["relative_path"]),
            format: first_string(r, &["format"]),
            files_size: first(r, &["files_size"]).cloned(),
        }
    }
}

/// Verse-level audio timing within one chapter recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerseTimestampRow {
    pub audio_file_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl VerseTimestampRow {
    pub fn decode(audio_file_id: u64, item: &Value) -> Self {
        let from_ms = first_u64(item, &["timestamp_from", "from_ms"]);
        let to_ms = first_u64(item, &["timestamp_to", "to_ms"]);
        let duration_ms = first_u64(item, &["duration", "duration_ms"])
            .or_else(|| to_ms.zip(from_ms).and_then(|(to, from)| to.checked_sub(from)));
        Self {
            audio_file_id,
            verse_key: first_string(item, &["verse_key"]),
            from_ms,
            to_ms,
            duration_ms,
        }
    }
}

/// Word-level audio timing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordSegmentRow {
    pub audio_file_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_key: Option<String>,
    pub word_index: u64,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl WordSegmentRow {
    /// Decode every `[word_index, start, end]` tuple of a timestamp item.
    ///
    /// Longer tuples keep their first element and last two; malformed
    /// tuples are dropped.
    pub fn decode_all(audio_file_id: u64, item: &Value) -> Vec<Self> {
        let verse_key = first_string(item, &["verse_key"]);
        let Some(Value::Array(segments)) = first(item, &["segments"]) else {
            return Vec::new();
        };

        segments
            .iter()
            .filter_map(|segment| {
                let parts = segment.as_array()?;
                if parts.len() < 3 {
                    return None;
                }
                let n = parts.len();
                Some(Self {
                    audio_file_id,
                    verse_key: verse_key.clone(),
                    word_index: as_u64_lenient(&parts[0])?,
                    start_ms: as_u64_lenient(&parts[n - 2])?,
                    end_ms: as_u64_lenient(&parts[n - 1])?,
                })
            })
            .collect()
    }
}

/// A whole-text payload tagged with the unit that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u64>,
    pub scope: String,
    pub value: u32,
    pub payload: Value,
}
