//! Per-resource normalizers
//!
//! A normalizer turns one extracted item (or a whole payload) into the
//! records appended to the output logs. Normalizers are pure apart from
//! logging and never fail: unusable input yields no records.

use super::fields::{first, first_u64};
use super::rows::{
    RecitationRow, ScopedPayload, VerseRow, VerseTextRow, VerseTimestampRow, WordRow,
    WordSegmentRow,
};
use crate::types::{Record, ResourceKind};
use crate::units::UnitScope;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

/// Item normalizer used by a sweep
pub type Normalizer = fn(&UnitScope, Value) -> Vec<Record>;

fn record<T: Serialize>(kind: ResourceKind, row: &T) -> Option<Record> {
    match Record::from_serialize(kind, row) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(kind = %kind, error = %e, "normalize: dropping unserializable row");
            None
        }
    }
}

fn passthrough(kind: ResourceKind, item: Value) -> Vec<Record> {
    vec![Record::new(kind, item)]
}

// ============================================================================
// Catalogs
// ============================================================================

pub fn language(_scope: &UnitScope, item: Value) -> Vec<Record> {
    passthrough(ResourceKind::Languages, item)
}

pub fn chapter(_scope: &UnitScope, item: Value) -> Vec<Record> {
    passthrough(ResourceKind::Chapters, item)
}

pub fn juz(_scope: &UnitScope, item: Value) -> Vec<Record> {
    passthrough(ResourceKind::Juzs, item)
}

/// Chapter info payload; a missing `chapter` envelope still records the id
pub fn chapter_info(scope: &UnitScope, payload: Value) -> Vec<Record> {
    let mut info = match payload.get("chapter") {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => json!({}),
    };
    if let (Value::Object(map), Some(chapter)) = (&mut info, scope.chapter) {
        map.entry("chapter_id").or_insert_with(|| json!(chapter));
    }
    passthrough(ResourceKind::ChapterInfos, info)
}

pub fn recitation(_scope: &UnitScope, item: Value) -> Vec<Record> {
    record(ResourceKind::Recitations, &RecitationRow::decode(&item))
        .into_iter()
        .collect()
}

/// Chapter audio file, tagged with its recitation when the API omits it
pub fn audio_file(scope: &UnitScope, mut item: Value) -> Vec<Record> {
    if let (Value::Object(map), Some(reciter)) = (&mut item, scope.reciter_id) {
        map.entry("recitation_id").or_insert_with(|| json!(reciter));
    }
    passthrough(ResourceKind::ChapterAudioFiles, item)
}

// ============================================================================
// Verses
// ============================================================================

/// A verse plus one record per word
pub fn verse(_scope: &UnitScope, item: Value) -> Vec<Record> {
    let verse = VerseRow::decode(&item);
    let words = match item.get("words") {
        Some(Value::Array(words)) => words
            .iter()
            .filter_map(|w| record(ResourceKind::Words, &WordRow::decode(&verse, w)))
            .collect(),
        _ => Vec::new(),
    };

    record(ResourceKind::Verses, &verse)
        .into_iter()
        .chain(words)
        .collect()
}

// ============================================================================
// Whole-text payloads
// ============================================================================

fn scoped(kind: ResourceKind, scope: &UnitScope, payload: Value) -> Vec<Record> {
    let (Some(dimension), Some(value)) = (scope.dimension, scope.value) else {
        warn!(kind = %kind, "normalize: whole-text unit without a scope");
        return Vec::new();
    };
    let row = ScopedPayload {
        kind: scope.script_kind.map(|k| k.as_str().to_string()),
        resource_id: scope.resource_id,
        scope: dimension.key().to_string(),
        value,
        payload,
    };
    record(kind, &row).into_iter().collect()
}

pub fn script(scope: &UnitScope, payload: Value) -> Vec<Record> {
    scoped(ResourceKind::QuranScripts, scope, payload)
}

pub fn single_translation(scope: &UnitScope, payload: Value) -> Vec<Record> {
    scoped(ResourceKind::QuranSingleTranslation, scope, payload)
}

pub fn single_tafsir(scope: &UnitScope, payload: Value) -> Vec<Record> {
    scoped(ResourceKind::QuranSingleTafsir, scope, payload)
}

// ============================================================================
// Per-resource texts
// ============================================================================

pub fn translation(scope: &UnitScope, item: Value) -> Vec<Record> {
    let row = VerseTextRow::decode(scope.resource_id, &item);
    record(ResourceKind::Translations, &row).into_iter().collect()
}

pub fn tafsir(scope: &UnitScope, item: Value) -> Vec<Record> {
    let row = VerseTextRow::decode(scope.resource_id, &item);
    record(ResourceKind::Tafsirs, &row).into_iter().collect()
}

// ============================================================================
// Audio segments
// ============================================================================

/// Chapter timestamps payload: verse timings plus word segments.
///
/// A chapter without an audio file id or without timestamps yields nothing.
pub fn chapter_timestamps(scope: &UnitScope, payload: Value) -> Vec<Record> {
    let audio_file = match payload.get("audio_file") {
        Some(file @ Value::Object(_)) => file,
        _ => &payload,
    };
    let audio_file_id = first_u64(audio_file, &["id", "audio_file.id"]);
    let timestamps = first(&payload, &["timestamps"])
        .or_else(|| first(audio_file, &["timestamps"]))
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty());

    let (Some(audio_file_id), Some(timestamps)) = (audio_file_id, timestamps) else {
        warn!(
            reciter_id = ?scope.reciter_id,
            chapter = ?scope.chapter,
            "audio-segments: no timestamps"
        );
        return Vec::new();
    };

    let mut records = Vec::new();
    for item in timestamps {
        records.extend(record(
            ResourceKind::VerseTimestamps,
            &VerseTimestampRow::decode(audio_file_id, item),
        ));
        records.extend(
            WordSegmentRow::decode_all(audio_file_id, item)
                .iter()
                .filter_map(|segment| record(ResourceKind::WordSegments, segment)),
        );
    }
    records
}
