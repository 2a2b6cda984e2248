//! Common types used throughout quran-sync
//!
//! This module contains shared type definitions, type aliases,
//! and the resource kinds that tie the harvester to its output logs.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Ordered query parameters for a single request
pub type QueryPairs = Vec<(String, String)>;

// ============================================================================
// Resource Kinds
// ============================================================================

/// A category of fetched content, each backed by exactly one output log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Languages,
    Chapters,
    ChapterInfos,
    Verses,
    Words,
    Juzs,
    TranslationResources,
    TafsirResources,
    Recitations,
    QuranScripts,
    QuranSingleTranslation,
    QuranSingleTafsir,
    Translations,
    Tafsirs,
    ChapterAudioFiles,
    VerseTimestamps,
    WordSegments,
}

impl ResourceKind {
    /// Every kind, in output-directory listing order
    pub const ALL: [ResourceKind; 17] = [
        ResourceKind::Languages,
        ResourceKind::Chapters,
        ResourceKind::ChapterInfos,
        ResourceKind::Verses,
        ResourceKind::Words,
        ResourceKind::Juzs,
        ResourceKind::TranslationResources,
        ResourceKind::TafsirResources,
        ResourceKind::Recitations,
        ResourceKind::QuranScripts,
        ResourceKind::QuranSingleTranslation,
        ResourceKind::QuranSingleTafsir,
        ResourceKind::Translations,
        ResourceKind::Tafsirs,
        ResourceKind::ChapterAudioFiles,
        ResourceKind::VerseTimestamps,
        ResourceKind::WordSegments,
    ];

    /// Stable snake_case name
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Languages => "languages",
            ResourceKind::Chapters => "chapters",
            ResourceKind::ChapterInfos => "chapter_infos",
            ResourceKind::Verses => "verses",
            ResourceKind::Words => "words",
            ResourceKind::Juzs => "juzs",
            ResourceKind::TranslationResources => "translation_resources",
            ResourceKind::TafsirResources => "tafsir_resources",
            ResourceKind::Recitations => "recitations",
            ResourceKind::QuranScripts => "quran_scripts",
            ResourceKind::QuranSingleTranslation => "quran_single_translation",
            ResourceKind::QuranSingleTafsir => "quran_single_tafsir",
            ResourceKind::Translations => "translations",
            ResourceKind::Tafsirs => "tafsirs",
            ResourceKind::ChapterAudioFiles => "chapter_audio_files",
            ResourceKind::VerseTimestamps => "verse_timestamps",
            ResourceKind::WordSegments => "word_segments",
        }
    }

    /// File name of this kind's newline-delimited JSON log
    pub fn file_name(self) -> String {
        format!("{}.ndjson", self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// An opaque JSON object tagged with the log it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Destination log
    pub kind: ResourceKind,
    /// Payload, written verbatim as one JSON line
    pub body: JsonValue,
}

impl Record {
    /// Create a new record
    pub fn new(kind: ResourceKind, body: JsonValue) -> Self {
        Self { kind, body }
    }

    /// Serialize a typed value into a record
    pub fn from_serialize<T: Serialize>(kind: ResourceKind, value: &T) -> crate::Result<Self> {
        Ok(Self {
            kind,
            body: serde_json::to_value(value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_kind_file_names() {
        assert_eq!(ResourceKind::Verses.file_name(), "verses.ndjson");
        assert_eq!(
            ResourceKind::ChapterAudioFiles.file_name(),
            "chapter_audio_files.ndjson"
        );
        assert_eq!(
            ResourceKind::QuranSingleTafsir.file_name(),
            "quran_single_tafsir.ndjson"
        );
    }

    #[test]
    fn test_resource_kind_serde_matches_as_str() {
        for kind in ResourceKind::ALL {
            let encoded = serde_json::to_value(kind).unwrap();
            assert_eq!(encoded, json!(kind.as_str()));
        }
    }

    #[test]
    fn test_record_from_serialize() {
        #[derive(Serialize)]
        struct Row {
            id: u32,
        }
        let record = Record::from_serialize(ResourceKind::Chapters, &Row { id: 7 }).unwrap();
        assert_eq!(record.kind, ResourceKind::Chapters);
        assert_eq!(record.body, json!({"id": 7}));
    }

    #[test]
    fn test_record_new_keeps_body() {
        let body: JsonValue = json!({"verse_key": "1:1", "text": "بِسْمِ"});
        let record = Record::new(ResourceKind::Verses, body.clone());
        assert_eq!(record.body, body);
        assert_eq!(record.kind.file_name(), "verses.ndjson");
    }
}
