//! Unit domain generators
//!
//! Each generator expands one sweep dimension (or a product of several)
//! into unit groups with the established ledger layout.

use super::types::{CheckpointCell, Progress, SweepUnit, UnitGroup, UnitRequest, UnitScope};
use crate::endpoints;
use crate::error::{Error, Result};
use crate::template::{render, PathVars};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Number of chapters
pub const CHAPTER_COUNT: u32 = 114;

/// Every chapter number
pub fn all_chapters() -> RangeInclusive<u32> {
    1..=CHAPTER_COUNT
}

// ============================================================================
// Scope Dimensions
// ============================================================================

/// An independently iterable axis the whole text can be sliced along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeDimension {
    ChapterNumber,
    PageNumber,
    JuzNumber,
    HizbNumber,
    RubElHizbNumber,
}

impl ScopeDimension {
    /// Every dimension, in sweep order
    pub const ALL: [ScopeDimension; 5] = [
        ScopeDimension::ChapterNumber,
        ScopeDimension::PageNumber,
        ScopeDimension::JuzNumber,
        ScopeDimension::HizbNumber,
        ScopeDimension::RubElHizbNumber,
    ];

    /// Query parameter and ledger key
    pub fn key(self) -> &'static str {
        match self {
            ScopeDimension::ChapterNumber => "chapter_number",
            ScopeDimension::PageNumber => "page_number",
            ScopeDimension::JuzNumber => "juz_number",
            ScopeDimension::HizbNumber => "hizb_number",
            ScopeDimension::RubElHizbNumber => "rub_el_hizb_number",
        }
    }

    /// Ordered value domain
    pub fn range(self) -> RangeInclusive<u32> {
        match self {
            ScopeDimension::ChapterNumber => all_chapters(),
            ScopeDimension::PageNumber => 1..=604,
            ScopeDimension::JuzNumber => 1..=30,
            ScopeDimension::HizbNumber => 1..=60,
            ScopeDimension::RubElHizbNumber => 1..=240,
        }
    }

    /// Ledger key of the range-done sentinel
    pub fn done_key(self) -> String {
        format!("{}_done", self.key())
    }
}

impl fmt::Display for ScopeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Script Kinds
// ============================================================================

/// Script or glyph encoding served by the whole-text endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    UthmaniSimple,
    Uthmani,
    UthmaniTajweed,
    Indopak,
    ImlaeiSimple,
    CodeV1,
    CodeV2,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 7] = [
        ScriptKind::UthmaniSimple,
        ScriptKind::Uthmani,
        ScriptKind::UthmaniTajweed,
        ScriptKind::Indopak,
        ScriptKind::ImlaeiSimple,
        ScriptKind::CodeV1,
        ScriptKind::CodeV2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptKind::UthmaniSimple => "uthmani_simple",
            ScriptKind::Uthmani => "uthmani",
            ScriptKind::UthmaniTajweed => "uthmani_tajweed",
            ScriptKind::Indopak => "indopak",
            ScriptKind::ImlaeiSimple => "imlaei_simple",
            ScriptKind::CodeV1 => "code_v1",
            ScriptKind::CodeV2 => "code_v2",
        }
    }

    /// Ledger section of this kind
    pub fn section(self) -> String {
        format!("quran_{}", self.as_str())
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource text family (translations or tafsirs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFamily {
    Translation,
    Tafsir,
}

impl TextFamily {
    /// Plural name used in ledger sections and envelopes
    pub fn plural(self) -> &'static str {
        match self {
            TextFamily::Translation => "translations",
            TextFamily::Tafsir => "tafsirs",
        }
    }

    fn single_template(self) -> &'static str {
        match self {
            TextFamily::Translation => endpoints::quran::SINGLE_TRANSLATION,
            TextFamily::Tafsir => endpoints::quran::SINGLE_TAFSIR,
        }
    }

    fn by_surah_template(self) -> &'static str {
        match self {
            TextFamily::Translation => endpoints::translations::BY_SURAH,
            TextFamily::Tafsir => endpoints::tafsirs::BY_SURAH,
        }
    }

    fn single_section(self, resource_id: u64) -> String {
        match self {
            TextFamily::Translation => format!("quran_single_translation_res_{resource_id}"),
            TextFamily::Tafsir => format!("quran_single_tafsir_res_{resource_id}"),
        }
    }
}

// ============================================================================
// List Parsing
// ============================================================================

/// Parse a chapter list such as `1-3,5,7-9`; empty input means every chapter.
///
/// Reversed ranges are accepted (`5-3` is `3,4,5`).
pub fn parse_chapter_list(input: &str) -> Result<Vec<u32>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(all_chapters().collect());
    }

    let mut chapters = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((a, b)) = token.split_once('-') {
            let a = parse_chapter(a, token)?;
            let b = parse_chapter(b, token)?;
            chapters.extend(a.min(b)..=a.max(b));
        } else {
            chapters.push(parse_chapter(token, token)?);
        }
    }
    Ok(chapters)
}

fn parse_chapter(raw: &str, token: &str) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        Error::invalid_value(
            "AUDIO_SEGMENTS_CHAPTERS",
            format!("'{token}' is not a chapter number or range"),
        )
    })
}

/// Parse a comma separated id list; empty input means no filter
pub fn parse_id_list(field: &str, input: &str) -> Result<Vec<u64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<u64>()
                .map_err(|_| Error::invalid_value(field, format!("'{t}' is not a numeric id")))
        })
        .collect()
}

// ============================================================================
// Group Generators
// ============================================================================

/// Verses by chapter, paged, with word data
pub fn verse_chapter_groups(language: &str) -> Result<Vec<UnitGroup>> {
    let section = "verses_by_chapter";
    let units = all_chapters()
        .map(|chapter| {
            let path = render(
                endpoints::verses::BY_CHAPTER,
                &PathVars::new().with("chapter_number", chapter),
            )?;
            let request = UnitRequest::new(path)
                .with_query("language", language)
                .with_query("words", true)
                .with_query("fields", endpoints::verses::FIELDS)
                .with_query("word_fields", endpoints::verses::WORD_FIELDS);
            Ok(SweepUnit::new(
                format!("ch_{chapter}_page"),
                request,
                UnitScope::none().with_chapter(chapter),
                Progress::Paged {
                    done_key: format!("ch_{chapter}_done"),
                },
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(vec![UnitGroup::new(section, units)])
}

/// One info call per chapter id, flag-checkpointed
pub fn chapter_info_groups(chapter_ids: &[u32], language: &str) -> Result<Vec<UnitGroup>> {
    let units = chapter_ids
        .iter()
        .map(|&chapter| {
            let path = render(
                endpoints::chapters::INFO,
                &PathVars::new().with("chapter_number", chapter),
            )?;
            Ok(SweepUnit::new(
                format!("info_{chapter}_done"),
                UnitRequest::new(path).with_query("language", language),
                UnitScope::none().with_chapter(chapter),
                Progress::Flag,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(vec![UnitGroup::new("chapters", units)])
}

/// Script kinds x scope dimensions, iterated scope-major
pub fn script_groups() -> Result<Vec<UnitGroup>> {
    let mut groups = Vec::new();
    for dimension in ScopeDimension::ALL {
        for kind in ScriptKind::ALL {
            let path = render(
                endpoints::quran::SCRIPT,
                &PathVars::new().with("script_kind", kind),
            )?;
            let section = kind.section();
            let units = dimension
                .range()
                .map(|value| {
                    SweepUnit::new(
                        dimension.key(),
                        UnitRequest::new(path.clone()).with_query(dimension.key(), value),
                        UnitScope::none()
                            .with_script(kind)
                            .with_dimension(dimension, value),
                        Progress::Watermark(value),
                    )
                })
                .collect();
            groups.push(
                UnitGroup::new(section.clone(), units)
                    .with_done(CheckpointCell::new(section, dimension.done_key())),
            );
        }
    }
    Ok(groups)
}

/// Whole-text single translation or tafsir: resources x scope dimensions
pub fn single_resource_groups(
    family: TextFamily,
    resource_ids: &[u64],
    language: &str,
) -> Result<Vec<UnitGroup>> {
    let mut groups = Vec::new();
    for &resource_id in resource_ids {
        let path = render(
            family.single_template(),
            &PathVars::new().with("resource_id", resource_id),
        )?;
        let section = family.single_section(resource_id);
        for dimension in ScopeDimension::ALL {
            let units = dimension
                .range()
                .map(|value| {
                    SweepUnit::new(
                        dimension.key(),
                        UnitRequest::new(path.clone())
                            .with_query(dimension.key(), value)
                            .with_query("language", language),
                        UnitScope::none()
                            .with_resource(resource_id)
                            .with_dimension(dimension, value),
                        Progress::Watermark(value),
                    )
                })
                .collect();
            groups.push(
                UnitGroup::new(section.clone(), units)
                    .with_done(CheckpointCell::new(section.clone(), dimension.done_key())),
            );
        }
    }
    Ok(groups)
}

/// Translations or tafsirs by surah: resources x chapters, paged
pub fn by_surah_groups(
    family: TextFamily,
    resource_ids: &[u64],
    language: &str,
) -> Result<Vec<UnitGroup>> {
    resource_ids
        .iter()
        .map(|&resource_id| {
            let section = format!("{}_res_{resource_id}", family.plural());
            let units = all_chapters()
                .map(|chapter| {
                    let path = render(
                        family.by_surah_template(),
                        &PathVars::new()
                            .with("resource_id", resource_id)
                            .with("chapter_number", chapter),
                    )?;
                    Ok(SweepUnit::new(
                        format!("ch_{chapter}_page"),
                        UnitRequest::new(path).with_query("language", language),
                        UnitScope::none()
                            .with_resource(resource_id)
                            .with_chapter(chapter),
                        Progress::Paged {
                            done_key: format!("ch_{chapter}_done"),
                        },
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(UnitGroup::new(section, units).with_done(CheckpointCell::new(
                family.plural(),
                format!("res_{resource_id}_done"),
            )))
        })
        .collect()
}

/// Chapter audio files per reciter, flag-checkpointed
pub fn reciter_audio_groups(reciter_ids: &[u64], language: &str) -> Result<Vec<UnitGroup>> {
    let units = reciter_ids
        .iter()
        .map(|&reciter_id| {
            let path = render(
                endpoints::audio::CHAPTER_AUDIO_FILES,
                &PathVars::new().with("recitation_id", reciter_id),
            )?;
            Ok(SweepUnit::new(
                format!("reciter_{reciter_id}_done"),
                UnitRequest::new(path).with_query("language", language),
                UnitScope::none().with_reciter(reciter_id),
                Progress::Flag,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(vec![UnitGroup::new("audio", units)])
}

/// Chapter timestamps and word segments: reciters x chapters
pub fn segment_groups(
    reciter_ids: &[u64],
    chapters: &[u32],
    language: &str,
) -> Result<Vec<UnitGroup>> {
    let mut units = Vec::with_capacity(reciter_ids.len() * chapters.len());
    for &reciter_id in reciter_ids {
        for &chapter in chapters {
            let path = render(
                endpoints::audio::CHAPTER_TIMESTAMPS,
                &PathVars::new()
                    .with("recitation_id", reciter_id)
                    .with("chapter_number", chapter),
            )?;
            units.push(SweepUnit::new(
                format!("rec_{reciter_id}_ch_{chapter}_done"),
                UnitRequest::new(path)
                    .with_query("language", language)
                    .with_query("segments", true),
                UnitScope::none()
                    .with_reciter(reciter_id)
                    .with_chapter(chapter),
                Progress::Flag,
            ));
        }
    }
    Ok(vec![UnitGroup::new("audio_segments", units)])
}
