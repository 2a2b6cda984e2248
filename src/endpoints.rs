//! Remote path templates of the content API
//!
//! Placeholders are rendered through [`crate::template::render`].

/// Chapter catalog and per-chapter info
pub mod chapters {
    pub const LIST: &str = "/chapters";
    pub const INFO: &str = "/chapters/{chapter_number}";
}

/// Verse sweeps
pub mod verses {
    pub const BY_CHAPTER: &str = "/verses/by_chapter/{chapter_number}";

    /// Verse fields requested alongside the words
    pub const FIELDS: &str = "verse_key,words,chapter_id,verse_number,juz_number,hizb_number,\
                              rub_el_hizb_number,v1_page,text_uthmani,text_imlaei_simple";

    /// Word fields requested for every verse
    pub const WORD_FIELDS: &str = "id,position,line_number,v1_page,v2_page,code_v1,code_v2,\
                                   text_uthmani,text_imlaei_simple,char_type_name";
}

/// Juz catalog
pub mod juz {
    pub const LIST: &str = "/juzs";
}

/// Whole-Quran script and glyph endpoints
pub mod quran {
    pub const SCRIPT: &str = "/quran/verses/{script_kind}";
    pub const SINGLE_TRANSLATION: &str = "/quran/translations/{resource_id}";
    pub const SINGLE_TAFSIR: &str = "/quran/tafsirs/{resource_id}";
}

/// Resource catalogs
pub mod resources {
    pub const LANGUAGES: &str = "/resources/languages";
    pub const TRANSLATIONS: &str = "/resources/translations";
    pub const TAFSIRS: &str = "/resources/tafsirs";
}

/// Recitations and audio
pub mod audio {
    pub const RECITATIONS: &str = "/recitations";
    pub const CHAPTER_AUDIO_FILES: &str = "/chapter_recitations/{recitation_id}/audio_files";
    pub const CHAPTER_TIMESTAMPS: &str = "/chapter_recitations/{recitation_id}/{chapter_number}";
}

/// Per-resource translation sweeps
pub mod translations {
    pub const BY_SURAH: &str = "/translations/{resource_id}/surah/{chapter_number}";
}

/// Per-resource tafsir sweeps
pub mod tafsirs {
    pub const BY_SURAH: &str = "/tafsirs/{resource_id}/surah/{chapter_number}";
}
