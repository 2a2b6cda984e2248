//! Harvest orchestration
//!
//! Runs the export sections in a fixed order against one scheduler, so the
//! courtesy pacing and the run statistics span the whole harvest.
//!
//! # Sections
//!
//! 1. `resources` - languages plus the filtered translation/tafsir catalogs
//! 2. `chapters` - chapter list and per-chapter info
//! 3. `verses` (alias `words`) - verses by chapter with word data
//! 4. `juz` - juz catalog
//! 5. `quran` - whole-text scripts, single translations and tafsirs
//! 6. `translations` / 7. `tafsirs` - per-resource texts by surah
//! 8. `audio` - recitations and chapter audio files
//! 9. audio segments - verse timestamps and word segments (opt-in)

use crate::config::HarvestSettings;
use crate::decode::{first_u64, normalizers, Normalizer};
use crate::endpoints;
use crate::engine::{Extract, Sweep, SweepScheduler, SweepStats};
use crate::error::Result;
use crate::http::{ContentSource, Pacer};
use crate::output::RecordSink;
use crate::pagination::PageNumberPaginator;
use crate::state::CheckpointStore;
use crate::types::{Record, ResourceKind};
use crate::units::{
    by_surah_groups, chapter_info_groups, reciter_audio_groups, script_groups, segment_groups,
    single_resource_groups, verse_chapter_groups, TextFamily, UnitGroup, UnitRequest, UnitScope,
};
use serde_json::Value;
use tracing::info;

/// Catalogs fetched at most once per run
#[derive(Debug, Default)]
struct Catalogs {
    translations: Option<Vec<Value>>,
    tafsirs: Option<Vec<Value>>,
    recitations: Option<Vec<Value>>,
}

/// Drives every selected section of an export
pub struct Harvester<'a, S: ContentSource + ?Sized, K: RecordSink + ?Sized> {
    scheduler: SweepScheduler<'a, S, K>,
    settings: &'a HarvestSettings,
    catalogs: Catalogs,
}

impl<'a, S: ContentSource + ?Sized, K: RecordSink + ?Sized> Harvester<'a, S, K> {
    /// Create a harvester with pacing and page size taken from `settings`
    pub fn new(
        source: &'a S,
        store: &'a mut CheckpointStore,
        sink: &'a mut K,
        settings: &'a HarvestSettings,
    ) -> Self {
        let scheduler = SweepScheduler::new(source, store, sink)
            .with_pacer(Pacer::new(settings.pacing))
            .with_paginator(PageNumberPaginator::new(settings.page_size));
        Self {
            scheduler,
            settings,
            catalogs: Catalogs::default(),
        }
    }

    /// Run every selected section, then flush the sink and the ledger
    pub async fn run(mut self) -> Result<SweepStats> {
        info!(
            language = %self.settings.language,
            only = ?self.settings.only,
            filter = %self.settings.filter.mode,
            "export: start"
        );

        if self.settings.wants(&["resources"]) {
            self.resources().await?;
        }
        if self.settings.wants(&["chapters"]) {
            self.chapters().await?;
        }
        if self.settings.wants(&["verses", "words"]) {
            self.verses().await?;
        }
        if self.settings.wants(&["juz"]) {
            self.juz().await?;
        }
        if self.settings.wants(&["quran"]) {
            self.quran().await?;
        }
        if self.settings.wants(&["translations"]) {
            self.texts(TextFamily::Translation).await?;
        }
        if self.settings.wants(&["tafsirs"]) {
            self.texts(TextFamily::Tafsir).await?;
        }
        if self.settings.wants(&["audio"]) {
            self.audio().await?;
        }
        if self.settings.audio_segments && self.settings.wants(&["audio", "audio_segments"]) {
            self.audio_segments().await?;
        } else {
            info!("audio-segments: not enabled, skipping");
        }

        self.scheduler.finish().await?;
        let stats = *self.scheduler.stats();
        info!(
            requests = stats.requests,
            records = stats.records_emitted,
            skipped = stats.units_skipped,
            "export: finished"
        );
        Ok(stats)
    }

    // ========================================================================
    // Sections
    // ========================================================================

    async fn resources(&mut self) -> Result<()> {
        info!("resources: fetching catalogs");
        let request = self.catalog_request(endpoints::resources::LANGUAGES);
        let languages = self
            .scheduler
            .fetch_items(&request, Extract::Keys(&["languages"]))
            .await?;
        let records = normalize_all(languages, normalizers::language);
        self.scheduler.emit(&records)?;

        for (family, kind) in [
            (TextFamily::Translation, ResourceKind::TranslationResources),
            (TextFamily::Tafsir, ResourceKind::TafsirResources),
        ] {
            let filtered = self.filtered_catalog(family).await?;
            let records: Vec<Record> = filtered
                .into_iter()
                .map(|item| Record::new(kind, item))
                .collect();
            self.scheduler.emit(&records)?;
        }

        info!("resources: done");
        Ok(())
    }

    async fn chapters(&mut self) -> Result<()> {
        info!("chapters: list + info");
        let request = self.catalog_request(endpoints::chapters::LIST);
        let chapters = self
            .scheduler
            .fetch_items(&request, Extract::Keys(&["chapters"]))
            .await?;
        let ids: Vec<u32> = chapters
            .iter()
            .filter_map(|c| first_u64(c, &["id"]))
            .filter_map(|id| u32::try_from(id).ok())
            .collect();
        let records = normalize_all(chapters, normalizers::chapter);
        self.scheduler.emit(&records)?;

        let sweep = Sweep::new(
            "chapter-info",
            chapter_info_groups(&ids, &self.settings.language)?,
            Extract::Whole,
            normalizers::chapter_info,
        );
        self.scheduler.run(&sweep).await?;
        info!(count = ids.len(), "chapters: done");
        Ok(())
    }

    async fn verses(&mut self) -> Result<()> {
        let sweep = Sweep::new(
            "verses",
            verse_chapter_groups(&self.settings.language)?,
            Extract::Keys(&["verses"]),
            normalizers::verse,
        );
        self.scheduler.run(&sweep).await?;
        Ok(())
    }

    async fn juz(&mut self) -> Result<()> {
        let sweep = Sweep::new(
            "juz",
            vec![UnitGroup::single(
                "juz",
                UnitRequest::new(endpoints::juz::LIST),
                UnitScope::none(),
            )],
            Extract::Keys(&["juzs"]),
            normalizers::juz,
        );
        self.scheduler.run(&sweep).await?;
        Ok(())
    }

    async fn quran(&mut self) -> Result<()> {
        let scripts = Sweep::new(
            "quran-scripts",
            script_groups()?,
            Extract::Whole,
            normalizers::script,
        );
        self.scheduler.run(&scripts).await?;

        let settings = self.settings;
        let language = &settings.language;
        let translations = resource_ids(&self.filtered_catalog(TextFamily::Translation).await?);
        let tafsirs = resource_ids(&self.filtered_catalog(TextFamily::Tafsir).await?);
        info!(
            translations = translations.len(),
            tafsirs = tafsirs.len(),
            "quran: single resources to fetch"
        );

        let single_translations = Sweep::new(
            "quran-single-translation",
            single_resource_groups(TextFamily::Translation, &translations, language)?,
            Extract::Whole,
            normalizers::single_translation,
        );
        self.scheduler.run(&single_translations).await?;

        let single_tafsirs = Sweep::new(
            "quran-single-tafsir",
            single_resource_groups(TextFamily::Tafsir, &tafsirs, language)?,
            Extract::Whole,
            normalizers::single_tafsir,
        );
        self.scheduler.run(&single_tafsirs).await?;
        Ok(())
    }

    async fn texts(&mut self, family: TextFamily) -> Result<()> {
        let ids = resource_ids(&self.filtered_catalog(family).await?);
        info!(family = family.plural(), count = ids.len(), "resources to fetch");

        let (extract, normalize) = text_parts(family);
        let sweep = Sweep::new(
            family.plural(),
            by_surah_groups(family, &ids, &self.settings.language)?,
            extract,
            normalize,
        );
        self.scheduler.run(&sweep).await?;
        Ok(())
    }

    async fn audio(&mut self) -> Result<()> {
        info!("audio: recitations catalog");
        let recitations = self.recitations().await?;
        let ids = resource_ids(&recitations);
        let records = normalize_all(recitations, normalizers::recitation);
        self.scheduler.emit(&records)?;

        let sweep = Sweep::new(
            "audio",
            reciter_audio_groups(&ids, &self.settings.language)?,
            Extract::Keys(&["audio_files"]),
            normalizers::audio_file,
        );
        self.scheduler.run(&sweep).await?;
        Ok(())
    }

    async fn audio_segments(&mut self) -> Result<()> {
        let settings = self.settings;
        let wanted = &settings.segment_reciters;
        let reciters: Vec<u64> = resource_ids(&self.recitations().await?)
            .into_iter()
            .filter(|id| wanted.is_empty() || wanted.contains(id))
            .collect();
        info!(
            reciters = reciters.len(),
            chapters = settings.segment_chapters.len(),
            "audio-segments: start"
        );

        let sweep = Sweep::new(
            "audio-segments",
            segment_groups(&reciters, &settings.segment_chapters, &settings.language)?,
            Extract::Whole,
            normalizers::chapter_timestamps,
        );
        self.scheduler.run(&sweep).await?;
        Ok(())
    }

    // ========================================================================
    // Catalogs
    // ========================================================================

    fn catalog_request(&self, path: &str) -> UnitRequest {
        UnitRequest::new(path).with_query("language", &self.settings.language)
    }

    /// Translation or tafsir catalog after language filtering
    async fn filtered_catalog(&mut self, family: TextFamily) -> Result<Vec<Value>> {
        let cached = match family {
            TextFamily::Translation => self.catalogs.translations.clone(),
            TextFamily::Tafsir => self.catalogs.tafsirs.clone(),
        };
        let catalog = match cached {
            Some(catalog) => catalog,
            None => {
                let (path, extract) = match family {
                    TextFamily::Translation => (
                        endpoints::resources::TRANSLATIONS,
                        Extract::Keys(&["translations"]),
                    ),
                    TextFamily::Tafsir => {
                        (endpoints::resources::TAFSIRS, Extract::Keys(&["tafsirs"]))
                    }
                };
                let request = self.catalog_request(path);
                let catalog = self.scheduler.fetch_items(&request, extract).await?;
                match family {
                    TextFamily::Translation => self.catalogs.translations = Some(catalog.clone()),
                    TextFamily::Tafsir => self.catalogs.tafsirs = Some(catalog.clone()),
                }
                catalog
            }
        };

        let filtered = self.settings.filter.apply(&catalog);
        info!(
            family = family.plural(),
            mode = %self.settings.filter.mode,
            target_lang = %self.settings.filter.target,
            total = catalog.len(),
            filtered = filtered.len(),
            "resources: catalog filtered"
        );
        Ok(filtered)
    }

    async fn recitations(&mut self) -> Result<Vec<Value>> {
        if let Some(catalog) = &self.catalogs.recitations {
            return Ok(catalog.clone());
        }
        let request = self.catalog_request(endpoints::audio::RECITATIONS);
        let catalog = self
            .scheduler
            .fetch_items(&request, Extract::Keys(&["recitations"]))
            .await?;
        self.catalogs.recitations = Some(catalog.clone());
        Ok(catalog)
    }
}

fn text_parts(family: TextFamily) -> (Extract, Normalizer) {
    match family {
        TextFamily::Translation => (
            Extract::Keys(&["translations", "result"]),
            normalizers::translation,
        ),
        TextFamily::Tafsir => (Extract::Keys(&["tafsirs", "result"]), normalizers::tafsir),
    }
}

fn normalize_all(items: Vec<Value>, normalize: Normalizer) -> Vec<Record> {
    let scope = UnitScope::none();
    items
        .into_iter()
        .flat_map(|item| normalize(&scope, item))
        .collect()
}

/// Numeric ids of catalog entries, in catalog order
fn resource_ids(catalog: &[Value]) -> Vec<u64> {
    catalog
        .iter()
        .filter_map(|entry| first_u64(entry, &["id"]))
        .collect()
}
