//! CLI commands and argument parsing
//!
//! Every setting has an environment fallback so a `.env` file can drive a
//! whole run.

use crate::config::{parse_only, ApiSettings, HarvestSettings, LoadSettings};
use crate::error::{Error, Result};
use crate::filter::{FilterMode, LanguageFilter};
use crate::http::RetryPolicy;
use crate::units::{parse_chapter_list, parse_id_list};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Resumable Quran content harvester and PostgreSQL loader
#[derive(Parser, Debug)]
#[command(name = "quran-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest the content API into the output logs
    Export {
        #[command(flatten)]
        api: ApiArgs,

        #[command(flatten)]
        harvest: HarvestArgs,
    },

    /// Load the output logs into PostgreSQL
    Import(ImportArgs),

    /// Print the checkpoint ledger
    Checkpoint {
        /// Checkpoint document
        #[arg(long, env = "CHECKPOINT_PATH")]
        checkpoint_path: Option<PathBuf>,
    },
}

/// Content API and OAuth settings
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Content API base URL
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// OAuth2 token endpoint
    #[arg(long, env = "OAUTH_TOKEN_URL")]
    pub oauth_token_url: Option<String>,

    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Requested OAuth scope
    #[arg(long, env = "OAUTH_SCOPE", default_value = "content")]
    pub oauth_scope: String,

    /// Retries after the first attempt
    #[arg(long, env = "MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u32,

    /// Backoff base delay in milliseconds
    #[arg(long, env = "BACKOFF_BASE_MS", default_value_t = 500)]
    pub backoff_base_ms: u64,

    /// Per-call request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

impl ApiArgs {
    /// Resolve and validate the API settings
    pub fn settings(&self) -> Result<ApiSettings> {
        let settings = ApiSettings {
            base_url: self.base_url.clone().unwrap_or_default(),
            token_url: self.oauth_token_url.clone().unwrap_or_default(),
            client_id: self.client_id.clone().unwrap_or_default(),
            client_secret: self.client_secret.clone().unwrap_or_default(),
            scope: self.oauth_scope.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
            retry: RetryPolicy::new(self.max_retries, Duration::from_millis(self.backoff_base_ms)),
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Harvest selection and pacing
#[derive(Args, Debug, Clone)]
pub struct HarvestArgs {
    /// Content language
    #[arg(long, env = "LANGUAGE", default_value = "en")]
    pub language: String,

    /// Resource language for catalog filtering; defaults to the content language
    #[arg(long, env = "RESOURCE_LANG")]
    pub resource_lang: Option<String>,

    /// Resource filter mode: strict, fallback or all
    #[arg(long, env = "RESOURCE_FILTER_MODE", default_value = "strict")]
    pub resource_filter_mode: FilterMode,

    /// Fallback resource language
    #[arg(long, env = "RESOURCE_LANG_FALLBACK", default_value = "en")]
    pub resource_lang_fallback: String,

    /// Comma separated sections to run; empty runs all
    #[arg(long, env = "ONLY")]
    pub only: Option<String>,

    /// Page size for paged sweeps
    #[arg(long, env = "PER_PAGE", default_value_t = 50)]
    pub per_page: u32,

    /// Delay between remote calls in milliseconds
    #[arg(long, env = "SLEEP_MS", default_value_t = 200)]
    pub sleep_ms: u64,

    /// Checkpoint document; unset disables resume
    #[arg(long, env = "CHECKPOINT_PATH")]
    pub checkpoint_path: Option<PathBuf>,

    /// Output log directory
    #[arg(long, env = "OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,

    /// Harvest verse timestamps and word segments
    #[arg(long, env = "AUDIO_SEGMENTS")]
    pub audio_segments: bool,

    /// Comma separated reciter ids for audio segments
    #[arg(long, env = "AUDIO_SEGMENTS_RECITERS")]
    pub audio_segments_reciters: Option<String>,

    /// Chapter list for audio segments, e.g. `1-3,5`
    #[arg(long, env = "AUDIO_SEGMENTS_CHAPTERS")]
    pub audio_segments_chapters: Option<String>,
}

impl HarvestArgs {
    /// Resolve the harvest settings, parsing the list arguments
    pub fn settings(&self) -> Result<HarvestSettings> {
        if self.per_page == 0 {
            return Err(Error::invalid_value("PER_PAGE", "must be at least 1"));
        }

        let resource_lang = self
            .resource_lang
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.language);

        let segment_chapters =
            parse_chapter_list(self.audio_segments_chapters.as_deref().unwrap_or_default())?;
        let segment_reciters = parse_id_list(
            "AUDIO_SEGMENTS_RECITERS",
            self.audio_segments_reciters.as_deref().unwrap_or_default(),
        )?;

        Ok(HarvestSettings {
            language: self.language.clone(),
            filter: LanguageFilter::new(
                self.resource_filter_mode,
                resource_lang,
                &self.resource_lang_fallback,
            ),
            only: self.only.as_deref().map(parse_only).unwrap_or_default(),
            page_size: self.per_page,
            pacing: Duration::from_millis(self.sleep_ms),
            checkpoint_path: self.checkpoint_path.clone(),
            out_dir: self.out_dir.clone(),
            audio_segments: self.audio_segments,
            segment_reciters,
            segment_chapters,
        })
    }
}

/// Bulk load target
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Directory holding the output logs
    #[arg(long, env = "OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,

    /// Truncate and copy as separate steps instead of one transaction
    #[arg(long)]
    pub non_transactional: bool,
}

impl ImportArgs {
    pub fn settings(&self) -> Result<LoadSettings> {
        let settings = LoadSettings {
            database_url: self.database_url.clone().unwrap_or_default(),
            out_dir: self.out_dir.clone(),
            transactional: !self.non_transactional,
        };
        settings.validate()?;
        Ok(settings)
    }
}
