//! Configuration types
//!
//! Settings are read once at start (CLI flags with environment fallbacks,
//! see [`crate::cli`]) and passed explicitly to each component.

use crate::auth::OAuthConfig;
use crate::error::{Error, Result};
use crate::filter::{FilterMode, LanguageFilter};
use crate::http::{HttpClientConfig, RetryPolicy};
use crate::units::all_chapters;
use std::path::PathBuf;
use std::time::Duration;

/// Default content language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default output directory
pub const DEFAULT_OUT_DIR: &str = "out";

// ============================================================================
// API Settings
// ============================================================================

/// Remote API and credential settings
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Content API base URL
    pub base_url: String,
    /// OAuth2 token endpoint
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Requested OAuth scope
    pub scope: String,
    /// Per-call request timeout
    pub timeout: Duration,
    /// Retry budget and backoff base
    pub retry: RetryPolicy,
}

impl ApiSettings {
    /// Fail on empty required fields
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("BASE_URL", &self.base_url),
            ("OAUTH_TOKEN_URL", &self.token_url),
            ("CLIENT_ID", &self.client_id),
            ("CLIENT_SECRET", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }
        Ok(())
    }

    /// Client configuration for the content API
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::new(&self.base_url)
            .timeout(self.timeout)
            .retry(self.retry)
    }

    /// Token endpoint configuration
    pub fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig::new(&self.token_url, &self.client_id, &self.client_secret)
            .with_scope(&self.scope)
    }
}

// ============================================================================
// Harvest Settings
// ============================================================================

/// What to harvest and how fast
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Content language sent with every request
    pub language: String,
    /// Resource language filter for translation and tafsir catalogs
    pub filter: LanguageFilter,
    /// Selected sections; empty selects all
    pub only: Vec<String>,
    /// Page size for paged sweeps
    pub page_size: u32,
    /// Courtesy delay between remote calls
    pub pacing: Duration,
    /// Checkpoint document; `None` disables resume
    pub checkpoint_path: Option<PathBuf>,
    /// Output log directory
    pub out_dir: PathBuf,
    /// Run the audio segments section
    pub audio_segments: bool,
    /// Reciter ids for audio segments; empty means every reciter
    pub segment_reciters: Vec<u64>,
    /// Chapters for audio segments
    pub segment_chapters: Vec<u32>,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            filter: LanguageFilter::new(FilterMode::Strict, DEFAULT_LANGUAGE, DEFAULT_LANGUAGE),
            only: Vec::new(),
            page_size: crate::pagination::DEFAULT_PER_PAGE,
            pacing: Duration::from_millis(200),
            checkpoint_path: None,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            audio_segments: false,
            segment_reciters: Vec::new(),
            segment_chapters: all_chapters().collect(),
        }
    }
}

impl HarvestSettings {
    /// Whether any of `names` is selected by the inclusion list
    pub fn wants(&self, names: &[&str]) -> bool {
        self.only.is_empty() || self.only.iter().any(|o| names.contains(&o.as_str()))
    }
}

/// Split a comma separated inclusion list
pub fn parse_only(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

// ============================================================================
// Load Settings
// ============================================================================

/// Bulk load target settings
#[derive(Debug, Clone)]
pub struct LoadSettings {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Directory holding the output logs
    pub out_dir: PathBuf,
    /// Run reset and copy of each table in one transaction
    pub transactional: bool,
}

impl LoadSettings {
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::missing_field("DATABASE_URL"));
        }
        Ok(())
    }
}
