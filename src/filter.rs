//! Resource language filtering
//!
//! Translation and tafsir catalogs are narrowed to the target language
//! before their per-resource sweeps run.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// How catalogs are filtered by language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Keep only resources matching the target language
    #[default]
    Strict,
    /// Strict, but use the fallback language when nothing matches
    Fallback,
    /// No filtering
    All,
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "fallback" => Ok(Self::Fallback),
            "all" => Ok(Self::All),
            other => Err(Error::invalid_value(
                "RESOURCE_FILTER_MODE",
                format!("unknown mode '{other}' (expected strict, fallback or all)"),
            )),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterMode::Strict => "strict",
            FilterMode::Fallback => "fallback",
            FilterMode::All => "all",
        })
    }
}

/// Target and fallback language plus mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFilter {
    pub mode: FilterMode,
    pub target: String,
    pub fallback: String,
}

impl LanguageFilter {
    /// Create a filter; languages are normalized to trimmed lower case
    pub fn new(mode: FilterMode, target: &str, fallback: &str) -> Self {
        Self {
            mode,
            target: normalize_code(target),
            fallback: normalize_code(fallback),
        }
    }

    /// Apply the filter to a catalog, preserving order
    pub fn apply(&self, resources: &[Value]) -> Vec<Value> {
        match self.mode {
            FilterMode::All => resources.to_vec(),
            FilterMode::Strict => matching(resources, &self.target),
            FilterMode::Fallback => {
                let primary = matching(resources, &self.target);
                if primary.is_empty() {
                    warn!(
                        target_lang = %self.target,
                        fallback = %self.fallback,
                        "no resource matched target, using fallback"
                    );
                    matching(resources, &self.fallback)
                } else {
                    primary
                }
            }
        }
    }
}

fn matching(resources: &[Value], target: &str) -> Vec<Value> {
    resources
        .iter()
        .filter(|r| resource_matches_language(r, target))
        .cloned()
        .collect()
}

fn normalize_code(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Whether a catalog entry is in `target`.
///
/// Exact match on `language`, `language_code` or `iso_code`; for a few
/// languages also a substring match on `language_name` (or `name`).
pub fn resource_matches_language(resource: &Value, target: &str) -> bool {
    let target = normalize_code(target);
    if target.is_empty() {
        return false;
    }

    let exact = ["language", "language_code", "iso_code"]
        .iter()
        .filter_map(|field| resource.get(*field).and_then(Value::as_str))
        .any(|code| normalize_code(code) == target);
    if exact {
        return true;
    }

    let name = ["language_name", "name"]
        .iter()
        .filter_map(|field| resource.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_lowercase();

    let hints: &[&str] = match target.as_str() {
        "id" => &["indones", "bahasa"],
        "en" => &["english"],
        "ar" => &["arab", "العرب"],
        _ => &[],
    };
    hints.iter().any(|hint| name.contains(hint))
}
