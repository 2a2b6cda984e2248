//! Path template interpolation
//!
//! Handles `{variable}` placeholders in remote path templates such as
//! `/translations/{resource_id}/surah/{chapter_number}`.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// Regex for matching path placeholders: {variable}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Values substituted into a path template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars {
    vars: BTreeMap<&'static str, String>,
}

impl PathVars {
    /// Create an empty set of variables
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Display) -> Self {
        self.vars.insert(name, value.to_string());
        self
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Render a path template, failing on any placeholder without a value
pub fn render(template: &str, vars: &PathVars) -> Result<String> {
    let mut missing = Vec::new();
    let rendered = PLACEHOLDER_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Extract all placeholder names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}
