//! Ignore and illegal-name rules.

use syncdesk_core::config::IndexConfig;
use syncdesk_core::types::path::segments;

/// Decides which paths are never indexed and which names the server
/// cannot store.
#[derive(Debug, Clone)]
pub struct PathFilter {
    ignore_names: Vec<String>,
    ignore_prefixes: Vec<String>,
    ignore_suffixes: Vec<String>,
    illegal_characters: Vec<char>,
}

impl PathFilter {
    /// Build the filter from configuration.
    pub fn from_config(config: &IndexConfig) -> Self {
        Self {
            ignore_names: config.ignore_names.clone(),
            ignore_prefixes: config.ignore_prefixes.clone(),
            ignore_suffixes: config.ignore_suffixes.clone(),
            illegal_characters: config.illegal_characters.chars().collect(),
        }
    }

    /// Whether any segment of `path` matches an ignore rule.
    pub fn is_ignored(&self, path: &str) -> bool {
        segments(path).any(|segment| self.is_ignored_name(segment))
    }

    /// Whether a single name matches an ignore rule.
    pub fn is_ignored_name(&self, name: &str) -> bool {
        self.ignore_names.iter().any(|n| n == name)
            || self.ignore_prefixes.iter().any(|p| name.starts_with(p.as_str()))
            || self.ignore_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// Whether any segment of `path` contains a character the server
    /// rejects.
    pub fn is_illegal(&self, path: &str) -> bool {
        segments(path).any(|segment| {
            segment
                .chars()
                .any(|c| c.is_ascii_control() || self.illegal_characters.contains(&c))
        })
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::from_config(&IndexConfig::default())
    }
}
