//! Optional TOML configuration passed with `--config`.
//!
//! ```toml
//! merge = "keep-declared"
//!
//! [extract]
//! extract_triggers = false
//!
//! [report]
//! max_distance = 0
//! sort_key = "distance"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use qml_core::{SortKey, TransitionFilter};
use qml_ingest::ExtractOptions;
use qml_model::MergePolicy;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Page policy when several input files are merged.
    pub merge: MergePolicy,
    pub extract: ExtractOptions,
    pub report: ReportConfig,
}

/// Defaults for the `transitions` listing; command line flags win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub min_distance: Option<i64>,
    pub max_distance: Option<i64>,
    pub max_count: Option<usize>,
    pub sort_key: Option<SortKey>,
    pub descending: bool,
}

impl ReportConfig {
    pub fn transition_filter(&self) -> TransitionFilter {
        TransitionFilter {
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            max_count: self.max_count,
            sort: self.sort_key.is_some(),
            sort_key: self.sort_key.unwrap_or_default(),
            descending: self.descending,
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.extract.shown_variable_regex()?;
        Ok(config)
    }

    /// Load from `path` when given, else use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_map_onto_options_and_filter() {
        let config = CliConfig::from_toml_str(
            "[extract]\nextract_headers = false\n\n[report]\nmax_distance = 0\nsort_key = \"distance\"\n",
        )
        .unwrap();
        assert!(!config.extract.extract_headers);
        assert!(config.extract.extract_triggers);
        let filter = config.report.transition_filter();
        assert_eq!(filter.max_distance, Some(0));
        assert!(filter.sort);
        assert_eq!(filter.sort_key, SortKey::Distance);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config.extract, ExtractOptions::default());
        assert_eq!(config.merge, MergePolicy::Replace);
        assert_eq!(config.report.transition_filter(), TransitionFilter::default());
    }

    #[test]
    fn merge_policy_is_read_from_top_level() {
        let config = CliConfig::from_toml_str("merge = \"keep-declared\"\n").unwrap();
        assert_eq!(config.merge, MergePolicy::KeepDeclared);
        assert!(CliConfig::from_toml_str("merge = \"newest\"\n").is_err());
    }

    #[test]
    fn unknown_keys_and_bad_patterns_are_rejected() {
        assert!(CliConfig::from_toml_str("[output]\nx = 1\n").is_err());
        assert!(
            CliConfig::from_toml_str("[extract]\nshown_variable_pattern = \"(\"\n").is_err()
        );
    }
}
