use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::WorkspaceResult;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Rich-text fields scanned for citations, in numbering order
    #[serde(default = "default_reference_fields")]
    pub reference_fields: Vec<String>,

    /// Quiet period before a lookup request is sent
    #[serde(default = "default_lookup_debounce_ms")]
    pub lookup_debounce_ms: u64,

    /// Characters kept in plain-text previews
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,

    #[serde(default)]
    pub read_only: bool,
}

fn default_reference_fields() -> Vec<String> {
    ["abstract", "introduction", "methods", "results", "discussion"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_lookup_debounce_ms() -> u64 {
    300
}

fn default_preview_length() -> usize {
    280
}

impl WorkspaceConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> WorkspaceResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: WorkspaceConfig = serde_json::from_str(&content)?;
            debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(WorkspaceConfig::default())
        }
    }

    pub fn lookup_debounce(&self) -> Duration {
        Duration::from_millis(self.lookup_debounce_ms)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            reference_fields: default_reference_fields(),
            lookup_debounce_ms: default_lookup_debounce_ms(),
            preview_length: default_preview_length(),
            read_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "referenceFields": ["introduction", "discussion"],
            "lookupDebounceMs": 50,
            "readOnly": true
        }"#;

        let config: WorkspaceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.reference_fields, vec!["introduction", "discussion"]);
        assert_eq!(config.lookup_debounce(), Duration::from_millis(50));
        assert_eq!(config.preview_length, 280);
        assert!(config.read_only);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig::load(dir.path()).unwrap();
        assert_eq!(config, WorkspaceConfig::default());
        assert_eq!(config.reference_fields.len(), 5);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "previewLength": 10 }"#).unwrap();

        let config = WorkspaceConfig::load(dir.path()).unwrap();
        assert_eq!(config.preview_length, 10);
        assert_eq!(config.lookup_debounce_ms, 300);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ nope").unwrap();
        assert!(WorkspaceConfig::load(dir.path()).is_err());
    }
}
