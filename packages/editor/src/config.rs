use serde::{Deserialize, Serialize};

/// Per-editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Reject every document change that is not a normalization fix
    #[serde(default)]
    pub read_only: bool,

    /// Normalization budget: the number of dirty paths at the start of a run
    /// times this value. Exceeding it means the normalizers disagree.
    #[serde(default = "default_iterations_per_path")]
    pub max_normalize_iterations_per_path: usize,
}

fn default_iterations_per_path() -> usize {
    42
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            max_normalize_iterations_per_path: default_iterations_per_path(),
        }
    }
}

impl EditorConfig {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}
