use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vellum_common::DEFAULT_LOG_FILTER;
use vellum_conversion::DEFAULT_FAKE_SELECTION_LABEL;
use vellum_model::MAIN_ROOT;

pub const DEFAULT_CONFIG_NAME: &str = "vellum.config.json";

/// Vellum configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Names of the document roots
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,

    /// Fake selection label for widgets without a label of their own
    #[serde(default = "default_fake_selection_label")]
    pub fake_selection_label: String,

    /// Tracing filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_roots() -> Vec<String> {
    vec![MAIN_ROOT.to_string()]
}

fn default_fake_selection_label() -> String {
    DEFAULT_FAKE_SELECTION_LABEL.to_string()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(EditorConfig::default())
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        Ok(config)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            fake_selection_label: default_fake_selection_label(),
            log_filter: default_log_filter(),
        }
    }
}
