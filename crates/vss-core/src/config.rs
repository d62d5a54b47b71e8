//! Engine configuration.
//!
//! Configuration is resolved with CLI-flag > environment > file > default
//! precedence by the caller; this module owns the file format (YAML at
//! `~/.vss/config.yaml`) and the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use vss_embed::EmbedConfig;

use crate::errors::VssError;
use crate::index::{IndexAlgorithm, IndexParams};
use crate::metric::Metric;
use crate::query::DEFAULT_NPROBE;
use crate::types::DEFAULT_TOP_K;

// ============================================================================
// Constants
// ============================================================================

/// VSS home directory name (under the user's home directory).
pub const VSS_HOME_DIR: &str = ".vss";

/// Global configuration filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Default attribute embedded when a record carries no vector.
pub const DEFAULT_TEXT_ATTRIBUTE: &str = "description";

// ============================================================================
// IndexDefaults
// ============================================================================

/// Defaults applied when a create request omits metric or algorithm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefaults {
    /// Default distance metric.
    #[serde(default)]
    pub metric: Metric,

    /// Default search algorithm.
    #[serde(default)]
    pub algorithm: IndexAlgorithm,

    /// Default build parameters for partitioned indexes.
    #[serde(default)]
    pub params: IndexParams,
}

// ============================================================================
// SearchDefaults
// ============================================================================

/// Defaults applied when a query request omits k or nprobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDefaults {
    /// Default number of neighbors returned.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Default number of partitions probed on approximate indexes.
    #[serde(default = "default_nprobe")]
    pub nprobe: usize,
}

fn default_k() -> usize {
    DEFAULT_TOP_K
}

fn default_nprobe() -> usize {
    DEFAULT_NPROBE
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            nprobe: DEFAULT_NPROBE,
        }
    }
}

// ============================================================================
// VssConfig
// ============================================================================

/// Global VSS configuration, loaded from `~/.vss/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VssConfig {
    /// Index creation defaults.
    #[serde(default)]
    pub index: IndexDefaults,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchDefaults,

    /// Attribute embedded when a record carries no vector.
    #[serde(default = "default_text_attribute")]
    pub text_attribute: String,

    /// Embedding provider configuration.
    #[serde(default)]
    pub embedding: EmbedConfig,
}

fn default_text_attribute() -> String {
    DEFAULT_TEXT_ATTRIBUTE.to_string()
}

impl Default for VssConfig {
    fn default() -> Self {
        Self {
            index: IndexDefaults::default(),
            search: SearchDefaults::default(),
            text_attribute: default_text_attribute(),
            embedding: EmbedConfig::default(),
        }
    }
}

impl VssConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, VssError> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path).map_err(|e| {
            VssError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| VssError::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load the global configuration, falling back to defaults when the
    /// file does not exist.
    pub fn load_default() -> Result<Self, VssError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Path to the global configuration file (`~/.vss/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(VSS_HOME_DIR).join(CONFIG_FILENAME))
    }
}

// ============================================================================
// Tests
// ============================================================================
