// zip2store-config - Unified runtime configuration
//
// Supports configuration from multiple sources:
// 1. Config file path from ZIP2STORE_CONFIG env var
// 2. Config file contents from ZIP2STORE_CONFIG_CONTENT env var
// 3. Default config file locations (./config.toml, ./.zip2store.toml)
// 4. Built-in defaults (lowest priority)
//
// Every section carries serde defaults, so a partial file only overrides
// what it names.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod sources;
mod validation;

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub intake: IntakeConfig,
    pub limits: LimitsConfig,
    pub classify: ClassifyConfig,
    pub batch: BatchConfig,
    pub storage: StorageConfig,
    pub routing: RoutingConfig,
    pub invocation: InvocationConfig,
    pub logging: LoggingConfig,
}

/// Intake directory and archive selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Directory watched for deposited archives.
    pub dir: String,
    /// Archives younger than this are assumed still being written.
    pub min_age_secs: u64,
    /// Cap on archives considered per invocation; surplus waits.
    pub max_archives: usize,
}

impl IntakeConfig {
    pub fn min_age(&self) -> Duration {
        Duration::from_secs(self.min_age_secs)
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            dir: "./intake".to_string(),
            min_age_secs: 60,
            max_archives: 50,
        }
    }
}

/// Extraction resource bounds (zip-bomb protection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_entries: usize,
    pub max_entry_bytes: u64,
    pub max_total_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            max_entry_bytes: 100 * 1024 * 1024,
            max_total_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Optional content patterns for naming and filtering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_pattern: Option<String>,
}

/// Batch assembly and upload concurrency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Items per sealed batch.
    pub size: usize,
    /// Concurrent upload workers per batch.
    pub upload_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 100,
            upload_workers: 8,
        }
    }
}

/// Destination store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Leading segment of every destination key.
    pub prefix_base: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fs,
            prefix_base: "uploads".to_string(),
            fs: Some(FsConfig::default()),
            s3: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Fs,
    S3,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Fs => write!(f, "fs"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    pub path: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            path: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Terminal routing of processed archives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub archived_dir: String,
    pub failed_dir: String,
    /// Delete successful archives instead of moving them.
    pub delete_on_success: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            archived_dir: "./archived".to_string(),
            failed_dir: "./failed".to_string(),
            delete_on_success: false,
        }
    }
}

/// Invocation time budget and early-stop buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationConfig {
    pub time_budget_secs: u64,
    /// Remaining budget below this stops the invocation between archives.
    pub deadline_buffer_secs: u64,
}

impl InvocationConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }

    pub fn deadline_buffer(&self) -> Duration {
        Duration::from_secs(self.deadline_buffer_secs)
    }
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            time_budget_secs: 840,
            deadline_buffer_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Parse configuration from TOML content (useful for testing)
    pub fn from_toml(content: &str) -> Result<Self> {
        sources::parse_config(content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
