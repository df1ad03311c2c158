//! Configuration management
//!
//! This module handles loading, validation, and management of the engine
//! configuration. Configuration is stored in TOML format at
//! ~/.adaptive-rag/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory
//! - **llm**: Inference gateway provider and its settings
//! - **pipeline**: Retrieval depth, query expansion width, progress buffer
//! - **corpus**: Optional path to a corpus file (built-in corpus otherwise)
//!
//! API keys are never stored here; see [`crate::secrets`].
//!
//! # Examples
//!
//! ```no_run
//! use adaptive_rag::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Model: {}", config.llm.gemini.model);
//! println!("Top documents: {}", config.pipeline.max_documents);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Inference gateway configuration
    pub llm: LLMConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Corpus source
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Inference gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Gateway provider (gemini)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Gemini provider settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    // Note: API key stored in env or OS keychain, not in config
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum documents handed from retrieval to grading
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Number of paraphrases requested from the query expander
    #[serde(default = "default_query_variants")]
    pub query_variants: usize,

    /// Capacity of the bounded progress channel
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_documents: default_max_documents(),
            query_variants: default_query_variants(),
            progress_buffer: default_progress_buffer(),
        }
    }
}

/// Corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorpusConfig {
    /// Path to a JSON or TOML corpus file (supports ~ expansion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.adaptive-rag")
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_documents() -> usize {
    3
}

fn default_query_variants() -> usize {
    3
}

fn default_progress_buffer() -> usize {
    100
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.adaptive-rag/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Wrote default configuration to {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path (~/.adaptive-rag/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".adaptive-rag").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
                data_dir: default_data_dir(),
            },
            llm: LLMConfig::default(),
            pipeline: PipelineConfig::default(),
            corpus: CorpusConfig::default(),
        }
    }

    /// Validate and process configuration
    ///
    /// Validates enumerated and numeric fields, then expands ~ in paths.
    /// The data directory is created if missing.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.llm.provider.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid provider '{}'. Must be one of: {}",
                self.llm.provider,
                valid_providers.join(", ")
            )));
        }

        if self.llm.gemini.timeout_secs == 0 {
            return Err(EngineError::Config(
                "llm.gemini.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_documents == 0 {
            return Err(EngineError::Config(
                "pipeline.max_documents must be at least 1".to_string(),
            ));
        }

        if !(1..=10).contains(&self.pipeline.query_variants) {
            return Err(EngineError::Config(
                "pipeline.query_variants must be between 1 and 10".to_string(),
            ));
        }

        if self.pipeline.progress_buffer == 0 {
            return Err(EngineError::Config(
                "pipeline.progress_buffer must be at least 1".to_string(),
            ));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        if let Some(path) = &self.corpus.path {
            self.corpus.path = Some(expand_path(path)?);
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.pipeline.max_documents, 3);
        assert_eq!(config.pipeline.query_variants, 3);
        assert!(config.corpus.path.is_none());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/corpus.json");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("corpus.json"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default_config();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.pipeline, deserialized.pipeline);
    }

    #[test]
    fn test_pipeline_section_is_optional() {
        let config: Config = toml::from_str(
            r#"
[core]
log_level = "debug"

[llm]
"#,
        )
        .unwrap();

        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.llm.gemini.timeout_secs, 60);
    }
}
