//! Configuration management for Teachmate
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TeachmateError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Teachmate
///
/// This structure holds the generation provider settings, document
/// retrieval limits, storage location, and the teacher profile used when
/// building the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Hosted generation API configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Reference document limits
    #[serde(default)]
    pub documents: DocumentsConfig,
    /// Chat store location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Assistant persona settings
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Generation provider configuration
///
/// `models` is the fixed fallback universe. The user's preferred model is
/// tried first, then the remaining entries in this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the generation API (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Known model identifiers in fallback order
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Output length cap sent with every request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// HTTP transport timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "gemini-3-flash-preview".to_string(),
        "gemini-3-pro-preview".to_string(),
        "gemini-2.5-flash".to_string(),
    ]
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            models: default_models(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ProviderConfig {
    /// Model used when the user has not picked one
    pub fn default_model(&self) -> &str {
        self.models.first().map(String::as_str).unwrap_or_default()
    }
}

/// Reference document limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Maximum characters per chunk when splitting document text
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters of each selected document included in the prompt
    #[serde(default = "default_per_document_chars")]
    pub per_document_chars: usize,

    /// Characters of document content kept in the store
    #[serde(default = "default_max_stored_chars")]
    pub max_stored_chars: usize,
}

fn default_chunk_size() -> usize {
    12_000
}

fn default_per_document_chars() -> usize {
    8_000
}

fn default_max_stored_chars() -> usize {
    100_000
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            per_document_chars: default_per_document_chars(),
            max_stored_chars: default_max_stored_chars(),
        }
    }
}

/// Chat store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Explicit database directory; the platform data dir is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Assistant persona configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Reply language used until the user picks one with `settings`
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Teacher profile embedded in the system prompt
    #[serde(default)]
    pub profile: TeacherProfile,
}

fn default_language() -> String {
    "vi".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            profile: TeacherProfile::default(),
        }
    }
}

/// Teacher profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeacherProfile {
    /// Display name
    #[serde(default = "default_profile_name")]
    pub name: String,
    /// Subject taught
    #[serde(default)]
    pub subject: String,
    /// School level (primary, lower secondary, ...)
    #[serde(default)]
    pub school_level: String,
    /// School name, if given
    #[serde(default)]
    pub school_name: Option<String>,
}

fn default_profile_name() -> String {
    "Giáo viên".to_string()
}

impl Default for TeacherProfile {
    fn default() -> Self {
        Self {
            name: default_profile_name(),
            subject: String::new(),
            school_level: String::new(),
            school_name: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TeachmateError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TeachmateError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("TEACHMATE_API_BASE") {
            self.provider.api_base = api_base;
        }

        if let Ok(models) = std::env::var("TEACHMATE_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !models.is_empty() {
                tracing::debug!(?models, "Env override: TEACHMATE_MODELS");
                self.provider.models = models;
            }
        }

        if let Ok(max_tokens) = std::env::var("TEACHMATE_MAX_OUTPUT_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.provider.max_output_tokens = value;
            } else {
                tracing::warn!("Invalid TEACHMATE_MAX_OUTPUT_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(timeout) = std::env::var("TEACHMATE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.provider.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid TEACHMATE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(store) = std::env::var("TEACHMATE_STORE") {
            tracing::debug!(store = %store, "Env override: TEACHMATE_STORE");
            self.storage.path = Some(PathBuf::from(store));
        }

        if let Ok(language) = std::env::var("TEACHMATE_LANGUAGE") {
            self.assistant.default_language = language;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(path) = &cli.storage_path {
            tracing::info!("Using chat store override from CLI: {}", path.display());
            self.storage.path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_base.trim().is_empty() {
            return Err(
                TeachmateError::Config("provider.api_base cannot be empty".to_string()).into(),
            );
        }

        if self.provider.models.is_empty() {
            return Err(TeachmateError::Config(
                "provider.models must list at least one model".to_string(),
            )
            .into());
        }

        let mut seen = std::collections::HashSet::new();
        for model in &self.provider.models {
            if model.trim().is_empty() {
                return Err(TeachmateError::Config(
                    "provider.models cannot contain empty identifiers".to_string(),
                )
                .into());
            }
            if !seen.insert(model.as_str()) {
                return Err(TeachmateError::Config(format!(
                    "provider.models lists {} more than once",
                    model
                ))
                .into());
            }
        }

        if self.provider.max_output_tokens == 0 {
            return Err(TeachmateError::Config(
                "provider.max_output_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if self.provider.timeout_seconds == 0 {
            return Err(TeachmateError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.documents.chunk_size < 2 {
            return Err(TeachmateError::Config(
                "documents.chunk_size must be at least 2".to_string(),
            )
            .into());
        }

        if self.documents.per_document_chars == 0 {
            return Err(TeachmateError::Config(
                "documents.per_document_chars must be greater than 0".to_string(),
            )
            .into());
        }

        if self.documents.max_stored_chars == 0 {
            return Err(TeachmateError::Config(
                "documents.max_stored_chars must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir, test_config_yaml};
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.models.len(), 3);
        assert_eq!(config.provider.default_model(), "gemini-3-flash-preview");
        assert_eq!(config.provider.max_output_tokens, 4096);
        assert_eq!(config.documents.chunk_size, 12_000);
        assert_eq!(config.documents.per_document_chars, 8_000);
        assert_eq!(config.assistant.default_language, "vi");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
provider:
  models: [a, b]
documents:
  per_document_chars: 500
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.models, vec!["a", "b"]);
        assert_eq!(config.provider.max_output_tokens, 4096);
        assert_eq!(config.documents.per_document_chars, 500);
        assert_eq!(config.documents.chunk_size, 12_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_models() {
        let mut config = Config::default();
        config.provider.models.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_models() {
        let mut config = Config::default();
        config.provider.models = vec!["a".to_string(), "a".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_validate_rejects_zero_output_cap() {
        let mut config = Config::default();
        config.provider.max_output_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_document_cap() {
        let mut config = Config::default();
        config.documents.per_document_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/teachmate.yaml", &cli).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_full_config_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", &test_config_yaml());
        let cli = crate::cli::Cli::default();

        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.api_base, "http://localhost:9999");
        assert_eq!(config.provider.default_model(), "gemini-3-flash-preview");
        assert_eq!(config.provider.max_output_tokens, 2048);
        assert_eq!(config.documents.chunk_size, 4000);
        assert_eq!(config.assistant.default_language, "en");
        assert_eq!(
            config.assistant.profile.school_name.as_deref(),
            Some("THPT Lê Quý Đôn")
        );
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider: [unterminated").unwrap();
        let cli = crate::cli::Cli::default();
        let result = Config::load(path.to_str().unwrap(), &cli);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_models_and_store() {
        std::env::set_var("TEACHMATE_MODELS", "x-model, y-model");
        std::env::set_var("TEACHMATE_STORE", "/tmp/teachmate-store");
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/teachmate.yaml", &cli).unwrap();
        std::env::remove_var("TEACHMATE_MODELS");
        std::env::remove_var("TEACHMATE_STORE");

        assert_eq!(config.provider.models, vec!["x-model", "y-model"]);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/teachmate-store"))
        );
    }

    #[test]
    #[serial]
    fn test_invalid_env_number_is_ignored() {
        std::env::set_var("TEACHMATE_MAX_OUTPUT_TOKENS", "lots");
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/teachmate.yaml", &cli).unwrap();
        std::env::remove_var("TEACHMATE_MAX_OUTPUT_TOKENS");
        assert_eq!(config.provider.max_output_tokens, 4096);
    }

    #[test]
    fn test_cli_storage_path_overrides_config() {
        let mut cli = crate::cli::Cli::default();
        cli.storage_path = Some(PathBuf::from("/tmp/cli-store"));
        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/cli-store")));
    }
}
