//! Configuration management for Veridoc
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, VeridocError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Veridoc
///
/// This structure holds everything the client needs to reach the platform
/// backend: the API endpoint, upload behavior, and chat streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Bulk upload settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Chat streaming settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the platform backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds for non-streaming calls
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.veridoc.io".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Bulk upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Size of each body chunk handed to the transport (bytes)
    ///
    /// Progress is reported once per chunk, so smaller chunks give finer
    /// progress granularity at the cost of more callback invocations.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum size of a single file accepted for upload (bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_chunk_size() -> usize {
    64 * 1024
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Chat streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Timeout in seconds for the initial response headers
    #[serde(default = "default_chat_timeout")]
    pub request_timeout_seconds: u64,

    /// Replacement text shown when a stream fails mid-flight
    #[serde(default = "default_failure_message")]
    pub failure_message: String,
}

fn default_chat_timeout() -> u64 {
    60
}

fn default_failure_message() -> String {
    "Sorry, something went wrong while generating the answer. Please try again.".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_chat_timeout(),
            failure_message: default_failure_message(),
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
            .map_err(|e| VeridocError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents).map_err(|e| VeridocError::Yaml(e).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("VERIDOC_API_BASE") {
            tracing::debug!(base_url = %base_url, "Env override: VERIDOC_API_BASE");
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("VERIDOC_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid VERIDOC_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(chunk_size) = std::env::var("VERIDOC_UPLOAD_CHUNK_SIZE") {
            if let Ok(value) = chunk_size.parse() {
                self.upload.chunk_size = value;
            } else {
                tracing::warn!("Invalid VERIDOC_UPLOAD_CHUNK_SIZE: {}", chunk_size);
            }
        }

        if let Ok(max_size) = std::env::var("VERIDOC_UPLOAD_MAX_FILE_SIZE") {
            if let Ok(value) = max_size.parse() {
                self.upload.max_file_size = value;
            } else {
                tracing::warn!("Invalid VERIDOC_UPLOAD_MAX_FILE_SIZE: {}", max_size);
            }
        }

        if let Ok(timeout) = std::env::var("VERIDOC_CHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.chat.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid VERIDOC_CHAT_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_base) = &cli.api_base {
            tracing::debug!(api_base = %api_base, "CLI override: --api-base");
            self.api.base_url = api_base.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Config` if any setting is unusable.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(VeridocError::Config("api.base_url must not be empty".to_string()).into());
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(VeridocError::Config(format!(
                "api.base_url must be an http(s) URL, got: {}",
                self.api.base_url
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(
                VeridocError::Config("api.timeout_seconds must be non-zero".to_string()).into(),
            );
        }

        if self.upload.chunk_size == 0 {
            return Err(
                VeridocError::Config("upload.chunk_size must be non-zero".to_string()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            upload: UploadConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}
