use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use std::time::Duration;

use crate::language_utils;
use crate::translation::chunker::ChunkStrategy;
use crate::translation::client::RetryPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code ("es", "zh" or "auto")
    pub source_language: String,

    /// Target language code (always English)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Output file format
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    // @backend: LibreTranslate-compatible HTTP service
    #[default]
    Remote,
    // @backend: Model served by a local Ollama instance
    Local,
}

impl BackendKind {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Remote => "Remote (LibreTranslate)",
            Self::Local => "Local model (Ollama)",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Remote => "remote".to_string(),
            Self::Local => "local".to_string(),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            _ => Err(anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// Output document format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain UTF-8 text
    #[default]
    Txt,
    /// Word document, one paragraph per non-blank line
    Docx,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Docx => "docx",
        }
    }

    /// MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Txt => "text/plain",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }
}

/// Chunk splitting configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Strategy name: "lines", "words" or "window"
    #[serde(default)]
    pub strategy: ChunkStrategyKind,

    /// Character limit for the "lines" and "window" strategies
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Word limit for the "words" strategy
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

/// Chunking strategy selector as it appears in the config file
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategyKind {
    #[default]
    Lines,
    Words,
    Window,
}

impl std::str::FromStr for ChunkStrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lines" => Ok(Self::Lines),
            "words" => Ok(Self::Words),
            "window" => Ok(Self::Window),
            _ => Err(anyhow!("Invalid chunk strategy: {}", s)),
        }
    }
}

impl ChunkingConfig {
    /// Resolve the configured strategy and its limit
    pub fn strategy(&self) -> ChunkStrategy {
        match self.strategy {
            ChunkStrategyKind::Lines => ChunkStrategy::Lines { max_chars: self.max_chars },
            ChunkStrategyKind::Words => ChunkStrategy::Words { max_words: self.max_words },
            ChunkStrategyKind::Window => ChunkStrategy::Window { max_chars: self.max_chars },
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategyKind::default(),
            max_chars: default_max_chars(),
            max_words: default_max_words(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: BackendKind,

    /// Remote backend base URLs, tried in order and rotated on failure
    #[serde(default = "default_remote_endpoints")]
    pub endpoints: Vec<String>,

    /// Local backend base URLs
    #[serde(default = "default_local_endpoints")]
    pub local_endpoints: Vec<String>,

    /// Model name served by the local backend
    #[serde(default = "default_local_model")]
    pub local_model: String,

    /// Chunking settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Retry and timeout settings applicable to all backends
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Retries after the first failed attempt
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Fixed delay between attempts (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslationCommonConfig {
    /// Retry policy handed to the translation client
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_count,
            backoff: Duration::from_millis(self.retry_backoff_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_target_language() -> String {
    language_utils::TARGET_LANGUAGE.to_string()
}

fn default_max_chars() -> usize {
    1000
}

fn default_max_words() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    2 // 3 attempts in total
}

fn default_retry_backoff_ms() -> u64 {
    1000 // constant, not doubled between attempts
}

fn default_remote_endpoints() -> Vec<String> {
    vec!["http://localhost:5000".to_string()]
}

fn default_local_endpoints() -> Vec<String> {
    vec!["http://localhost:11434".to_string()]
}

fn default_local_model() -> String {
    "llama3.2:3b".to_string()
}

impl Config {
    /// Load a configuration file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(path, config_json)
                .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
            Ok(config)
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let source = language_utils::normalize_source_language(&self.source_language)?;

        if !language_utils::language_codes_match(&self.target_language, language_utils::TARGET_LANGUAGE) {
            return Err(anyhow!(
                "Unsupported target language: {} (only English is supported)",
                self.target_language
            ));
        }

        let endpoints = self.translation.active_endpoints();
        if endpoints.is_empty() {
            return Err(anyhow!(
                "At least one endpoint is required for the {} backend",
                self.translation.backend
            ));
        }
        for endpoint in endpoints {
            crate::translation::backend_pool::BackendEndpoint::parse(endpoint)?;
        }

        if self.translation.backend == BackendKind::Local {
            if source == language_utils::AUTO_DETECT {
                return Err(anyhow!("The local backend needs an explicit source language (es or zh)"));
            }
            if self.translation.local_model.trim().is_empty() {
                return Err(anyhow!("A model name is required for the local backend"));
            }
        }

        let chunking = &self.translation.chunking;
        let limit = match chunking.strategy {
            ChunkStrategyKind::Words => chunking.max_words,
            ChunkStrategyKind::Lines | ChunkStrategyKind::Window => chunking.max_chars,
        };
        if limit == 0 {
            return Err(anyhow!("Chunk size limit must be greater than zero"));
        }

        if self.translation.common.timeout_secs == 0 {
            return Err(anyhow!("Timeout must be greater than zero"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "es".to_string(),
            target_language: default_target_language(),
            output_format: OutputFormat::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Endpoints for the selected backend
    pub fn active_endpoints(&self) -> &[String] {
        match self.backend {
            BackendKind::Remote => &self.endpoints,
            BackendKind::Local => &self.local_endpoints,
        }
    }

    /// Replace the endpoints of the selected backend
    pub fn set_active_endpoints(&mut self, endpoints: Vec<String>) {
        match self.backend {
            BackendKind::Remote => self.endpoints = endpoints,
            BackendKind::Local => self.local_endpoints = endpoints,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            endpoints: default_remote_endpoints(),
            local_endpoints: default_local_endpoints(),
            local_model: default_local_model(),
            chunking: ChunkingConfig::default(),
            common: TranslationCommonConfig::default(),
        }
    }
}
