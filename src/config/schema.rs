//! Configuration schema types
//!
//! This module defines the configuration structure that maps to
//! `pii-eval.toml`.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiiEvalConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Model endpoint configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Input data locations
    pub data: DataConfig,

    /// Prompt variant settings
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Batch evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Single-document redaction settings
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PiiEvalConfig {
    /// Validates the configuration
    ///
    /// The API key is not required here; it is checked when a model client
    /// is built so that `validate-config` and `parse-labels` work without one.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.model.validate()?;
        self.data.validate()?;
        self.prompts.validate()?;
        self.evaluation.validate()?;
        self.redaction.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for transient model failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 = no retry)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "model.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "model.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "model.retry.initial_delay_ms cannot exceed model.retry.max_delay_ms".to_string(),
            );
        }
        Ok(())
    }

    /// Delay before the given retry (1-based), capped at `max_delay_ms`
    pub fn delay_ms(&self, retry: usize) -> u64 {
        let exponent = retry.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        (delay as u64).min(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Hosted model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model provider (only "gemini" is supported)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL of the generative language API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key, zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Sampling temperature (provider default when unset)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Ask the endpoint for JSON output constrained by a response schema
    #[serde(default = "default_true")]
    pub structured_output: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ModelConfig {
    fn validate(&self) -> Result<(), String> {
        if self.provider.to_lowercase() != "gemini" {
            return Err(format!(
                "Unsupported model provider '{}'. Supported providers: gemini",
                self.provider
            ));
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("model.base_url is not a valid URL: {e}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("model.base_url must start with http:// or https://".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("model.model cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 600 {
            return Err(format!(
                "model.timeout_seconds must be between 1 and 600, got {}",
                self.timeout_seconds
            ));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "model.temperature must be between 0.0 and 2.0, got {temperature}"
                ));
            }
        }

        self.retry.validate()?;
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            temperature: None,
            structured_output: true,
            retry: RetryConfig::default(),
        }
    }
}

/// Input data locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Spreadsheet, directory of .txt files, or JSON document list
    pub documents_path: PathBuf,

    /// Ground-truth labels JSON
    pub ground_truth_path: PathBuf,

    /// Worksheet name (first sheet when unset)
    #[serde(default)]
    pub sheet: Option<String>,
}

impl DataConfig {
    fn validate(&self) -> Result<(), String> {
        if self.documents_path.as_os_str().is_empty() {
            return Err("data.documents_path cannot be empty".to_string());
        }
        if self.ground_truth_path.as_os_str().is_empty() {
            return Err("data.ground_truth_path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Prompt variant settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Optional TOML file with extra prompt variants
    #[serde(default)]
    pub variants_path: Option<PathBuf>,

    /// Prompt IDs evaluated when none are given on the command line
    /// (all variants when empty)
    #[serde(default)]
    pub default_ids: Vec<String>,
}

impl PromptsConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(id) = self.default_ids.iter().find(|id| id.trim().is_empty()) {
            return Err(format!("prompts.default_ids contains an empty ID: '{id}'"));
        }
        Ok(())
    }
}

/// Batch evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Directory for predictions, metrics and comparison files
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Match entity text case-sensitively
    #[serde(default)]
    pub case_sensitive: bool,
}

impl EvaluationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.results_dir.as_os_str().is_empty() {
            return Err("evaluation.results_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            case_sensitive: false,
        }
    }
}

/// Single-document redaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Directory for redacted documents
    #[serde(default = "default_results_dir")]
    pub output_dir: PathBuf,

    /// Match entity text case-sensitively
    #[serde(default)]
    pub case_sensitive: bool,

    /// Write a redaction statistics JSON next to the redacted text
    #[serde(default = "default_true")]
    pub save_stats: bool,
}

impl RedactionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.as_os_str().is_empty() {
            return Err("redaction.output_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            output_dir: default_results_dir(),
            case_sensitive: false,
            save_stats: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
