//! Configuration management for pii-eval.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! pii-eval uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PII_EVAL_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pii_eval::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pii-eval.toml")?;
//!
//! println!("Model: {}", config.model.model);
//! println!("Documents: {}", config.data.documents_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`ModelConfig`] - Hosted model endpoint, credentials and retry policy
//! - [`DataConfig`] - Document and ground-truth locations
//! - [`PromptsConfig`] - Extra prompt variants and default selection
//! - [`EvaluationConfig`] - Results directory and matching mode
//! - [`RedactionConfig`] - Redacted output directory and matching mode
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [model]
//! model = "gemini-2.5-flash"
//! api_key = "${GEMINI_API_KEY}"
//!
//! [data]
//! documents_path = "data/Testing Data Redaction.xlsx"
//! ground_truth_path = "data/parsed_data.json"
//!
//! [evaluation]
//! results_dir = "results"
//! ```
//!
//! When `model.api_key` is absent the `GEMINI_API_KEY` environment variable
//! is used.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DataConfig, EvaluationConfig, LoggingConfig, ModelConfig, PiiEvalConfig,
    PromptsConfig, RedactionConfig, RetryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
