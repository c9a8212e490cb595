//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for pii-eval using clap.
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Completed with failed documents, skipped prompts or invalid model output |
//! | 2 | Configuration error |
//! | 3 | Input data could not be loaded |
//! | 5 | Fatal error |

pub mod commands;

use crate::domain::PiiEvalError;
use clap::{Parser, Subcommand};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL_FAILURE: i32 = 1;
pub const EXIT_CONFIGURATION: i32 = 2;
pub const EXIT_LOAD: i32 = 3;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error that ended a command
pub fn exit_code(error: &PiiEvalError) -> i32 {
    match error {
        PiiEvalError::Configuration(_) | PiiEvalError::Template(_) => EXIT_CONFIGURATION,
        PiiEvalError::Load(_) => EXIT_LOAD,
        PiiEvalError::Transient(_) | PiiEvalError::Model(_) | PiiEvalError::Validation(_) => {
            EXIT_PARTIAL_FAILURE
        }
        PiiEvalError::Io(_) | PiiEvalError::Serialization(_) => EXIT_FATAL,
    }
}

/// pii-eval - PII detection prompt evaluation for legal documents
#[derive(Parser, Debug)]
#[command(name = "pii-eval")]
#[command(version, about, long_about = None)]
#[command(author = "pii-eval Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pii-eval.toml", env = "PII_EVAL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PII_EVAL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate prompt variants against labelled documents
    Evaluate(commands::evaluate::EvaluateArgs),

    /// Redact one document with one prompt
    Redact(commands::redact::RedactArgs),

    /// Convert raw label text into ground-truth JSON
    ParseLabels(commands::parse_labels::ParseLabelsArgs),

    /// List available prompt variants
    ListPrompts(commands::list_prompts::ListPromptsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
