//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! Entity text is PII and is never logged in clear; use
//! [`fingerprint`] when a value has to be correlated across log lines.
//!
//! # Example
//!
//! ```no_run
//! use pii_eval::logging::init_logging;
//! use pii_eval::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Evaluation started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{fingerprint, init_logging, parse_log_level, LoggingGuard};

/// Log the start of a (document, prompt) model call
///
/// # Example
///
/// ```no_run
/// use pii_eval::log_pair_start;
/// use pii_eval::domain::{DocumentId, PromptId};
///
/// let document_id = DocumentId::new("Test A").unwrap();
/// let prompt_id = PromptId::new("v2").unwrap();
/// log_pair_start!(&document_id, &prompt_id);
/// ```
#[macro_export]
macro_rules! log_pair_start {
    ($document_id:expr, $prompt_id:expr) => {
        tracing::debug!(
            document_id = %$document_id,
            prompt_id = %$prompt_id,
            "Calling model"
        );
    };
}

/// Log a (document, prompt) pair that scored zero because of a failure
///
/// # Example
///
/// ```no_run
/// use pii_eval::log_pair_failure;
/// use pii_eval::domain::{DocumentId, PromptId};
///
/// let document_id = DocumentId::new("Test A").unwrap();
/// let prompt_id = PromptId::new("v2").unwrap();
/// log_pair_failure!(&document_id, &prompt_id, "invalid_output", "not JSON");
/// ```
#[macro_export]
macro_rules! log_pair_failure {
    ($document_id:expr, $prompt_id:expr, $status:expr, $reason:expr) => {
        tracing::warn!(
            document_id = %$document_id,
            prompt_id = %$prompt_id,
            status = $status,
            reason = %$reason,
            "Document scored as failure"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use pii_eval::log_error_with_context;
/// use pii_eval::domain::PiiEvalError;
///
/// let error = PiiEvalError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use pii_eval::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
