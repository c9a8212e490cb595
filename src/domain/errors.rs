//! Domain error types
//!
//! This module defines the error hierarchy for pii-eval. Errors are
//! domain-specific and don't expose third-party types; conversions from
//! I/O, JSON, TOML and spreadsheet errors are provided at the bottom.

use thiserror::Error;

/// Main pii-eval error type
///
/// The variants follow the propagation policy of the pipeline:
/// configuration and load errors abort a run, template errors abort one
/// prompt, transient/model and validation errors are isolated to a single
/// (document, prompt) pair.
#[derive(Debug, Error)]
pub enum PiiEvalError {
    /// Missing credential or invalid configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad input files (fatal, aborts the run)
    #[error("Load error: {0}")]
    Load(String),

    /// Bad prompt template (fatal for that prompt only)
    #[error("Template error: {0}")]
    Template(String),

    /// Model call failed after all retry attempts
    #[error("Transient error: {0}")]
    Transient(ModelError),

    /// Model call failed with a non-retryable error
    #[error("Model error: {0}")]
    Model(ModelError),

    /// Malformed model output
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PiiEvalError {
    /// Returns true if the caller may retry the operation
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Returns true if the error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Load(_))
    }
}

/// Model endpoint errors
///
/// Errors that occur when calling the hosted model. These errors don't
/// expose the HTTP client's types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Failed to reach the model endpoint
    #[error("Failed to connect to model endpoint: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx other than 429)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be decoded or carried no text
    #[error("Invalid response from model endpoint: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Network, timeout, throttling and 5xx failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout(_)
                | Self::RateLimited(_)
                | Self::ServerError { .. }
        )
    }
}

impl From<ModelError> for PiiEvalError {
    fn from(err: ModelError) -> Self {
        if err.is_transient() {
            PiiEvalError::Transient(err)
        } else {
            PiiEvalError::Model(err)
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PiiEvalError {
    fn from(err: std::io::Error) -> Self {
        PiiEvalError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PiiEvalError {
    fn from(err: serde_json::Error) -> Self {
        PiiEvalError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PiiEvalError {
    fn from(err: toml::de::Error) -> Self {
        PiiEvalError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Spreadsheets are only ever read as document input
impl From<calamine::Error> for PiiEvalError {
    fn from(err: calamine::Error) -> Self {
        PiiEvalError::Load(format!("Spreadsheet error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PiiEvalError::Configuration("missing api key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing api key");
    }

    #[test]
    fn test_transient_model_error_conversion() {
        let err: PiiEvalError = ModelError::Timeout("30s".to_string()).into();
        assert!(matches!(err, PiiEvalError::Transient(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_model_error_is_not_transient() {
        let model_err = ModelError::ClientError {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(!model_err.is_transient());

        let err: PiiEvalError = model_err.into();
        assert!(matches!(err, PiiEvalError::Model(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_server_and_rate_limit_are_transient() {
        assert!(ModelError::RateLimited("slow down".to_string()).is_transient());
        assert!(ModelError::ServerError {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!ModelError::InvalidResponse("no candidates".to_string()).is_transient());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(PiiEvalError::Load("bad".to_string()).is_fatal());
        assert!(PiiEvalError::Configuration("bad".to_string()).is_fatal());
        assert!(!PiiEvalError::Validation("bad".to_string()).is_fatal());
        assert!(!PiiEvalError::Template("bad".to_string()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PiiEvalError = io_err.into();
        assert!(matches!(err, PiiEvalError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PiiEvalError = json_err.into();
        assert!(matches!(err, PiiEvalError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PiiEvalError = toml_err.into();
        assert!(matches!(err, PiiEvalError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
