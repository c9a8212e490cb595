//! Result type alias for pii-eval

use super::errors::PiiEvalError;

/// Result type alias for pii-eval operations
///
/// # Examples
///
/// ```
/// use pii_eval::domain::result::Result;
/// use pii_eval::domain::errors::PiiEvalError;
///
/// fn failing_function() -> Result<()> {
///     Err(PiiEvalError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PiiEvalError>;
