//! Model client trait definition
//!
//! `ModelClient` abstracts the hosted model endpoint so that the evaluation
//! runner and the redaction pipeline can be driven by any backend, including
//! in-process fakes in tests.

use crate::domain::Result;
use async_trait::async_trait;

/// Sends a rendered prompt to a model and returns its raw text output
///
/// # Example
///
/// ```no_run
/// use pii_eval::adapters::llm::{GeminiClient, ModelClient};
/// use pii_eval::config::ModelConfig;
///
/// # async fn example(config: ModelConfig) -> pii_eval::domain::Result<()> {
/// let client = GeminiClient::new(config)?;
/// let raw = client.generate("Find the PII in: Contact John Smith").await?;
/// println!("{} answered {} bytes", client.model_name(), raw.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a completion for the prompt
    ///
    /// # Errors
    ///
    /// Returns `PiiEvalError::Transient` when the endpoint could not be
    /// reached or kept failing transiently, `PiiEvalError::Model` for
    /// non-retryable endpoint errors.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model name recorded in result metadata
    fn model_name(&self) -> &str;
}
