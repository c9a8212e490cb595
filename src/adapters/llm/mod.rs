//! Hosted model integration
//!
//! - [`ModelClient`] - async seam used by the evaluation and redaction pipelines
//! - [`GeminiClient`] - Gemini `generateContent` implementation with retry

pub mod gemini;
pub mod models;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::ModelClient;

use crate::config::ModelConfig;
use crate::domain::{PiiEvalError, Result};
use std::sync::Arc;

/// Build the model client named by `model.provider`
///
/// # Errors
///
/// Returns `PiiEvalError::Configuration` for an unknown provider or when the
/// client cannot be constructed (e.g. missing API key).
pub fn create_model_client(config: &ModelConfig) -> Result<Arc<dyn ModelClient>> {
    match config.provider.to_lowercase().as_str() {
        "gemini" => {
            tracing::info!(model = %config.model, "Creating Gemini client");
            let client = GeminiClient::new(config.clone())?;
            Ok(Arc::new(client) as Arc<dyn ModelClient>)
        }
        other => Err(PiiEvalError::Configuration(format!(
            "Unsupported model provider: {other}"
        ))),
    }
}
