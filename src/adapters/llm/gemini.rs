//! Gemini model client
//!
//! Talks to the Google generative language REST API
//! (`POST {base_url}/models/{model}:generateContent`).

use super::models::{
    entity_response_schema, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use super::ModelClient;
use crate::config::{ModelConfig, RetryConfig, SecretString};
use crate::domain::{ModelError, PiiEvalError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Gemini `generateContent` client
///
/// Built from an explicit [`ModelConfig`]; there is no process-wide client.
///
/// # Example
///
/// ```no_run
/// use pii_eval::adapters::llm::{GeminiClient, ModelClient};
/// use pii_eval::config::{secret_string, ModelConfig};
///
/// # async fn example() -> pii_eval::domain::Result<()> {
/// let config = ModelConfig {
///     api_key: Some(secret_string("AIza-example".to_string())),
///     ..ModelConfig::default()
/// };
/// let client = GeminiClient::new(config)?;
/// let raw = client.generate("Extract the PII ...").await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: SecretString,
    temperature: Option<f32>,
    structured_output: bool,
    retry: RetryConfig,
    timeout_seconds: u64,
    client: Client,
}

impl GeminiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns `PiiEvalError::Configuration` if the API key is missing or
    /// blank, the base URL is not http(s), or the HTTP client cannot be built.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let api_key = match config.api_key {
            Some(key) if !key.expose_secret().is_blank() => key,
            _ => {
                return Err(PiiEvalError::Configuration(
                    "Missing model API key: set model.api_key, PII_EVAL_MODEL_API_KEY or GEMINI_API_KEY"
                        .to_string(),
                ))
            }
        };

        let base_url = url::Url::parse(&config.base_url).map_err(|e| {
            PiiEvalError::Configuration(format!("Invalid model base URL '{}': {e}", config.base_url))
        })?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(PiiEvalError::Configuration(format!(
                "Model base URL must be http or https, got '{}'",
                config.base_url
            )));
        }

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PiiEvalError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            endpoint,
            model: config.model,
            api_key,
            temperature: config.temperature,
            structured_output: config.structured_output,
            retry: config.retry,
            timeout_seconds: config.timeout_seconds,
            client,
        })
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        let mut generation = GenerationConfig {
            temperature: self.temperature,
            ..GenerationConfig::default()
        };
        if self.structured_output {
            generation.response_mime_type = Some("application/json".to_string());
            generation.response_schema = Some(entity_response_schema());
        }
        if generation.is_empty() {
            None
        } else {
            Some(generation)
        }
    }

    /// One HTTP round trip, no retry
    async fn send_once(&self, prompt: &str) -> std::result::Result<String, ModelError> {
        let mut body = GenerateContentRequest::from_prompt(prompt);
        if let Some(generation) = self.generation_config() {
            body = body.with_generation_config(generation);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose_secret().as_ref())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to decode body: {e}")))?;

        if let Some(text) = parsed.first_candidate_text() {
            return Ok(text);
        }

        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {r}"))
            .or_else(|| {
                parsed
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .map(|r| format!("no text in candidate (finish reason {r})"))
            })
            .unwrap_or_else(|| "no candidates in response".to_string());
        Err(ModelError::InvalidResponse(reason))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(format!("no response within {}s", self.timeout_seconds))
        } else {
            ModelError::ConnectionFailed(e.to_string())
        }
    }

    /// Retry an operation with exponential backoff
    ///
    /// Only transient errors are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> std::result::Result<T, ModelError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ModelError>>,
    {
        let max_attempts = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if !e.is_transient() || attempt >= max_attempts {
                        return Err(e);
                    }

                    let delay_ms = self.retry.delay_ms(attempt);
                    crate::log_retry_attempt!(attempt + 1, max_attempts, &e);
                    tracing::debug!(delay_ms = delay_ms, "Backing off before retry");

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

fn map_status_error(status: StatusCode, body: &str) -> ModelError {
    let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if status == StatusCode::TOO_MANY_REQUESTS {
        ModelError::RateLimited(message)
    } else if status.is_server_error() {
        ModelError::ServerError {
            status: status.as_u16(),
            message,
        }
    } else {
        ModelError::ClientError {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Sending prompt");
        let text = self.retry_request(|| self.send_once(prompt)).await?;
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
