//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PiiEvalConfig;
use super::secret::secret_string;
use crate::domain::errors::PiiEvalError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Fallback environment variable for the model API key
pub const API_KEY_ENV_FALLBACK: &str = "GEMINI_API_KEY";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PiiEvalConfig
/// 4. Applies environment variable overrides (PII_EVAL_* prefix)
/// 5. Falls back to `GEMINI_API_KEY` when no API key is configured
/// 6. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use pii_eval::config::loader::load_config;
///
/// let config = load_config("pii-eval.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PiiEvalConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PiiEvalError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PiiEvalError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PiiEvalConfig = toml::from_str(&contents)
        .map_err(|e| PiiEvalError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    apply_api_key_fallback(&mut config);

    config.validate().map_err(|e| {
        PiiEvalError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PiiEvalError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PiiEvalError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            PiiEvalError::Configuration(format!("Invalid value '{val}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using PII_EVAL_* prefix
///
/// Environment variables follow the pattern: PII_EVAL_<SECTION>_<KEY>,
/// e.g. PII_EVAL_MODEL_API_KEY or PII_EVAL_EVALUATION_RESULTS_DIR.
fn apply_env_overrides(config: &mut PiiEvalConfig) -> Result<()> {
    // Application
    if let Ok(val) = std::env::var("PII_EVAL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Model
    if let Ok(val) = std::env::var("PII_EVAL_MODEL_PROVIDER") {
        config.model.provider = val;
    }
    if let Ok(val) = std::env::var("PII_EVAL_MODEL_BASE_URL") {
        config.model.base_url = val;
    }
    if let Ok(val) = std::env::var("PII_EVAL_MODEL_MODEL") {
        config.model.model = val;
    }
    if let Ok(val) = std::env::var("PII_EVAL_MODEL_API_KEY") {
        config.model.api_key = Some(secret_string(val));
    }
    if let Some(timeout) = parse_env("PII_EVAL_MODEL_TIMEOUT_SECONDS")? {
        config.model.timeout_seconds = timeout;
    }
    if let Some(temperature) = parse_env("PII_EVAL_MODEL_TEMPERATURE")? {
        config.model.temperature = Some(temperature);
    }
    if let Some(structured) = parse_env("PII_EVAL_MODEL_STRUCTURED_OUTPUT")? {
        config.model.structured_output = structured;
    }
    if let Some(retries) = parse_env("PII_EVAL_MODEL_RETRY_MAX_RETRIES")? {
        config.model.retry.max_retries = retries;
    }

    // Data
    if let Ok(val) = std::env::var("PII_EVAL_DATA_DOCUMENTS_PATH") {
        config.data.documents_path = val.into();
    }
    if let Ok(val) = std::env::var("PII_EVAL_DATA_GROUND_TRUTH_PATH") {
        config.data.ground_truth_path = val.into();
    }
    if let Ok(val) = std::env::var("PII_EVAL_DATA_SHEET") {
        config.data.sheet = Some(val);
    }

    // Prompts
    if let Ok(val) = std::env::var("PII_EVAL_PROMPTS_VARIANTS_PATH") {
        config.prompts.variants_path = Some(val.into());
    }
    if let Ok(val) = std::env::var("PII_EVAL_PROMPTS_DEFAULT_IDS") {
        config.prompts.default_ids = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // Evaluation
    if let Ok(val) = std::env::var("PII_EVAL_EVALUATION_RESULTS_DIR") {
        config.evaluation.results_dir = val.into();
    }
    if let Some(case_sensitive) = parse_env("PII_EVAL_EVALUATION_CASE_SENSITIVE")? {
        config.evaluation.case_sensitive = case_sensitive;
    }

    // Redaction
    if let Ok(val) = std::env::var("PII_EVAL_REDACTION_OUTPUT_DIR") {
        config.redaction.output_dir = val.into();
    }
    if let Some(case_sensitive) = parse_env("PII_EVAL_REDACTION_CASE_SENSITIVE")? {
        config.redaction.case_sensitive = case_sensitive;
    }
    if let Some(save_stats) = parse_env("PII_EVAL_REDACTION_SAVE_STATS")? {
        config.redaction.save_stats = save_stats;
    }

    // Logging
    if let Some(enabled) = parse_env("PII_EVAL_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("PII_EVAL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("PII_EVAL_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn apply_api_key_fallback(config: &mut PiiEvalConfig) {
    if config.model.api_key.is_some() {
        return;
    }
    if let Ok(val) = std::env::var(API_KEY_ENV_FALLBACK) {
        config.model.api_key = Some(secret_string(val));
    }
}
