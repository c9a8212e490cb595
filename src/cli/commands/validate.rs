//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the pii-eval configuration file.

use crate::cli::EXIT_CONFIGURATION;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Provider: {}", config.model.provider);
        println!("  Model: {}", config.model.model);
        println!("  Endpoint: {}", config.model.base_url);
        println!(
            "  API Key: {}",
            if config.model.api_key.is_some() {
                "configured"
            } else {
                "missing (required for evaluate and redact)"
            }
        );
        println!("  Structured Output: {}", config.model.structured_output);
        println!("  Max Retries: {}", config.model.retry.max_retries);
        println!("  Documents: {}", config.data.documents_path.display());
        println!("  Ground Truth: {}", config.data.ground_truth_path.display());
        if let Some(sheet) = &config.data.sheet {
            println!("  Sheet: {sheet}");
        }
        if let Some(path) = &config.prompts.variants_path {
            println!("  Prompt Variants: {}", path.display());
        }
        println!(
            "  Default Prompts: {}",
            if config.prompts.default_ids.is_empty() {
                "all".to_string()
            } else {
                config.prompts.default_ids.join(", ")
            }
        );
        println!("  Results Dir: {}", config.evaluation.results_dir.display());
        println!("  Redaction Output: {}", config.redaction.output_dir.display());
        println!();
        Ok(0)
    }
}
