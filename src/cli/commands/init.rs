//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIGURATION, EXIT_FATAL};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "pii-eval.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing pii-eval configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIGURATION);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your data paths", self.output);
                println!("  2. Put GEMINI_API_KEY in your environment or a .env file");
                println!("  3. Validate configuration: pii-eval validate-config");
                println!("  4. Run the evaluation: pii-eval evaluate");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# pii-eval Configuration File
# PII detection prompt evaluation for legal documents

[application]
log_level = "info"

[model]
provider = "gemini"
model = "gemini-2.5-flash"
# Read from GEMINI_API_KEY when unset
# api_key = "${GEMINI_API_KEY}"

[data]
documents_path = "data/documents.xlsx"
ground_truth_path = "data/parsed_data.json"

[evaluation]
results_dir = "results"

[redaction]
output_dir = "results"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# pii-eval Configuration File
# PII detection prompt evaluation for legal documents
#
# Every value below can be overridden with an environment variable named
# PII_EVAL_<SECTION>_<KEY>, e.g. PII_EVAL_MODEL_TEMPERATURE=0.2

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Model Endpoint
# ============================================================================
[model]
# Model provider (currently only "gemini" is supported)
provider = "gemini"

# API base URL
base_url = "https://generativelanguage.googleapis.com/v1beta"

# Model name
model = "gemini-2.5-flash"

# API key; read from GEMINI_API_KEY when unset
# api_key = "${GEMINI_API_KEY}"

# Request timeout in seconds
timeout_seconds = 120

# Sampling temperature (0.0 - 2.0); model default when unset
# temperature = 0.0

# Ask for JSON output with an entity response schema
structured_output = true

[model.retry]
# Attempts for transient failures (connection, timeout, 429, 5xx)
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Input Data
# ============================================================================
[data]
# Spreadsheet (.xlsx, .xls, .ods), directory of .txt files, or JSON list
documents_path = "data/documents.xlsx"

# Ground-truth labels JSON (see `pii-eval parse-labels`)
ground_truth_path = "data/parsed_data.json"

# Worksheet name; first sheet when unset
# sheet = "Documents"

# ============================================================================
# Prompt Variants
# ============================================================================
[prompts]
# Extra variants in TOML ([[prompts]] id, description, template)
# variants_path = "prompts.toml"

# Prompts evaluated when --prompt-id is not given; all when empty
default_ids = []

# ============================================================================
# Evaluation
# ============================================================================
[evaluation]
# Directory for predictions, metrics and comparison files
results_dir = "results"

# Match entity text case-sensitively
case_sensitive = false

# ============================================================================
# Redaction
# ============================================================================
[redaction]
output_dir = "results"
case_sensitive = false
save_stats = true

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files with rotation
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }
}
