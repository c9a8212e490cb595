//! Parse-labels command implementation
//!
//! Converts a raw label export (`Test X` headers followed by
//! `###Category #Value` lines) into the ground-truth JSON the evaluator
//! reads.

use crate::cli::exit_code;
use crate::core::loader::{parse_label_text, LabelMap};
use crate::domain::{PiiEvalError, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the parse-labels command
#[derive(Args, Debug)]
pub struct ParseLabelsArgs {
    /// Raw label text file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Ground-truth JSON to write
    #[arg(short, long)]
    pub output: PathBuf,
}

impl ParseLabelsArgs {
    /// Execute the parse-labels command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input.display(), "Parsing raw labels");

        match convert(&self.input, &self.output) {
            Ok(labels) => {
                let total: usize = labels
                    .values()
                    .flat_map(|categories| categories.values())
                    .map(Vec::len)
                    .sum();
                println!(
                    "✅ Parsed {} label(s) for {} document(s)",
                    total,
                    labels.len()
                );
                println!("  Output: {}", self.output.display());
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse labels");
                eprintln!("❌ {e}");
                Ok(exit_code(&e))
            }
        }
    }
}

fn convert(input: &Path, output: &Path) -> Result<LabelMap> {
    let raw = fs::read_to_string(input).map_err(|e| {
        PiiEvalError::Load(format!("Failed to read labels {}: {}", input.display(), e))
    })?;
    let labels = parse_label_text(&raw)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, serde_json::to_string_pretty(&labels)?)?;
    Ok(labels)
}
