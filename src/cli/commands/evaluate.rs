//! Evaluate command implementation
//!
//! This module implements the `evaluate` command, which runs every selected
//! prompt variant over every selected labelled document and writes the
//! metrics files.

use super::split_list;
use crate::adapters::llm::create_model_client;
use crate::cli::{exit_code, EXIT_CONFIGURATION, EXIT_FATAL, EXIT_LOAD, EXIT_PARTIAL_FAILURE};
use crate::config::load_config;
use crate::core::evaluation::{select_documents, EvaluationRunner};
use crate::core::loader::{load_corpus, DocumentSource};
use crate::core::prompts::PromptStore;
use crate::domain::{DocumentId, PromptId};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the evaluate command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Prompt ID(s) to evaluate (comma-separated, default: all)
    #[arg(long)]
    pub prompt_id: Option<String>,

    /// Document ID(s) to evaluate (comma-separated, default: all)
    #[arg(long)]
    pub document: Option<String>,

    /// Override the documents source
    #[arg(long)]
    pub documents: Option<PathBuf>,

    /// Override the ground-truth labels file
    #[arg(long)]
    pub ground_truth: Option<PathBuf>,

    /// Override the results directory
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
}

impl EvaluateArgs {
    /// Execute the evaluate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting evaluate command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        if let Some(path) = &self.documents {
            tracing::info!(path = %path.display(), "Overriding documents source from CLI");
            config.data.documents_path = path.clone();
        }
        if let Some(path) = &self.ground_truth {
            tracing::info!(path = %path.display(), "Overriding ground truth from CLI");
            config.data.ground_truth_path = path.clone();
        }
        if let Some(dir) = &self.results_dir {
            tracing::info!(path = %dir.display(), "Overriding results directory from CLI");
            config.evaluation.results_dir = dir.clone();
        }

        let prompt_ids = match self
            .prompt_id
            .as_deref()
            .map(split_list)
            .unwrap_or_else(|| config.prompts.default_ids.clone())
            .into_iter()
            .map(PromptId::new)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(ids) => ids,
            Err(e) => {
                eprintln!("❌ Invalid prompt ID: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        let document_ids = match self
            .document
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .into_iter()
            .map(DocumentId::new)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(ids) => ids,
            Err(e) => {
                eprintln!("❌ Invalid document ID: {e}");
                return Ok(EXIT_LOAD);
            }
        };

        let prompts = match PromptStore::load(config.prompts.variants_path.as_deref()) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        let documents = match DocumentSource::detect(
            &config.data.documents_path,
            config.data.sheet.as_deref(),
        )
        .and_then(|source| load_corpus(&source, &config.data.ground_truth_path))
        .and_then(|documents| select_documents(documents, &document_ids))
        {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load documents");
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        let client = match create_model_client(&config.model) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create model client");
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        println!(
            "🚀 Evaluating {} prompt(s) on {} document(s) with {}",
            if prompt_ids.is_empty() {
                prompts.len()
            } else {
                prompt_ids.len()
            },
            documents.len(),
            client.model_name()
        );
        println!();

        let runner = EvaluationRunner::new(
            client,
            prompts,
            config.evaluation.case_sensitive,
            config.evaluation.results_dir.clone(),
        );
        let report = match runner.run(&documents, &prompt_ids).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Evaluation failed");
                eprintln!("❌ Evaluation failed: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        println!("📊 Evaluation Summary:");
        println!(
            "  {:<12} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Prompt", "Precision", "Recall", "F1", "Micro F1", "Failures"
        );
        for summary in &report.summaries {
            println!(
                "  {:<12} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                summary.prompt_id.as_str(),
                summary.macro_average.precision,
                summary.macro_average.recall,
                summary.macro_average.f1,
                summary.micro_average.f1,
                summary.failures
            );
        }
        for failed in &report.failed_prompts {
            println!("  ⚠️  {} skipped: {}", failed.prompt_id, failed.reason);
        }
        if let Some(best) = report.best() {
            println!();
            println!(
                "🏆 Best prompt: {} (F1 {:.4})",
                best.prompt_id, best.macro_average.f1
            );
        }
        println!("  Results: {}", runner.results_dir().display());
        println!("  Duration: {:.2}s", report.duration.as_secs_f64());
        println!();

        if report.is_successful() {
            println!("✅ Evaluation completed successfully");
            Ok(0)
        } else {
            println!(
                "⚠️  Evaluation completed with {} failed document(s) and {} skipped prompt(s)",
                report.pair_failures(),
                report.failed_prompts.len()
            );
            Ok(EXIT_PARTIAL_FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let args = EvaluateArgs {
            prompt_id: None,
            document: None,
            documents: None,
            ground_truth: None,
            results_dir: None,
        };
        let code = args.execute("/nonexistent/pii-eval.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIGURATION);
    }
}
