//! Redact command implementation
//!
//! This module implements the `redact` command, which detects PII in one
//! document with one prompt variant and writes the redacted text.

use crate::adapters::llm::create_model_client;
use crate::cli::{exit_code, EXIT_CONFIGURATION, EXIT_LOAD};
use crate::config::{load_config, PiiEvalConfig};
use crate::core::evaluation::select_documents;
use crate::core::loader::{load_documents, DocumentSource};
use crate::core::prompts::PromptStore;
use crate::core::redaction::{detect_entities, entities_from_predictions, write_redaction, Redactor};
use crate::core::results::read_predictions;
use crate::domain::{Document, DocumentId, PiiEntity, PromptId, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Prompt ID used for detection
    #[arg(long)]
    pub prompt_id: String,

    /// Document ID to redact
    #[arg(long)]
    pub document: String,

    /// Override the documents source
    #[arg(long)]
    pub documents: Option<PathBuf>,

    /// Output directory (default: redaction.output_dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Match entity text case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Do not write the redaction statistics file
    #[arg(long)]
    pub no_stats: bool,

    /// Reuse a saved predictions_prompt_<id>.json instead of calling the model
    #[arg(long, value_name = "FILE")]
    pub predictions: Option<PathBuf>,
}

impl RedactArgs {
    /// Execute the redact command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(
            prompt_id = %self.prompt_id,
            document_id = %self.document,
            "Starting redact command"
        );

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };
        if let Some(path) = &self.documents {
            config.data.documents_path = path.clone();
        }

        let prompt_id = match PromptId::new(self.prompt_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("❌ Invalid prompt ID: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };
        let document_id = match DocumentId::new(self.document.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("❌ Invalid document ID: {e}");
                return Ok(EXIT_LOAD);
            }
        };

        let document = match load_document(&config, &document_id) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load document");
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        let entities = match self.entities(&config, &prompt_id, &document).await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::error!(error = %e, "Entity detection failed");
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        let redactor = Redactor::new(self.case_sensitive || config.redaction.case_sensitive);
        let output_dir = self
            .output
            .clone()
            .unwrap_or_else(|| config.redaction.output_dir.clone());
        let save_stats = config.redaction.save_stats && !self.no_stats;

        let written = redactor
            .redact(document.text(), &entities)
            .and_then(|result| {
                write_redaction(&output_dir, &document_id, &prompt_id, &result, save_stats)
                    .map(|output| (result, output))
            });
        let (result, output) = match written {
            Ok(written) => written,
            Err(e) => {
                tracing::error!(error = %e, "Redaction failed");
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        println!("✅ Redacted '{}' with prompt {}", document_id, prompt_id);
        println!("  Entities detected: {}", entities.len());
        println!("  Replacements: {}", result.total);
        for (label, count) in &result.stats {
            println!("    {label}: {count}");
        }
        println!("  Redacted text: {}", output.text_path.display());
        if let Some(path) = &output.stats_path {
            println!("  Statistics: {}", path.display());
        }
        Ok(0)
    }

    async fn entities(
        &self,
        config: &PiiEvalConfig,
        prompt_id: &PromptId,
        document: &Document,
    ) -> Result<Vec<PiiEntity>> {
        if let Some(path) = &self.predictions {
            tracing::info!(path = %path.display(), "Using saved predictions");
            let predictions = read_predictions(path)?;
            return entities_from_predictions(&predictions, document.id());
        }

        let prompts = PromptStore::load(config.prompts.variants_path.as_deref())?;
        prompts.get(prompt_id)?.validate()?;
        let client = create_model_client(&config.model)?;
        detect_entities(client.as_ref(), &prompts, prompt_id, document).await
    }
}

fn load_document(config: &PiiEvalConfig, document_id: &DocumentId) -> Result<Document> {
    let source = DocumentSource::detect(&config.data.documents_path, config.data.sheet.as_deref())?;
    let documents = select_documents(load_documents(&source)?, std::slice::from_ref(document_id))?;
    documents
        .into_iter()
        .next()
        .ok_or_else(|| crate::domain::PiiEvalError::Load(format!("Document '{document_id}' not found")))
}
