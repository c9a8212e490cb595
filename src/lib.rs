// pii-eval - PII Detection Prompt Evaluation for Legal Documents
// Copyright (c) 2025 pii-eval Contributors
// Licensed under the MIT License

//! # pii-eval - PII Detection Prompt Evaluation
//!
//! pii-eval measures how well different prompt variants make a hosted large
//! language model find personally identifiable information in legal
//! documents, and redacts documents with the detected entities.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Loading** documents from spreadsheets, text directories or JSON, with
//!   ground-truth labels
//! - **Rendering** prompt variants with the document text and PII taxonomy
//! - **Calling** the Gemini `generateContent` endpoint with retry
//! - **Validating** model output into typed entities
//! - **Scoring** detections with precision, recall and F1
//! - **Redacting** documents with `[LABEL]` placeholders
//!
//! ## Architecture
//!
//! pii-eval follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (loading, prompts, validation, evaluation, redaction)
//! - [`adapters`] - External integrations (Gemini, spreadsheets)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pii_eval::adapters::llm::create_model_client;
//! use pii_eval::config::load_config;
//! use pii_eval::core::evaluation::EvaluationRunner;
//! use pii_eval::core::loader::{load_corpus, DocumentSource};
//! use pii_eval::core::prompts::PromptStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("pii-eval.toml")?;
//!
//!     let source = DocumentSource::detect(&config.data.documents_path, None)?;
//!     let documents = load_corpus(&source, &config.data.ground_truth_path)?;
//!
//!     let runner = EvaluationRunner::new(
//!         create_model_client(&config.model)?,
//!         PromptStore::builtin(),
//!         config.evaluation.case_sensitive,
//!         config.evaluation.results_dir.clone(),
//!     );
//!     let report = runner.run(&documents, &[]).await?;
//!
//!     for summary in &report.summaries {
//!         println!("{}: F1 {:.3}", summary.prompt_id, summary.macro_average.f1);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Redaction
//!
//! ```rust
//! use pii_eval::core::redaction::Redactor;
//! use pii_eval::domain::{PiiCategory, PiiEntity};
//!
//! # fn example() -> pii_eval::domain::Result<()> {
//! let entities = vec![PiiEntity::new("John Smith", PiiCategory::Name).map_err(pii_eval::domain::PiiEvalError::Validation)?];
//! let result = Redactor::new(false).redact("Contact John Smith today", &entities)?;
//! assert_eq!(result.text, "Contact [NAME] today");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The library uses [`domain::PiiEvalError`] for all errors:
//!
//! ```rust,no_run
//! use pii_eval::domain::PiiEvalError;
//!
//! fn example() -> Result<(), PiiEvalError> {
//!     let config = pii_eval::config::load_config("pii-eval.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
