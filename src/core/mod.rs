//! Core business logic for pii-eval.
//!
//! # Modules
//!
//! - [`loader`] - Documents and ground-truth labels
//! - [`prompts`] - Prompt variants and rendering
//! - [`validation`] - Decoding model output into entities
//! - [`evaluation`] - Matching, metrics and the batch runner
//! - [`redaction`] - Placeholder substitution for single documents
//! - [`results`] - Files written under the results directory
//!
//! # Evaluation Workflow
//!
//! 1. **Load**: Read and clean documents, attach ground truth
//! 2. **Render**: Substitute each document into each prompt variant
//! 3. **Generate**: Call the model once per (document, prompt) pair
//! 4. **Validate**: Accept or reject the response as a whole
//! 5. **Score**: Precision, recall and F1 against ground truth
//! 6. **Report**: Per-prompt metrics and a cross-prompt comparison
//!
//! # Example
//!
//! ```rust,no_run
//! use pii_eval::adapters::llm::create_model_client;
//! use pii_eval::config::load_config;
//! use pii_eval::core::evaluation::EvaluationRunner;
//! use pii_eval::core::loader::{load_corpus, DocumentSource};
//! use pii_eval::core::prompts::PromptStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pii-eval.toml")?;
//!
//! let source = DocumentSource::detect(&config.data.documents_path, config.data.sheet.as_deref())?;
//! let documents = load_corpus(&source, &config.data.ground_truth_path)?;
//!
//! let client = create_model_client(&config.model)?;
//! let prompts = PromptStore::load(config.prompts.variants_path.as_deref())?;
//! let runner = EvaluationRunner::new(client, prompts, false, "results");
//!
//! let report = runner.run(&documents, &[]).await?;
//! if let Some(best) = report.best() {
//!     println!("Best prompt: {} (F1 {:.3})", best.prompt_id, best.macro_average.f1);
//! }
//! # Ok(())
//! # }
//! ```

pub mod evaluation;
pub mod loader;
pub mod prompts;
pub mod redaction;
pub mod results;
pub mod validation;
