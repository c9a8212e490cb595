//! External system integrations for pii-eval.
//!
//! - [`llm`] - hosted model client (trait-based, Gemini implementation)
//! - [`spreadsheet`] - workbook reader for document sources
//!
//! Adapters isolate third-party crates (`reqwest`, `calamine`) from the core
//! pipeline so it can be tested with in-process fakes.
//!
//! ```rust,no_run
//! use pii_eval::adapters::llm::create_model_client;
//! use pii_eval::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pii-eval.toml")?;
//! let client = create_model_client(&config.model)?;
//! let raw = client.generate("Find the PII in: ...").await?;
//! # Ok(())
//! # }
//! ```

pub mod llm;
pub mod spreadsheet;
