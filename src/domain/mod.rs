//! Domain models and types for pii-eval.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DocumentId`], [`PromptId`])
//! - **Domain models** ([`Document`], [`PiiEntity`], [`PiiCategory`])
//! - **Error types** ([`PiiEvalError`], [`ModelError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use pii_eval::domain::{DocumentId, PromptId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let document_id = DocumentId::new("Test A")?;
//! let prompt_id = PromptId::new("v2")?;
//!
//! // This won't compile - the ID types don't mix
//! // let wrong: DocumentId = prompt_id;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod entity;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use document::Document;
pub use entity::{PiiCategory, PiiEntity, Span};
pub use errors::{ModelError, PiiEvalError};
pub use ids::{DocumentId, PromptId};
pub use result::Result;
