//! Scoring model detections against ground truth
//!
//! - [`metrics`] - entity matching and precision/recall/F1
//! - [`record`] - one record per (document, prompt) pair
//! - [`summary`] - per-prompt aggregation and the run report
//! - [`runner`] - the sequential batch over prompts and documents

pub mod metrics;
pub mod record;
pub mod runner;
pub mod summary;

pub use metrics::{match_entities, normalize, CategoryMetrics, Counts, MatchResult, Scores};
pub use record::{EvaluationRecord, RecordStatus};
pub use runner::{select_documents, EvaluationRunner};
pub use summary::{FailedPrompt, PromptSummary, RunReport};
