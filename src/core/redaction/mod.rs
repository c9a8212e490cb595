//! Single-document redaction
//!
//! Detected entities come either from a live model call or from a saved
//! `predictions_prompt_<id>.json`. The redacted text is written as
//! `<document>_<prompt>_redacted.txt`, with replacement counts alongside in
//! `<document>_<prompt>_redaction_stats.json`.

pub mod redactor;

pub use redactor::{RedactionResult, Redactor};

use crate::adapters::llm::ModelClient;
use crate::core::prompts::PromptStore;
use crate::core::results::{write_json, Predictions};
use crate::core::validation::validate_output;
use crate::domain::{Document, DocumentId, PiiEntity, PiiEvalError, PromptId, Result};
use crate::logging::fingerprint;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Ask the model for a document's entities under one prompt
///
/// # Errors
///
/// Returns `PiiEvalError::Template` for a bad prompt, the model error for a
/// failed call, and `PiiEvalError::Validation` for unusable output.
pub async fn detect_entities(
    client: &dyn ModelClient,
    prompts: &PromptStore,
    prompt_id: &PromptId,
    document: &Document,
) -> Result<Vec<PiiEntity>> {
    let rendered = prompts.render(prompt_id, document.text())?;
    crate::log_pair_start!(document.id(), prompt_id);

    let raw = client.generate(&rendered).await?;
    tracing::debug!(
        document_id = %document.id(),
        response_digest = %fingerprint(&raw),
        "Received model output"
    );
    validate_output(&raw).into_result()
}

/// Entities for one document from saved predictions
///
/// # Errors
///
/// Returns `PiiEvalError::Load` if the document has no entry and
/// `PiiEvalError::Validation` if its entry was not scored.
pub fn entities_from_predictions(
    predictions: &Predictions,
    document_id: &DocumentId,
) -> Result<Vec<PiiEntity>> {
    let entry = predictions.get(document_id).ok_or_else(|| {
        PiiEvalError::Load(format!("No saved predictions for document '{document_id}'"))
    })?;

    match &entry.entities {
        Some(entities) if !entry.status.is_failure() => Ok(entities.clone()),
        _ => Err(PiiEvalError::Validation(format!(
            "Saved predictions for '{}' are {}: {}",
            document_id,
            entry.status,
            entry.reason.as_deref().unwrap_or("no entities")
        ))),
    }
}

/// Paths written by [`write_redaction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionOutput {
    pub text_path: PathBuf,
    pub stats_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct RedactionStatsFile<'a> {
    document_name: &'a DocumentId,
    prompt_id: &'a PromptId,
    statistics: &'a BTreeMap<String, usize>,
    total_redactions: usize,
}

/// Write the redacted text and, when asked and non-empty, the stats
pub fn write_redaction(
    output_dir: &Path,
    document_id: &DocumentId,
    prompt_id: &PromptId,
    result: &RedactionResult,
    save_stats: bool,
) -> Result<RedactionOutput> {
    fs::create_dir_all(output_dir)?;
    let stem = format!("{}_{}", document_id.file_stem(), prompt_id.file_stem());

    let text_path = output_dir.join(format!("{stem}_redacted.txt"));
    fs::write(&text_path, &result.text)?;
    tracing::info!(path = %text_path.display(), "Saved redacted document");

    let stats_path = if save_stats && result.total > 0 {
        let stats = RedactionStatsFile {
            document_name: document_id,
            prompt_id,
            statistics: &result.stats,
            total_redactions: result.total,
        };
        let path = write_json(output_dir, &format!("{stem}_redaction_stats.json"), &stats)?;
        tracing::info!(path = %path.display(), "Saved redaction statistics");
        Some(path)
    } else {
        None
    };

    Ok(RedactionOutput {
        text_path,
        stats_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::results::PredictionEntry;
    use crate::domain::PiiCategory;
    use tempfile::TempDir;

    fn ids() -> (DocumentId, PromptId) {
        (DocumentId::new("Test A").unwrap(), PromptId::new("v2").unwrap())
    }

    #[test]
    fn test_write_redaction_with_stats() {
        let dir = TempDir::new().unwrap();
        let (doc, prompt) = ids();
        let result = Redactor::default()
            .redact(
                "Contact John Smith",
                &[PiiEntity::new("John Smith", PiiCategory::Name).unwrap()],
            )
            .unwrap();

        let output = write_redaction(dir.path(), &doc, &prompt, &result, true).unwrap();
        assert!(output.text_path.ends_with("Test_A_v2_redacted.txt"));
        assert_eq!(fs::read_to_string(&output.text_path).unwrap(), "Contact [NAME]");

        let stats_path = output.stats_path.unwrap();
        let stats: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(stats_path).unwrap()).unwrap();
        assert_eq!(stats["document_name"], "Test A");
        assert_eq!(stats["statistics"]["NAME"], 1);
        assert_eq!(stats["total_redactions"], 1);
    }

    #[test]
    fn test_no_stats_without_replacements() {
        let dir = TempDir::new().unwrap();
        let (doc, prompt) = ids();
        let result = Redactor::default().redact("Nothing here", &[]).unwrap();
        let output = write_redaction(dir.path(), &doc, &prompt, &result, true).unwrap();
        assert!(output.stats_path.is_none());
    }

    #[test]
    fn test_entities_from_predictions() {
        let (doc, _) = ids();
        let mut predictions = Predictions::new();
        predictions.insert(
            doc.clone(),
            PredictionEntry::scored(vec![PiiEntity::new("John", PiiCategory::Name).unwrap()]),
        );
        assert_eq!(entities_from_predictions(&predictions, &doc).unwrap().len(), 1);

        let missing = DocumentId::new("Test Z").unwrap();
        assert!(matches!(
            entities_from_predictions(&predictions, &missing),
            Err(PiiEvalError::Load(_))
        ));

        predictions.insert(doc.clone(), PredictionEntry::invalid_output("bad", "raw"));
        assert!(matches!(
            entities_from_predictions(&predictions, &doc),
            Err(PiiEvalError::Validation(_))
        ));
    }
}
