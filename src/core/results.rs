//! Result files written under the results directory

use crate::core::evaluation::record::RecordStatus;
use crate::domain::{DocumentId, PiiEntity, PiiEvalError, PromptId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const COMPARISON_FILE: &str = "all_prompts_comparison.json";

/// `predictions_prompt_<id>.json`
pub fn predictions_file_name(prompt_id: &PromptId) -> String {
    format!("predictions_prompt_{}.json", prompt_id.file_stem())
}

/// `metrics_prompt_<id>.json`
pub fn metrics_file_name(prompt_id: &PromptId) -> String {
    format!("metrics_prompt_{}.json", prompt_id.file_stem())
}

/// Model predictions for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub status: RecordStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<PiiEntity>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Kept for invalid output so the response can be inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl PredictionEntry {
    pub fn scored(entities: Vec<PiiEntity>) -> Self {
        Self {
            status: RecordStatus::Scored,
            entities: Some(entities),
            reason: None,
            raw_response: None,
        }
    }

    pub fn invalid_output(reason: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            status: RecordStatus::InvalidOutput,
            entities: None,
            reason: Some(reason.into()),
            raw_response: Some(raw_response.into()),
        }
    }

    pub fn model_error(reason: impl Into<String>) -> Self {
        Self {
            status: RecordStatus::ModelError,
            entities: None,
            reason: Some(reason.into()),
            raw_response: None,
        }
    }
}

/// Predictions of one prompt keyed by document
pub type Predictions = BTreeMap<DocumentId, PredictionEntry>;

/// Read a saved predictions file
///
/// # Errors
///
/// Returns `PiiEvalError::Load` if the file is missing or malformed.
pub fn read_predictions(path: &Path) -> Result<Predictions> {
    let contents = fs::read_to_string(path).map_err(|e| {
        PiiEvalError::Load(format!(
            "Failed to read predictions {}: {}",
            path.display(),
            e
        ))
    })?;
    let predictions: Predictions = serde_json::from_str(&contents).map_err(|e| {
        PiiEvalError::Load(format!(
            "Failed to parse predictions {}: {}",
            path.display(),
            e
        ))
    })?;

    for (document, entry) in &predictions {
        if let Some(blank) = entry
            .entities
            .iter()
            .flatten()
            .find(|e| e.text.trim().is_empty())
        {
            return Err(PiiEvalError::Load(format!(
                "Predictions for '{}' contain a blank {} entity",
                document, blank.category
            )));
        }
    }
    Ok(predictions)
}

/// Pretty-print `value` as JSON into `dir/file_name`, creating `dir`
pub fn write_json<T: Serialize + ?Sized>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "Wrote results file");
    Ok(path)
}
