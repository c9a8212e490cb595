//! Per-(document, prompt) evaluation records

use super::metrics::{match_entities, CategoryMetrics, Counts, Scores};
use crate::domain::{Document, DocumentId, PiiCategory, PiiEntity, PromptId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a (document, prompt) pair ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Valid model output, scored against ground truth
    Scored,
    /// Model answered but the output failed validation
    InvalidOutput,
    /// Model call failed
    ModelError,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scored => "scored",
            Self::InvalidOutput => "invalid_output",
            Self::ModelError => "model_error",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Scored)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores for one document under one prompt
///
/// Built once by [`EvaluationRecord::scored`] or
/// [`EvaluationRecord::failed`]; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    document_id: DocumentId,
    prompt_id: PromptId,
    status: RecordStatus,
    #[serde(flatten)]
    scores: Scores,
    #[serde(flatten)]
    counts: Counts,
    per_category: BTreeMap<PiiCategory, CategoryMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl EvaluationRecord {
    /// Score valid detections against the document's ground truth
    pub fn scored(
        document: &Document,
        prompt_id: &PromptId,
        detected: &[PiiEntity],
        case_sensitive: bool,
    ) -> Self {
        let matched = match_entities(detected, document.ground_truth(), case_sensitive);
        Self {
            document_id: document.id().clone(),
            prompt_id: prompt_id.clone(),
            status: RecordStatus::Scored,
            scores: matched.counts.scores(),
            counts: matched.counts,
            per_category: matched
                .per_category
                .into_iter()
                .map(|(category, counts)| (category, CategoryMetrics::from(counts)))
                .collect(),
            reason: None,
        }
    }

    /// Zero-score record for a pair whose output could not be used
    ///
    /// Every ground-truth item counts as a false negative.
    pub fn failed(
        document: &Document,
        prompt_id: &PromptId,
        status: RecordStatus,
        reason: impl Into<String>,
    ) -> Self {
        let mut per_category: BTreeMap<PiiCategory, Counts> = BTreeMap::new();
        for entity in document.ground_truth() {
            per_category
                .entry(entity.category)
                .or_default()
                .false_negatives += 1;
        }
        let counts = Counts {
            true_positives: 0,
            false_positives: 0,
            false_negatives: document.ground_truth().len(),
        };
        Self {
            document_id: document.id().clone(),
            prompt_id: prompt_id.clone(),
            status,
            scores: Scores::default(),
            counts,
            per_category: per_category
                .into_iter()
                .map(|(category, counts)| (category, CategoryMetrics::from(counts)))
                .collect(),
            reason: Some(reason.into()),
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn prompt_id(&self) -> &PromptId {
        &self.prompt_id
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn per_category(&self) -> &BTreeMap<PiiCategory, CategoryMetrics> {
        &self.per_category
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
