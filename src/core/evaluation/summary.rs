//! Per-prompt aggregation and run reporting

use super::metrics::{CategoryMetrics, Counts, Scores};
use super::record::EvaluationRecord;
use crate::domain::{PiiCategory, PromptId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Aggregate metrics for one prompt variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSummary {
    pub prompt_id: PromptId,

    /// Documents evaluated, failures included
    pub documents: usize,

    /// Documents whose output was scored
    pub scored: usize,

    /// Documents recorded as invalid output or model error
    pub failures: usize,

    /// Unweighted mean over all documents
    pub macro_average: Scores,

    /// Summed counts across documents
    pub counts: Counts,

    /// Scores from the summed counts
    pub micro_average: Scores,

    pub per_category: BTreeMap<PiiCategory, CategoryMetrics>,
}

impl PromptSummary {
    /// Aggregate the records of one prompt
    ///
    /// An empty slice yields all-zero metrics.
    pub fn from_records(prompt_id: PromptId, records: &[EvaluationRecord]) -> Self {
        let documents = records.len();
        let failures = records.iter().filter(|r| r.status().is_failure()).count();

        let mut macro_average = Scores::default();
        let mut counts = Counts::default();
        let mut category_counts: BTreeMap<PiiCategory, Counts> = BTreeMap::new();

        for record in records {
            let scores = record.scores();
            macro_average.precision += scores.precision;
            macro_average.recall += scores.recall;
            macro_average.f1 += scores.f1;
            counts.add(record.counts());
            for (category, metrics) in record.per_category() {
                category_counts
                    .entry(*category)
                    .or_default()
                    .add(metrics.counts);
            }
        }

        if documents > 0 {
            let n = documents as f64;
            macro_average.precision /= n;
            macro_average.recall /= n;
            macro_average.f1 /= n;
        }

        Self {
            prompt_id,
            documents,
            scored: documents - failures,
            failures,
            macro_average,
            counts,
            micro_average: counts.scores(),
            per_category: category_counts
                .into_iter()
                .map(|(category, counts)| (category, CategoryMetrics::from(counts)))
                .collect(),
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            prompt_id = %self.prompt_id,
            documents = self.documents,
            scored = self.scored,
            failures = self.failures,
            precision = format!("{:.4}", self.macro_average.precision),
            recall = format!("{:.4}", self.macro_average.recall),
            f1 = format!("{:.4}", self.macro_average.f1),
            micro_f1 = format!("{:.4}", self.micro_average.f1),
            "Prompt evaluated"
        );

        if self.failures > 0 {
            tracing::warn!(
                prompt_id = %self.prompt_id,
                failures = self.failures,
                "Prompt evaluated with failed documents"
            );
        }
    }
}

/// A prompt that could not be evaluated at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPrompt {
    pub prompt_id: PromptId,
    pub reason: String,
}

/// Outcome of a whole evaluation batch
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,

    pub total_documents: usize,

    /// Summaries in evaluation order
    pub summaries: Vec<PromptSummary>,

    pub failed_prompts: Vec<FailedPrompt>,

    pub duration: Duration,
}

impl RunReport {
    pub fn new(run_id: impl Into<String>, total_documents: usize) -> Self {
        Self {
            run_id: run_id.into(),
            total_documents,
            summaries: Vec::new(),
            failed_prompts: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Total failed (document, prompt) pairs
    pub fn pair_failures(&self) -> usize {
        self.summaries.iter().map(|s| s.failures).sum()
    }

    /// No failed prompts and no failed pairs
    pub fn is_successful(&self) -> bool {
        self.failed_prompts.is_empty() && self.pair_failures() == 0
    }

    /// Summary with the highest macro F1; earlier prompts win ties
    pub fn best(&self) -> Option<&PromptSummary> {
        self.summaries.iter().fold(None, |best, s| match best {
            Some(b) if b.macro_average.f1 >= s.macro_average.f1 => Some(b),
            _ => Some(s),
        })
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            documents = self.total_documents,
            prompts = self.summaries.len(),
            failed_prompts = self.failed_prompts.len(),
            pair_failures = self.pair_failures(),
            duration_secs = self.duration.as_secs(),
            "Evaluation completed"
        );

        for failed in &self.failed_prompts {
            tracing::warn!(
                prompt_id = %failed.prompt_id,
                reason = %failed.reason,
                "Prompt skipped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluation::record::RecordStatus;
    use crate::domain::{Document, DocumentId, PiiEntity};

    fn doc(id: &str, names: &[&str]) -> Document {
        Document::new(
            DocumentId::new(id).unwrap(),
            names.join(" "),
            names
                .iter()
                .map(|n| PiiEntity::new(*n, PiiCategory::Name).unwrap())
                .collect::<Vec<_>>(),
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_macro_average_includes_failures() {
        let prompt = PromptId::new("v1").unwrap();
        let a = doc("A", &["John Smith"]);
        let b = doc("B", &["Mary Byrne"]);
        let records = vec![
            EvaluationRecord::scored(&a, &prompt, a.ground_truth(), false),
            EvaluationRecord::failed(&b, &prompt, RecordStatus::InvalidOutput, "bad"),
        ];

        let summary = PromptSummary::from_records(prompt, &records);
        assert_eq!(summary.documents, 2);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.scored, 1);
        assert!(close(summary.macro_average.f1, 0.5));
        assert!(close(summary.macro_average.precision, 0.5));
    }

    #[test]
    fn test_micro_average_from_summed_counts() {
        let prompt = PromptId::new("v1").unwrap();
        let a = doc("A", &["John Smith", "Ann Kelly", "Tom Ward"]);
        let b = doc("B", &["Mary Byrne"]);
        let detected_a = vec![PiiEntity::new("John Smith", PiiCategory::Name).unwrap()];
        let records = vec![
            EvaluationRecord::scored(&a, &prompt, &detected_a, false),
            EvaluationRecord::scored(&b, &prompt, b.ground_truth(), false),
        ];

        let summary = PromptSummary::from_records(prompt, &records);
        assert_eq!(
            summary.counts,
            Counts { true_positives: 2, false_positives: 0, false_negatives: 2 }
        );
        assert!(close(summary.micro_average.recall, 0.5));
        // macro recall is the mean of 1/3 and 1
        assert!(close(summary.macro_average.recall, 2.0 / 3.0));
        assert_eq!(summary.per_category[&PiiCategory::Name].counts.true_positives, 2);
    }

    #[test]
    fn test_empty_records() {
        let summary = PromptSummary::from_records(PromptId::new("v1").unwrap(), &[]);
        assert_eq!(summary.documents, 0);
        assert_eq!(summary.macro_average, Scores::default());
    }

    #[test]
    fn test_best_prefers_earlier_on_tie() {
        let mut report = RunReport::new("run", 1);
        for id in ["v1", "v2"] {
            report
                .summaries
                .push(PromptSummary::from_records(PromptId::new(id).unwrap(), &[]));
        }
        assert_eq!(report.best().unwrap().prompt_id.as_str(), "v1");
        assert!(report.is_successful());
    }

    #[test]
    fn test_failed_prompt_marks_report_unsuccessful() {
        let mut report = RunReport::new("run", 0);
        report.failed_prompts.push(FailedPrompt {
            prompt_id: PromptId::new("v9").unwrap(),
            reason: "missing placeholder".to_string(),
        });
        assert!(!report.is_successful());
    }
}
