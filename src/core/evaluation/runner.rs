//! Batch evaluation runner
//!
//! Runs every selected prompt over every selected document, one model call
//! at a time, and writes the per-prompt predictions and metrics files plus
//! the cross-prompt comparison.

use super::record::{EvaluationRecord, RecordStatus};
use super::summary::{FailedPrompt, PromptSummary, RunReport};
use crate::adapters::llm::ModelClient;
use crate::core::prompts::{PromptStore, PromptVariant};
use crate::core::results::{
    metrics_file_name, predictions_file_name, write_json, PredictionEntry, Predictions,
    COMPARISON_FILE,
};
use crate::core::validation::{validate_output, ValidationOutcome};
use crate::domain::{Document, DocumentId, PiiEvalError, PromptId, Result};
use crate::logging::fingerprint;
use crate::{log_pair_failure, log_pair_start};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Restrict `documents` to `ids`, keeping the order of `ids`
///
/// An empty selection keeps every document; a repeated id is selected once.
///
/// # Errors
///
/// Returns `PiiEvalError::Load` for an id that is not in `documents`.
pub fn select_documents(documents: Vec<Document>, ids: &[DocumentId]) -> Result<Vec<Document>> {
    if ids.is_empty() {
        return Ok(documents);
    }

    let mut by_id: BTreeMap<DocumentId, Document> = documents
        .into_iter()
        .map(|d| (d.id().clone(), d))
        .collect();
    let mut selected = Vec::with_capacity(ids.len());
    for id in dedup_in_order(ids) {
        let document = by_id.remove(&id).ok_or_else(|| {
            PiiEvalError::Load(format!("Document '{id}' not found in the corpus"))
        })?;
        selected.push(document);
    }
    Ok(selected)
}

/// First occurrence of each id, in input order
fn dedup_in_order<T: Clone + Ord>(ids: &[T]) -> Vec<T> {
    let mut seen = BTreeSet::new();
    ids.iter()
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect()
}

/// Sequential (prompt × document) evaluation
pub struct EvaluationRunner {
    client: Arc<dyn ModelClient>,
    prompts: PromptStore,
    case_sensitive: bool,
    results_dir: PathBuf,
}

/// Output of one prompt over the corpus
struct PromptOutcome {
    records: Vec<EvaluationRecord>,
    predictions: Predictions,
}

impl EvaluationRunner {
    pub fn new(
        client: Arc<dyn ModelClient>,
        prompts: PromptStore,
        case_sensitive: bool,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            prompts,
            case_sensitive,
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Evaluate `prompt_ids` (all prompts when empty) over `documents`
    ///
    /// Prompts run in the given order, each id once. Template errors skip
    /// the prompt; model and validation failures score the pair as zero.
    /// Neither aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the comparison file cannot be written.
    pub async fn run(&self, documents: &[Document], prompt_ids: &[PromptId]) -> Result<RunReport> {
        let start_time = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let prompt_ids = if prompt_ids.is_empty() {
            self.prompts.ids()
        } else {
            dedup_in_order(prompt_ids)
        };

        tracing::info!(
            run_id = %run_id,
            model = self.client.model_name(),
            prompts = prompt_ids.len(),
            documents = documents.len(),
            "Starting evaluation"
        );

        let mut report = RunReport::new(run_id, documents.len());
        let mut comparison = Vec::with_capacity(prompt_ids.len());

        for prompt_id in &prompt_ids {
            let variant = match self
                .prompts
                .get(prompt_id)
                .and_then(|v| v.validate().map(|_| v))
            {
                Ok(variant) => variant,
                Err(e) => {
                    tracing::error!(prompt_id = %prompt_id, error = %e, "Skipping prompt");
                    report.failed_prompts.push(FailedPrompt {
                        prompt_id: prompt_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            tracing::info!(prompt_id = %prompt_id, "Evaluating prompt");
            let outcome = match self.evaluate_prompt(variant, documents).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(prompt_id = %prompt_id, error = %e, "Skipping prompt");
                    report.failed_prompts.push(FailedPrompt {
                        prompt_id: prompt_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let summary = PromptSummary::from_records(prompt_id.clone(), &outcome.records);
            summary.log_summary();

            if let Err(e) = self.write_prompt_files(&report.run_id, variant, &outcome, &summary) {
                tracing::error!(
                    prompt_id = %prompt_id,
                    error = %e,
                    "Failed to write prompt results"
                );
                report.failed_prompts.push(FailedPrompt {
                    prompt_id: prompt_id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }

            comparison.push((
                prompt_id.clone(),
                ComparisonEntry {
                    prompt_preview: variant.preview(),
                    description: variant.description.clone(),
                    total_documents_processed: summary.documents,
                    metrics: summary.clone(),
                },
            ));
            report.summaries.push(summary);
        }

        self.write_comparison(&report, PromptComparison(comparison))?;

        let report = report.with_duration(start_time.elapsed());
        report.log_summary();
        Ok(report)
    }

    /// Run one prompt over the corpus
    ///
    /// A render failure is a template error for the whole prompt and is
    /// returned; model and validation failures are recorded per document.
    async fn evaluate_prompt(
        &self,
        variant: &PromptVariant,
        documents: &[Document],
    ) -> Result<PromptOutcome> {
        let mut outcome = PromptOutcome {
            records: Vec::with_capacity(documents.len()),
            predictions: Predictions::new(),
        };

        for document in documents {
            let (record, prediction) = self.evaluate_pair(variant, document).await?;
            outcome.records.push(record);
            outcome
                .predictions
                .insert(document.id().clone(), prediction);
        }
        Ok(outcome)
    }

    async fn evaluate_pair(
        &self,
        variant: &PromptVariant,
        document: &Document,
    ) -> Result<(EvaluationRecord, PredictionEntry)> {
        let prompt_id = &variant.id;
        let rendered = variant.render(document.text())?;
        log_pair_start!(document.id(), prompt_id);

        let raw = match self.client.generate(&rendered).await {
            Ok(raw) => raw,
            Err(e) => {
                return Ok(self.failure(document, prompt_id, RecordStatus::ModelError, e, None))
            }
        };

        let pair = match validate_output(&raw) {
            ValidationOutcome::Valid(entities) => {
                tracing::debug!(
                    document_id = %document.id(),
                    prompt_id = %prompt_id,
                    detected = entities.len(),
                    response_digest = %fingerprint(&raw),
                    "Model output accepted"
                );
                let record =
                    EvaluationRecord::scored(document, prompt_id, &entities, self.case_sensitive);
                (record, PredictionEntry::scored(entities))
            }
            ValidationOutcome::Invalid { reason } => self.failure(
                document,
                prompt_id,
                RecordStatus::InvalidOutput,
                reason,
                Some(raw),
            ),
        };
        Ok(pair)
    }

    fn failure(
        &self,
        document: &Document,
        prompt_id: &PromptId,
        status: RecordStatus,
        reason: impl ToString,
        raw_response: Option<String>,
    ) -> (EvaluationRecord, PredictionEntry) {
        let reason = reason.to_string();
        log_pair_failure!(document.id(), prompt_id, status.as_str(), reason);

        let prediction = match raw_response {
            Some(raw) => PredictionEntry::invalid_output(reason.clone(), raw),
            None => PredictionEntry::model_error(reason.clone()),
        };
        (
            EvaluationRecord::failed(document, prompt_id, status, reason),
            prediction,
        )
    }

    fn write_prompt_files(
        &self,
        run_id: &str,
        variant: &PromptVariant,
        outcome: &PromptOutcome,
        summary: &PromptSummary,
    ) -> Result<()> {
        write_json(
            &self.results_dir,
            &predictions_file_name(&variant.id),
            &outcome.predictions,
        )?;

        let metrics = PromptMetricsFile {
            run_id,
            prompt_id: &variant.id,
            description: &variant.description,
            prompt_content: &variant.template,
            model: self.client.model_name(),
            summary,
            documents: &outcome.records,
            total_documents: summary.documents,
            successful_documents: summary.scored,
            failed_documents: summary.failures,
            evaluation_timestamp: Utc::now(),
        };
        let path = write_json(&self.results_dir, &metrics_file_name(&variant.id), &metrics)?;
        tracing::info!(path = %path.display(), "Saved prompt metrics");
        Ok(())
    }

    fn write_comparison(
        &self,
        report: &RunReport,
        prompts_comparison: PromptComparison,
    ) -> Result<()> {
        let comparison = ComparisonFile {
            metadata: ComparisonMetadata {
                run_id: &report.run_id,
                generated_at: Utc::now(),
                total_prompts_tested: prompts_comparison.0.len(),
                model_used: self.client.model_name(),
                total_documents: report.total_documents,
            },
            prompts_comparison,
            failed_prompts: &report.failed_prompts,
        };
        let path = write_json(&self.results_dir, COMPARISON_FILE, &comparison)?;
        tracing::info!(path = %path.display(), "Saved prompt comparison");
        Ok(())
    }
}

#[derive(Serialize)]
struct PromptMetricsFile<'a> {
    run_id: &'a str,
    prompt_id: &'a PromptId,
    description: &'a str,
    prompt_content: &'a str,
    model: &'a str,
    summary: &'a PromptSummary,
    documents: &'a [EvaluationRecord],
    total_documents: usize,
    successful_documents: usize,
    failed_documents: usize,
    evaluation_timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ComparisonEntry {
    prompt_preview: String,
    description: String,
    metrics: PromptSummary,
    total_documents_processed: usize,
}

#[derive(Serialize)]
struct ComparisonMetadata<'a> {
    run_id: &'a str,
    generated_at: DateTime<Utc>,
    total_prompts_tested: usize,
    model_used: &'a str,
    total_documents: usize,
}

/// Comparison entries, written as a JSON object in evaluation order
struct PromptComparison(Vec<(PromptId, ComparisonEntry)>);

impl Serialize for PromptComparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(id, entry)| (id, entry)))
    }
}

#[derive(Serialize)]
struct ComparisonFile<'a> {
    metadata: ComparisonMetadata<'a>,
    prompts_comparison: PromptComparison,
    failed_prompts: &'a [FailedPrompt],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PiiCategory, PiiEntity};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Replays canned responses in call order
    struct ScriptedClient {
        responses: Mutex<Vec<Result<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(mut responses: Vec<Result<String>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(r#"{"entities": []}"#.to_string()))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn doc(id: &str) -> Document {
        Document::new(
            DocumentId::new(id).unwrap(),
            "Contact John Smith at 123 Main St.",
            vec![
                PiiEntity::new("John Smith", PiiCategory::Name).unwrap(),
                PiiEntity::new("123 Main St.", PiiCategory::Address).unwrap(),
            ],
        )
    }

    const EXACT: &str = r#"{"entities": [{"text": "John Smith", "category": "Name"}, {"text": "123 Main St.", "category": "Address"}]}"#;

    #[tokio::test]
    async fn test_run_scores_and_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(EXACT.to_string()),
            Ok("I could not find anything".to_string()),
        ]));
        let runner = EvaluationRunner::new(client, PromptStore::builtin(), false, dir.path());

        let docs = vec![doc("Test A"), doc("Test B")];
        let report = runner
            .run(&docs, &[PromptId::new("v1").unwrap()])
            .await
            .unwrap();

        assert_eq!(report.summaries.len(), 1);
        let summary = &report.summaries[0];
        assert_eq!(summary.failures, 1);
        assert!((summary.macro_average.f1 - 0.5).abs() < 1e-9);
        assert!(!report.is_successful());

        assert!(dir.path().join("predictions_prompt_v1.json").exists());
        assert!(dir.path().join("metrics_prompt_v1.json").exists());
        assert!(dir.path().join(COMPARISON_FILE).exists());
    }

    #[tokio::test]
    async fn test_model_error_scores_zero() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(ScriptedClient::new(vec![Err(PiiEvalError::Model(
            crate::domain::ModelError::ClientError {
                status: 400,
                message: "bad request".to_string(),
            },
        ))]));
        let runner = EvaluationRunner::new(client, PromptStore::builtin(), false, dir.path());

        let report = runner
            .run(&[doc("Test A")], &[PromptId::new("v2").unwrap()])
            .await
            .unwrap();
        let summary = &report.summaries[0];
        assert_eq!(summary.counts.false_negatives, 2);
        assert_eq!(summary.macro_average.f1, 0.0);

        let predictions = crate::core::results::read_predictions(
            &dir.path().join("predictions_prompt_v2.json"),
        )
        .unwrap();
        let entry = &predictions[&DocumentId::new("Test A").unwrap()];
        assert_eq!(entry.status, RecordStatus::ModelError);
    }

    #[tokio::test]
    async fn test_bad_template_skips_prompt_only() {
        let dir = TempDir::new().unwrap();
        let mut prompts = PromptStore::builtin();
        prompts
            .extend_from_toml(
                r#"
[[prompts]]
id = "broken"
template = "no placeholders here"
"#,
            )
            .unwrap();
        let client = Arc::new(ScriptedClient::new(vec![Ok(EXACT.to_string())]));
        let runner = EvaluationRunner::new(client.clone(), prompts, false, dir.path());

        let report = runner
            .run(
                &[doc("Test A")],
                &[PromptId::new("broken").unwrap(), PromptId::new("v1").unwrap()],
            )
            .await
            .unwrap();

        assert_eq!(report.failed_prompts.len(), 1);
        assert_eq!(report.failed_prompts[0].prompt_id.as_str(), "broken");
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].macro_average.f1, 1.0);
        assert!(!dir.path().join("metrics_prompt_broken.json").exists());
        assert!(!dir.path().join("predictions_prompt_broken.json").exists());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_repeated_prompt_id_runs_once() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(ScriptedClient::new(vec![]));
        let runner =
            EvaluationRunner::new(client.clone(), PromptStore::builtin(), false, dir.path());

        let v1 = PromptId::new("v1").unwrap();
        let v3 = PromptId::new("v3").unwrap();
        let report = runner
            .run(
                &[doc("Test A"), doc("Test B")],
                &[v3.clone(), v1.clone(), v3.clone()],
            )
            .await
            .unwrap();

        let order: Vec<&PromptId> = report.summaries.iter().map(|s| &s.prompt_id).collect();
        assert_eq!(order, vec![&v3, &v1]);
        assert_eq!(client.calls(), 4);
    }

    #[tokio::test]
    async fn test_comparison_keeps_evaluation_order() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(ScriptedClient::new(vec![]));
        let runner = EvaluationRunner::new(client, PromptStore::builtin(), false, dir.path());

        let ids: Vec<PromptId> = ["v4", "v2", "v3"]
            .iter()
            .map(|id| PromptId::new(*id).unwrap())
            .collect();
        runner.run(&[doc("Test A")], &ids).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join(COMPARISON_FILE)).unwrap();
        let positions: Vec<usize> = ["\"v4\": {", "\"v2\": {", "\"v3\": {"]
            .iter()
            .map(|key| written.find(key).unwrap())
            .collect();
        assert!(positions[0] < positions[1] && positions[1] < positions[2]);
    }

    #[test]
    fn test_select_documents() {
        let docs = vec![doc("Test A"), doc("Test B"), doc("Test C")];
        let ids = vec![DocumentId::new("Test C").unwrap(), DocumentId::new("Test A").unwrap()];
        let selected = select_documents(docs.clone(), &ids).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id().as_str(), "Test C");

        assert_eq!(select_documents(docs.clone(), &[]).unwrap().len(), 3);

        let err = select_documents(docs, &[DocumentId::new("Test Z").unwrap()]).unwrap_err();
        assert!(matches!(err, PiiEvalError::Load(_)));
    }

    #[test]
    fn test_select_documents_repeated_id() {
        let docs = vec![doc("Test A"), doc("Test B")];
        let ids = vec![
            DocumentId::new("Test B").unwrap(),
            DocumentId::new("Test A").unwrap(),
            DocumentId::new("Test B").unwrap(),
        ];
        let selected = select_documents(docs, &ids).unwrap();
        let selected: Vec<&str> = selected.iter().map(|d| d.id().as_str()).collect();
        assert_eq!(selected, vec!["Test B", "Test A"]);
    }
}
