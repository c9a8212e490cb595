//! End-to-end evaluation against a mocked Gemini endpoint

use mockito::{Matcher, Server};
use pii_eval::adapters::llm::GeminiClient;
use pii_eval::config::{secret_string, ModelConfig, RetryConfig};
use pii_eval::core::evaluation::EvaluationRunner;
use pii_eval::core::loader::{load_corpus, DocumentSource};
use pii_eval::core::prompts::PromptStore;
use pii_eval::core::results::read_predictions;
use pii_eval::domain::{DocumentId, PromptId};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const ENDPOINT_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn model_config(base_url: &str) -> ModelConfig {
    ModelConfig {
        base_url: base_url.to_string(),
        api_key: Some(secret_string("test-key".to_string())),
        retry: RetryConfig {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ..ModelConfig::default()
    }
}

fn candidate_body(text: &str) -> String {
    json!({
        "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]
    })
    .to_string()
}

/// Two documents with their ground truth, as JSON files
fn write_corpus(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let documents = dir.join("documents.json");
    fs::write(
        &documents,
        json!([
            {"name": "Test A", "content": "Contact **John Smith** at 123 Main St."},
            {"name": "Test B", "content": "[Par-1a2b]: Signed by Mary Byrne for Acme Holdings Ltd."}
        ])
        .to_string(),
    )
    .unwrap();

    let ground_truth = dir.join("parsed_data.json");
    fs::write(
        &ground_truth,
        json!({
            "Test A": {"Name": ["John Smith"], "Address": ["123 Main St."]},
            "Test B": {"Name": ["Mary Byrne"], "Company_Name": ["Acme Holdings Ltd"]}
        })
        .to_string(),
    )
    .unwrap();

    (documents, ground_truth)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_evaluation_writes_results_and_isolates_invalid_output() {
    let data_dir = TempDir::new().unwrap();
    let results_dir = TempDir::new().unwrap();
    let (documents_path, ground_truth_path) = write_corpus(data_dir.path());

    let source = DocumentSource::detect(&documents_path, None).unwrap();
    let documents = load_corpus(&source, &ground_truth_path).unwrap();
    assert_eq!(documents[0].text(), "Contact John Smith at 123 Main St.");

    let mut server = Server::new_async().await;
    let exact = server
        .mock("POST", ENDPOINT_PATH)
        .match_body(Matcher::Regex("John Smith".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidate_body(
            r#"{"Name": ["john smith"], "Address": ["123  Main St."], "Email_Address": []}"#,
        ))
        .expect(1)
        .create_async()
        .await;
    let prose = server
        .mock("POST", ENDPOINT_PATH)
        .match_body(Matcher::Regex("Mary Byrne".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidate_body("I found a name and a company."))
        .expect(1)
        .create_async()
        .await;

    let client = Arc::new(GeminiClient::new(model_config(&server.url())).unwrap());
    let runner = EvaluationRunner::new(
        client,
        PromptStore::builtin(),
        false,
        results_dir.path(),
    );

    let report = runner
        .run(&documents, &[PromptId::new("v1").unwrap()])
        .await
        .unwrap();

    exact.assert_async().await;
    prose.assert_async().await;

    let summary = &report.summaries[0];
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.failures, 1);
    assert!((summary.macro_average.precision - 0.5).abs() < 1e-9);
    assert!((summary.macro_average.f1 - 0.5).abs() < 1e-9);
    assert_eq!(summary.counts.true_positives, 2);
    assert_eq!(summary.counts.false_negatives, 2);
    assert!(!report.is_successful());

    let metrics = read_json(&results_dir.path().join("metrics_prompt_v1.json"));
    assert_eq!(metrics["prompt_id"], "v1");
    assert_eq!(metrics["model"], "gemini-2.5-flash");
    assert_eq!(metrics["total_documents"], 2);
    assert_eq!(metrics["failed_documents"], 1);
    assert!(metrics["prompt_content"]
        .as_str()
        .unwrap()
        .contains("{{document}}"));
    assert_eq!(metrics["documents"][0]["status"], "scored");
    assert_eq!(metrics["documents"][0]["f1"], 1.0);
    assert_eq!(metrics["documents"][1]["status"], "invalid_output");
    assert_eq!(metrics["documents"][1]["precision"], 0.0);
    assert_eq!(metrics["documents"][1]["recall"], 0.0);
    assert_eq!(metrics["documents"][1]["f1"], 0.0);

    let predictions =
        read_predictions(&results_dir.path().join("predictions_prompt_v1.json")).unwrap();
    let test_a = &predictions[&DocumentId::new("Test A").unwrap()];
    assert_eq!(test_a.entities.as_ref().unwrap().len(), 2);
    let test_b = &predictions[&DocumentId::new("Test B").unwrap()];
    assert_eq!(
        test_b.raw_response.as_deref(),
        Some("I found a name and a company.")
    );

    let comparison = read_json(&results_dir.path().join("all_prompts_comparison.json"));
    assert_eq!(comparison["metadata"]["total_documents"], 2);
    assert_eq!(comparison["metadata"]["total_prompts_tested"], 1);
    assert_eq!(comparison["metadata"]["model_used"], "gemini-2.5-flash");
    let preview = comparison["prompts_comparison"]["v1"]["prompt_preview"]
        .as_str()
        .unwrap();
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 103);
    assert!(comparison["failed_prompts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_transient_model_error_scores_zero_without_retry() {
    let data_dir = TempDir::new().unwrap();
    let results_dir = TempDir::new().unwrap();
    let (documents_path, ground_truth_path) = write_corpus(data_dir.path());
    let source = DocumentSource::detect(&documents_path, None).unwrap();
    let documents = load_corpus(&source, &ground_truth_path).unwrap();

    let mut server = Server::new_async().await;
    let rejected = server
        .mock("POST", ENDPOINT_PATH)
        .with_status(400)
        .with_body(r#"{"error": {"message": "API key not valid"}}"#)
        .expect(2)
        .create_async()
        .await;

    let client = Arc::new(GeminiClient::new(model_config(&server.url())).unwrap());
    let runner = EvaluationRunner::new(client, PromptStore::builtin(), false, results_dir.path());
    let report = runner
        .run(&documents, &[PromptId::new("v3").unwrap()])
        .await
        .unwrap();

    // One request per document, no retries
    rejected.assert_async().await;

    let summary = &report.summaries[0];
    assert_eq!(summary.failures, 2);
    assert_eq!(summary.macro_average.f1, 0.0);
    assert_eq!(summary.counts.false_negatives, 4);

    let metrics = read_json(&results_dir.path().join("metrics_prompt_v3.json"));
    assert_eq!(metrics["documents"][0]["status"], "model_error");
}

#[tokio::test]
async fn test_unknown_prompt_is_skipped_and_reported() {
    let data_dir = TempDir::new().unwrap();
    let results_dir = TempDir::new().unwrap();
    let (documents_path, ground_truth_path) = write_corpus(data_dir.path());
    let source = DocumentSource::detect(&documents_path, None).unwrap();
    let documents = load_corpus(&source, &ground_truth_path).unwrap();

    let server = Server::new_async().await;
    let client = Arc::new(GeminiClient::new(model_config(&server.url())).unwrap());
    let runner = EvaluationRunner::new(client, PromptStore::builtin(), false, results_dir.path());

    let report = runner
        .run(&documents, &[PromptId::new("v99").unwrap()])
        .await
        .unwrap();

    assert!(report.summaries.is_empty());
    assert_eq!(report.failed_prompts.len(), 1);

    let comparison = read_json(&results_dir.path().join("all_prompts_comparison.json"));
    assert_eq!(comparison["failed_prompts"][0]["prompt_id"], "v99");
    assert!(comparison["failed_prompts"][0]["reason"]
        .as_str()
        .unwrap()
        .contains("Unknown prompt id"));
}

#[test]
fn test_document_without_ground_truth_is_load_error() {
    let data_dir = TempDir::new().unwrap();
    let (documents_path, _) = write_corpus(data_dir.path());
    let partial = data_dir.path().join("partial.json");
    fs::write(&partial, r#"{"Test A": {"Name": ["John Smith"]}}"#).unwrap();

    let source = DocumentSource::detect(&documents_path, None).unwrap();
    let err = load_corpus(&source, &partial).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Test B"));
}

#[tokio::test]
async fn test_comparison_lists_prompts_in_requested_order() {
    let data_dir = TempDir::new().unwrap();
    let results_dir = TempDir::new().unwrap();
    let (documents_path, ground_truth_path) = write_corpus(data_dir.path());
    let source = DocumentSource::detect(&documents_path, None).unwrap();
    let documents = load_corpus(&source, &ground_truth_path).unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", ENDPOINT_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidate_body(r#"{"Name": ["John Smith"]}"#))
        .expect(4)
        .create_async()
        .await;

    let client = Arc::new(GeminiClient::new(model_config(&server.url())).unwrap());
    let runner = EvaluationRunner::new(client, PromptStore::builtin(), false, results_dir.path());
    let report = runner
        .run(
            &documents,
            &[PromptId::new("v3").unwrap(), PromptId::new("v1").unwrap()],
        )
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(report.summaries[0].prompt_id.as_str(), "v3");
    assert_eq!(report.summaries[1].prompt_id.as_str(), "v1");

    let written = fs::read_to_string(results_dir.path().join("all_prompts_comparison.json")).unwrap();
    let v3 = written.find("\"v3\": {").unwrap();
    let v1 = written.find("\"v1\": {").unwrap();
    assert!(v3 < v1);

    let comparison: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(comparison["metadata"]["total_prompts_tested"], 2);
}
