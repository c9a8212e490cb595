//! Integration tests for single-document redaction

use mockito::Server;
use pii_eval::adapters::llm::GeminiClient;
use pii_eval::config::{secret_string, ModelConfig, RetryConfig};
use pii_eval::core::prompts::PromptStore;
use pii_eval::core::redaction::{
    detect_entities, entities_from_predictions, write_redaction, Redactor,
};
use pii_eval::core::results::{read_predictions, write_json, PredictionEntry, Predictions};
use pii_eval::domain::{Document, DocumentId, PiiCategory, PiiEntity, PiiEvalError, PromptId};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn entity(text: &str, category: PiiCategory) -> PiiEntity {
    PiiEntity::new(text, category).unwrap()
}

fn contact_document() -> Document {
    Document::new(
        DocumentId::new("Test A").unwrap(),
        "Contact John Smith at 123 Main St.",
        vec![
            entity("John Smith", PiiCategory::Name),
            entity("123 Main St.", PiiCategory::Address),
        ],
    )
}

#[test]
fn test_redact_and_write_contact_document() {
    let dir = TempDir::new().unwrap();
    let document = contact_document();
    let prompt_id = PromptId::new("v2").unwrap();

    let result = Redactor::new(false)
        .redact(document.text(), document.ground_truth())
        .unwrap();
    assert_eq!(result.text, "Contact [NAME] at [ADDRESS].");
    assert_eq!(result.total, 2);

    let output = write_redaction(dir.path(), document.id(), &prompt_id, &result, true).unwrap();
    assert_eq!(
        output.text_path.file_name().unwrap(),
        "Test_A_v2_redacted.txt"
    );
    assert_eq!(
        fs::read_to_string(&output.text_path).unwrap(),
        "Contact [NAME] at [ADDRESS]."
    );

    let stats: Value =
        serde_json::from_str(&fs::read_to_string(output.stats_path.unwrap()).unwrap()).unwrap();
    assert_eq!(stats["document_name"], "Test A");
    assert_eq!(stats["prompt_id"], "v2");
    assert_eq!(stats["statistics"]["NAME"], 1);
    assert_eq!(stats["statistics"]["ADDRESS"], 1);
    assert_eq!(stats["total_redactions"], 2);
}

#[test]
fn test_entities_absent_from_document_leave_text_unchanged() {
    let dir = TempDir::new().unwrap();
    let document = contact_document();
    let entities = vec![entity("Mary Byrne", PiiCategory::Name)];

    let result = Redactor::default().redact(document.text(), &entities).unwrap();
    assert_eq!(result.text, document.text());

    let output = write_redaction(
        dir.path(),
        document.id(),
        &PromptId::new("v1").unwrap(),
        &result,
        true,
    )
    .unwrap();
    assert!(output.stats_path.is_none());
}

#[test]
fn test_redact_from_saved_predictions() {
    let dir = TempDir::new().unwrap();
    let document = contact_document();

    let mut predictions = Predictions::new();
    predictions.insert(
        document.id().clone(),
        PredictionEntry::scored(vec![
            entity("john smith", PiiCategory::Name),
            entity("123 Main St.", PiiCategory::Address),
        ]),
    );
    predictions.insert(
        DocumentId::new("Test B").unwrap(),
        PredictionEntry::invalid_output("not JSON", "I found a name."),
    );
    let path = write_json(dir.path(), "predictions_prompt_v4.json", &predictions).unwrap();

    let saved = read_predictions(&path).unwrap();
    let entities = entities_from_predictions(&saved, document.id()).unwrap();
    let result = Redactor::new(false).redact(document.text(), &entities).unwrap();
    assert_eq!(result.text, "Contact [NAME] at [ADDRESS].");

    let err = entities_from_predictions(&saved, &DocumentId::new("Test B").unwrap()).unwrap_err();
    assert!(matches!(err, PiiEvalError::Validation(_)));

    let err = entities_from_predictions(&saved, &DocumentId::new("Test C").unwrap()).unwrap_err();
    assert!(matches!(err, PiiEvalError::Load(_)));
}

#[test]
fn test_blank_saved_entity_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("predictions_prompt_v1.json");
    fs::write(
        &path,
        json!({"Test A": {"status": "scored", "entities": [{"text": "  ", "category": "Name"}]}})
            .to_string(),
    )
    .unwrap();

    assert!(matches!(
        read_predictions(&path).unwrap_err(),
        PiiEvalError::Load(_)
    ));
}

#[tokio::test]
async fn test_detect_entities_with_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-2.5-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": {"parts": [{
                        "text": "```json\n{\"Name\": [\"John Smith\"], \"Address\": [\"123 Main St.\"]}\n```"
                    }]},
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = GeminiClient::new(ModelConfig {
        base_url: server.url(),
        api_key: Some(secret_string("test-key".to_string())),
        retry: RetryConfig {
            max_retries: 1,
            initial_delay_ms: 1,
            max_delay_ms: 1,
            backoff_multiplier: 1.0,
        },
        ..ModelConfig::default()
    })
    .unwrap();

    let document = contact_document();
    let entities = detect_entities(
        &client,
        &PromptStore::builtin(),
        &PromptId::new("v1").unwrap(),
        &document,
    )
    .await
    .unwrap();
    mock.assert_async().await;

    let result = Redactor::default().redact(document.text(), &entities).unwrap();
    assert_eq!(result.text, "Contact [NAME] at [ADDRESS].");
}

#[tokio::test]
async fn test_detect_entities_with_unknown_prompt() {
    let server = Server::new_async().await;
    let client = GeminiClient::new(ModelConfig {
        base_url: server.url(),
        api_key: Some(secret_string("test-key".to_string())),
        ..ModelConfig::default()
    })
    .unwrap();

    let err = detect_entities(
        &client,
        &PromptStore::builtin(),
        &PromptId::new("v42").unwrap(),
        &contact_document(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PiiEvalError::Template(_)));
}
