//! Ground-truth label formats
//!
//! Two on-disk shapes are understood for each document entry of the
//! ground-truth JSON:
//!
//! ```json
//! {
//!   "Test A": {"Name": ["John Smith"], "Address": ["123 Main St."]},
//!   "Test B": [{"text": "Jane Doe", "category": "Name", "start": 0, "end": 8}]
//! }
//! ```
//!
//! The category-map shape is what [`parse_label_text`] produces from the raw
//! `Test X` / `###Category #Value` label document.

use crate::domain::{DocumentId, PiiCategory, PiiEntity, PiiEvalError, Result, Span};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Category → values for one document
pub type CategoryMap = BTreeMap<PiiCategory, Vec<String>>;

/// Document → category map, as written by `parse-labels`
pub type LabelMap = BTreeMap<DocumentId, CategoryMap>;

/// Ground truth keyed by document
pub type GroundTruth = BTreeMap<DocumentId, Vec<PiiEntity>>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LabelledEntity {
    #[serde(alias = "value")]
    text: String,
    #[serde(alias = "type")]
    category: String,
    #[serde(default, alias = "start_index")]
    start: Option<usize>,
    #[serde(default, alias = "end_index")]
    end: Option<usize>,
}

/// Read and parse the ground-truth JSON file
///
/// # Errors
///
/// Returns `PiiEvalError::Load` if the file is missing, is not JSON, or any
/// entry is malformed (unknown category, blank text, bad span).
pub fn load_ground_truth(path: &Path) -> Result<GroundTruth> {
    if !path.exists() {
        return Err(PiiEvalError::Load(format!(
            "Ground-truth file not found: {}",
            path.display()
        )));
    }
    let contents = fs::read_to_string(path).map_err(|e| {
        PiiEvalError::Load(format!(
            "Failed to read ground-truth file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_ground_truth(&contents)
}

/// Parse ground-truth JSON text
pub fn parse_ground_truth(contents: &str) -> Result<GroundTruth> {
    let root: BTreeMap<String, Value> = serde_json::from_str(contents)
        .map_err(|e| PiiEvalError::Load(format!("Ground truth is not a JSON object: {e}")))?;

    let mut ground_truth = GroundTruth::new();
    for (key, entry) in root {
        let document_id = DocumentId::new(&key)
            .map_err(|e| PiiEvalError::Load(format!("Invalid ground-truth key '{key}': {e}")))?;
        let entities = parse_entry(&document_id, entry)?;
        if ground_truth.insert(document_id.clone(), entities).is_some() {
            return Err(PiiEvalError::Load(format!(
                "Duplicate ground-truth entry for '{document_id}'"
            )));
        }
    }
    Ok(ground_truth)
}

fn parse_entry(document_id: &DocumentId, entry: Value) -> Result<Vec<PiiEntity>> {
    let malformed = |reason: String| {
        PiiEvalError::Load(format!(
            "Malformed ground truth for '{document_id}': {reason}"
        ))
    };

    match entry {
        Value::Object(map) => {
            let mut entities = Vec::new();
            for (key, values) in map {
                let category: PiiCategory = key.parse().map_err(malformed)?;
                let values: Vec<String> = serde_json::from_value(values).map_err(|e| {
                    malformed(format!("values for '{key}' must be a list of strings: {e}"))
                })?;
                for value in values {
                    entities.push(PiiEntity::new(value, category).map_err(malformed)?);
                }
            }
            Ok(entities)
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                let labelled: LabelledEntity = serde_json::from_value(item)
                    .map_err(|e| malformed(format!("invalid entity record: {e}")))?;
                let category: PiiCategory = labelled.category.parse().map_err(malformed)?;
                let entity = PiiEntity::new(labelled.text, category).map_err(malformed)?;
                match (labelled.start, labelled.end) {
                    (Some(start), Some(end)) => {
                        Ok(entity.with_span(Span::new(start, end).map_err(malformed)?))
                    }
                    (None, None) => Ok(entity),
                    _ => Err(malformed("span needs both start and end".to_string())),
                }
            })
            .collect(),
        other => Err(malformed(format!(
            "expected a category map or an entity list, found {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse the raw label document into a [`LabelMap`]
///
/// The input is a sequence of blocks, each headed by a `Test X` line and
/// followed by `###Category #Value` lines. Category names are matched
/// leniently, so `###Na   me #Orval` is a `Name`.
///
/// # Errors
///
/// Returns `PiiEvalError::Load` for an unknown category or a label line
/// that appears before any `Test` header.
///
/// # Example
///
/// ```
/// use pii_eval::core::loader::parse_label_text;
///
/// let labels = parse_label_text("Test A\n###Name #John Smith\n###Address #123 Main St.\n").unwrap();
/// assert_eq!(labels.len(), 1);
/// ```
pub fn parse_label_text(raw: &str) -> Result<LabelMap> {
    let header = Regex::new(r"^\s*(Test\s+[A-Za-z0-9]+)\s*$")
        .map_err(|e| PiiEvalError::Load(format!("Invalid label header pattern: {e}")))?;
    let entity = Regex::new(r"^\s*#+\s*([A-Za-z_ ]+?)\s*#\s*(.+?)\s*$")
        .map_err(|e| PiiEvalError::Load(format!("Invalid label entity pattern: {e}")))?;

    let mut labels = LabelMap::new();
    let mut current: Option<DocumentId> = None;

    for (index, line) in raw.lines().enumerate() {
        if let Some(caps) = header.captures(line) {
            let name = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
            let document_id = DocumentId::new(name).map_err(PiiEvalError::Load)?;
            labels.entry(document_id.clone()).or_default();
            current = Some(document_id);
            continue;
        }

        let Some(caps) = entity.captures(line) else {
            continue;
        };

        let Some(document_id) = current.as_ref() else {
            return Err(PiiEvalError::Load(format!(
                "Label on line {} appears before any 'Test' header",
                index + 1
            )));
        };

        let category: PiiCategory = caps[1].parse().map_err(|e| {
            PiiEvalError::Load(format!("Line {} of label document: {}", index + 1, e))
        })?;
        if let Some(block) = labels.get_mut(document_id) {
            block
                .entry(category)
                .or_default()
                .push(caps[2].to_string());
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_map_entry() {
        let json = r#"{"Test A": {"Name": ["John Smith"], "Address": ["123 Main St."]}}"#;
        let gt = parse_ground_truth(json).unwrap();
        let entities = &gt[&DocumentId::new("Test A").unwrap()];
        assert_eq!(entities.len(), 2);
        assert!(entities
            .iter()
            .any(|e| e.text == "John Smith" && e.category == PiiCategory::Name));
    }

    #[test]
    fn test_parse_entity_list_entry_with_span() {
        let json = r#"{"Test B": [{"text": "Jane Doe", "category": "name", "start": 0, "end": 8}]}"#;
        let gt = parse_ground_truth(json).unwrap();
        let entity = &gt[&DocumentId::new("Test B").unwrap()][0];
        assert_eq!(entity.category, PiiCategory::Name);
        assert_eq!(entity.span, Some(Span { start: 0, end: 8 }));
    }

    #[test]
    fn test_unknown_category_is_load_error() {
        let json = r#"{"Test A": {"Shoe_Size": ["42"]}}"#;
        let err = parse_ground_truth(json).unwrap_err();
        assert!(matches!(err, PiiEvalError::Load(_)));
        assert!(err.to_string().contains("Test A"));
    }

    #[test]
    fn test_blank_entity_text_is_load_error() {
        let json = r#"{"Test A": {"Name": ["  "]}}"#;
        assert!(parse_ground_truth(json).is_err());
    }

    #[test]
    fn test_scalar_entry_is_load_error() {
        let json = r#"{"Test A": "John Smith"}"#;
        let err = parse_ground_truth(json).unwrap_err();
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn test_half_span_is_load_error() {
        let json = r#"{"Test A": [{"text": "John", "category": "Name", "start": 3}]}"#;
        assert!(parse_ground_truth(json).is_err());
    }

    #[test]
    fn test_parse_label_text_blocks() {
        let raw = "Test A\n###Name #Orval O'Riocht\n###Na   me #Mr. Shingali\n###PPS_Number #8472639T\n\nTest B\n###Email_Address # jane@example.ie\n";
        let labels = parse_label_text(raw).unwrap();

        let a = &labels[&DocumentId::new("Test A").unwrap()];
        assert_eq!(
            a[&PiiCategory::Name],
            vec!["Orval O'Riocht".to_string(), "Mr. Shingali".to_string()]
        );
        assert_eq!(a[&PiiCategory::PpsNumber], vec!["8472639T".to_string()]);

        let b = &labels[&DocumentId::new("Test B").unwrap()];
        assert_eq!(b[&PiiCategory::EmailAddress], vec!["jane@example.ie".to_string()]);
    }

    #[test]
    fn test_parse_label_text_output_loads_as_ground_truth() {
        let labels = parse_label_text("Test A\n###Name #John Smith\n").unwrap();
        let json = serde_json::to_string(&labels).unwrap();
        let gt = parse_ground_truth(&json).unwrap();
        assert_eq!(gt[&DocumentId::new("Test A").unwrap()][0].text, "John Smith");
    }

    #[test]
    fn test_label_before_header_is_error() {
        assert!(parse_label_text("###Name #John\nTest A\n").is_err());
    }

    #[test]
    fn test_unknown_label_category_is_error() {
        let err = parse_label_text("Test A\n###Shoe_Size #42\n").unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }
}
