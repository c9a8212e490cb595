//! Model output validation
//!
//! Model output is decoded once, here, into a [`ValidationOutcome`]. A
//! response is accepted only if every record is well formed; one bad record
//! rejects the whole response.
//!
//! Accepted shapes:
//!
//! ```json
//! {"entities": [{"text": "John Smith", "category": "Name"}]}
//! [{"value": "John Smith", "type": "Name", "start_index": 8, "end_index": 18}]
//! {"Name": ["John Smith"], "Address": []}
//! ```

use crate::core::loader::labels::json_kind;
use crate::domain::{PiiCategory, PiiEntity, PiiEvalError, Result, Span};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Result of decoding one model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Every record matched the schema
    Valid(Vec<PiiEntity>),
    /// Response rejected as a whole
    Invalid { reason: String },
}

impl ValidationOutcome {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Convert into the crate `Result`
    ///
    /// # Errors
    ///
    /// `Invalid` becomes `PiiEvalError::Validation`.
    pub fn into_result(self) -> Result<Vec<PiiEntity>> {
        match self {
            Self::Valid(entities) => Ok(entities),
            Self::Invalid { reason } => Err(PiiEvalError::Validation(reason)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityRecord {
    #[serde(alias = "value")]
    text: String,
    #[serde(default, alias = "type")]
    category: Option<String>,
    #[serde(default, alias = "start_index")]
    start: Option<usize>,
    #[serde(default, alias = "end_index")]
    end: Option<usize>,
}

/// Decode raw model text
///
/// # Example
///
/// ```
/// use pii_eval::core::validation::{validate_output, ValidationOutcome};
///
/// let outcome = validate_output(r#"{"entities": [{"text": "John Smith", "category": "Name"}]}"#);
/// assert!(outcome.is_valid());
///
/// let outcome = validate_output("Sorry, I cannot help with that.");
/// assert!(matches!(outcome, ValidationOutcome::Invalid { .. }));
/// ```
pub fn validate_output(raw: &str) -> ValidationOutcome {
    match decode(raw) {
        Ok(entities) => ValidationOutcome::Valid(entities),
        Err(reason) => ValidationOutcome::invalid(reason),
    }
}

fn decode(raw: &str) -> std::result::Result<Vec<PiiEntity>, String> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err("empty response".to_string());
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {e}"))?;

    match value {
        Value::Array(items) => decode_records(items),
        Value::Object(map) if map.contains_key("entities") => decode_envelope(map),
        Value::Object(map) => decode_category_map(map),
        other => Err(format!(
            "expected a JSON object or array, found {}",
            json_kind(&other)
        )),
    }
}

/// Remove a surrounding markdown code fence (```json ... ```)
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn decode_envelope(mut map: Map<String, Value>) -> std::result::Result<Vec<PiiEntity>, String> {
    if let Some(extra) = map.keys().find(|k| k.as_str() != "entities") {
        return Err(format!("unexpected field '{extra}' next to 'entities'"));
    }
    match map.remove("entities") {
        Some(Value::Array(items)) => decode_records(items),
        Some(other) => Err(format!(
            "'entities' must be an array, found {}",
            json_kind(&other)
        )),
        None => Err("missing 'entities'".to_string()),
    }
}

fn decode_records(items: Vec<Value>) -> std::result::Result<Vec<PiiEntity>, String> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let record: EntityRecord = serde_json::from_value(item)
                .map_err(|e| format!("entity {index}: {e}"))?;
            let category = record
                .category
                .as_deref()
                .ok_or_else(|| format!("entity {index}: missing category"))?
                .parse::<PiiCategory>()
                .map_err(|e| format!("entity {index}: {e}"))?;
            build_entity(record, category).map_err(|e| format!("entity {index}: {e}"))
        })
        .collect()
}

fn decode_category_map(map: Map<String, Value>) -> std::result::Result<Vec<PiiEntity>, String> {
    let mut entities = Vec::new();
    for (key, values) in map {
        let category: PiiCategory = key.parse()?;
        let items = match values {
            Value::Array(items) => items,
            other => {
                return Err(format!(
                    "values for '{key}' must be an array, found {}",
                    json_kind(&other)
                ))
            }
        };

        for (index, item) in items.into_iter().enumerate() {
            let entity = match item {
                Value::String(text) => PiiEntity::new(text, category),
                Value::Object(_) => {
                    let record: EntityRecord = serde_json::from_value(item)
                        .map_err(|e| format!("{key}[{index}]: {e}"))?;
                    if let Some(declared) = record.category.as_deref() {
                        let declared: PiiCategory = declared.parse()?;
                        if declared != category {
                            return Err(format!(
                                "{key}[{index}]: declared category {declared} does not match key"
                            ));
                        }
                    }
                    build_entity(record, category)
                }
                other => Err(format!("expected a string or object, found {}", json_kind(&other))),
            }
            .map_err(|e| format!("{key}[{index}]: {e}"))?;
            entities.push(entity);
        }
    }
    Ok(entities)
}

fn build_entity(
    record: EntityRecord,
    category: PiiCategory,
) -> std::result::Result<PiiEntity, String> {
    let entity = PiiEntity::new(record.text, category)?;
    match (record.start, record.end) {
        (Some(start), Some(end)) => Ok(entity.with_span(Span::new(start, end)?)),
        (None, None) => Ok(entity),
        _ => Err("span needs both start and end".to_string()),
    }
}
