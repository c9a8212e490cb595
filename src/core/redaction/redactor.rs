//! Placeholder substitution of detected entities

use crate::domain::{PiiCategory, PiiEntity, PiiEvalError, Result};
use regex::RegexBuilder;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Redacted text with replacement counts per label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactionResult {
    pub text: String,
    pub stats: BTreeMap<String, usize>,
    pub total: usize,
}

/// One place in the text where an entity occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Occurrence {
    start: usize,
    end: usize,
    category: PiiCategory,
}

impl Occurrence {
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn overlaps(&self, other: &Occurrence) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Replaces entity occurrences with `[LABEL]`
///
/// When occurrences overlap, the longest wins, then the leftmost, then the
/// earlier category. The output does not depend on the order of the
/// entities passed in.
///
/// # Example
///
/// ```
/// use pii_eval::core::redaction::Redactor;
/// use pii_eval::domain::{PiiCategory, PiiEntity};
///
/// let entities = vec![
///     PiiEntity::new("John Smith", PiiCategory::Name).unwrap(),
///     PiiEntity::new("123 Main St.", PiiCategory::Address).unwrap(),
/// ];
/// let result = Redactor::new(false)
///     .redact("Contact John Smith at 123 Main St.", &entities)
///     .unwrap();
/// assert_eq!(result.text, "Contact [NAME] at [ADDRESS].");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Redactor {
    case_sensitive: bool,
}

impl Redactor {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Redact every occurrence of every entity
    ///
    /// # Errors
    ///
    /// Returns `PiiEvalError::Validation` if an entity's text cannot be
    /// turned into a search pattern.
    pub fn redact(&self, text: &str, entities: &[PiiEntity]) -> Result<RedactionResult> {
        let accepted = self.select(self.occurrences(text, entities)?);

        let mut redacted = String::with_capacity(text.len());
        let mut stats: BTreeMap<String, usize> = BTreeMap::new();
        let mut cursor = 0;

        for occurrence in &accepted {
            redacted.push_str(&text[cursor..occurrence.start]);
            let label = occurrence.category.label();
            redacted.push('[');
            redacted.push_str(label);
            redacted.push(']');
            if keeps_full_stop(text, occurrence) {
                redacted.push('.');
            }
            *stats.entry(label.to_string()).or_default() += 1;
            cursor = occurrence.end;
        }
        redacted.push_str(&text[cursor..]);

        Ok(RedactionResult {
            text: redacted,
            total: accepted.len(),
            stats,
        })
    }

    fn occurrences(&self, text: &str, entities: &[PiiEntity]) -> Result<Vec<Occurrence>> {
        let unique: BTreeSet<(&str, PiiCategory)> = entities
            .iter()
            .map(|e| (e.text.trim(), e.category))
            .filter(|(t, _)| !t.is_empty())
            .collect();

        let mut found = Vec::new();
        for (needle, category) in unique {
            let pattern = RegexBuilder::new(&regex::escape(needle))
                .case_insensitive(!self.case_sensitive)
                .build()
                .map_err(|e| {
                    PiiEvalError::Validation(format!("Cannot search for {category} entity: {e}"))
                })?;
            found.extend(pattern.find_iter(text).map(|m| Occurrence {
                start: m.start(),
                end: m.end(),
                category,
            }));
        }
        Ok(found)
    }

    /// Greedy non-overlapping selection, returned in text order
    fn select(&self, mut candidates: Vec<Occurrence>) -> Vec<Occurrence> {
        candidates.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then(a.start.cmp(&b.start))
                .then(a.category.cmp(&b.category))
        });

        let mut accepted: Vec<Occurrence> = Vec::new();
        for candidate in candidates {
            if !accepted.iter().any(|a| a.overlaps(&candidate)) {
                accepted.push(candidate);
            }
        }
        accepted.sort_by_key(|o| o.start);
        accepted
    }
}

/// An entity ending in `.` at the end of a sentence keeps the full stop
fn keeps_full_stop(text: &str, occurrence: &Occurrence) -> bool {
    if !text[occurrence.start..occurrence.end].ends_with('.') {
        return false;
    }
    let rest = &text[occurrence.end..];
    match rest.chars().next() {
        None | Some('\n') | Some('\r') => true,
        Some(c) if c.is_whitespace() => rest
            .trim_start()
            .chars()
            .next()
            .is_some_and(char::is_uppercase),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(text: &str, category: PiiCategory) -> PiiEntity {
        PiiEntity::new(text, category).unwrap()
    }

    #[test]
    fn test_contact_example() {
        let entities = vec![
            entity("John Smith", PiiCategory::Name),
            entity("123 Main St.", PiiCategory::Address),
        ];
        let result = Redactor::default()
            .redact("Contact John Smith at 123 Main St.", &entities)
            .unwrap();
        assert_eq!(result.text, "Contact [NAME] at [ADDRESS].");
        assert_eq!(result.total, 2);
        assert_eq!(result.stats["NAME"], 1);
        assert_eq!(result.stats["ADDRESS"], 1);
    }

    #[test]
    fn test_absent_entities_leave_text_unchanged() {
        let text = "Nothing to see here.";
        let result = Redactor::default()
            .redact(text, &[entity("John Smith", PiiCategory::Name)])
            .unwrap();
        assert_eq!(result.text, text);
        assert_eq!(result.total, 0);
        assert!(result.stats.is_empty());
    }

    #[test]
    fn test_nested_entities_redact_longest() {
        let entities = vec![
            entity("John", PiiCategory::Name),
            entity("John Smith Ltd", PiiCategory::CompanyName),
        ];
        let result = Redactor::default()
            .redact("Signed by John for John Smith Ltd", &entities)
            .unwrap();
        assert_eq!(result.text, "Signed by [NAME] for [COMPANY_NAME]");
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = entity("Grafton Street", PiiCategory::Address);
        let b = entity("Street Dublin", PiiCategory::Address);
        let c = entity("Grafton", PiiCategory::Name);
        let text = "15 Grafton Street Dublin 2";

        let redactor = Redactor::default();
        let first = redactor.redact(text, &[a.clone(), b.clone(), c.clone()]).unwrap();
        let second = redactor.redact(text, &[c, b, a]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text, "15 [ADDRESS] Dublin 2");
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let entities = vec![entity("john smith", PiiCategory::Name)];
        let text = "JOHN SMITH and John Smith";
        assert_eq!(
            Redactor::new(false).redact(text, &entities).unwrap().text,
            "[NAME] and [NAME]"
        );
        assert_eq!(
            Redactor::new(true).redact(text, &entities).unwrap().text,
            text
        );
    }

    #[test]
    fn test_full_stop_only_kept_at_sentence_end() {
        let entities = vec![entity("Main St.", PiiCategory::Address)];
        let redactor = Redactor::default();
        assert_eq!(
            redactor.redact("Lives on Main St. He left.", &entities).unwrap().text,
            "Lives on [ADDRESS]. He left."
        );
        assert_eq!(
            redactor.redact("Main St. in town", &entities).unwrap().text,
            "[ADDRESS] in town"
        );
        assert_eq!(
            redactor.redact("Main St.\nNext", &entities).unwrap().text,
            "[ADDRESS].\nNext"
        );
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let entities = vec![entity("C-247/25 (a)", PiiCategory::ReferenceNumber)];
        let result = Redactor::default()
            .redact("Case C-247/25 (a) filed", &entities)
            .unwrap();
        assert_eq!(result.text, "Case [REFERENCE_NUMBER] filed");
    }

    #[test]
    fn test_repeated_occurrences_counted() {
        let entities = vec![entity("8472639T", PiiCategory::PpsNumber)];
        let result = Redactor::default()
            .redact("PPS 8472639T, again 8472639T", &entities)
            .unwrap();
        assert_eq!(result.stats["PPS_NUMBER"], 2);
        assert_eq!(result.total, 2);
    }
}
