//! Entity matching and precision/recall/F1

use crate::core::loader::fix_encoding;
use crate::domain::{PiiCategory, PiiEntity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Text form used for matching
///
/// Encoding fixes, whitespace runs collapsed to one space, trimmed, and
/// lowercased unless `case_sensitive`.
pub fn normalize(text: &str, case_sensitive: bool) -> String {
    let collapsed = fix_encoding(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if case_sensitive {
        collapsed
    } else {
        collapsed.to_lowercase()
    }
}

/// True positive / false positive / false negative counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl Counts {
    pub fn detected(&self) -> usize {
        self.true_positives + self.false_positives
    }

    pub fn expected(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    pub fn add(&mut self, other: Counts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    pub fn scores(&self) -> Scores {
        Scores::from_counts(self)
    }
}

/// Precision, recall and F1
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Scores {
    /// Precision is 0 with no detections, recall is 0 with no ground truth,
    /// F1 is 0 when both are 0.
    pub fn from_counts(counts: &Counts) -> Self {
        let precision = ratio(counts.true_positives, counts.detected());
        let recall = ratio(counts.true_positives, counts.expected());
        Self {
            precision,
            recall,
            f1: f1(precision, recall),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Outcome of matching one document's detections against its ground truth
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub counts: Counts,
    pub per_category: BTreeMap<PiiCategory, Counts>,
}

/// Multiset intersection on (category, normalized text)
///
/// Each ground-truth item is consumed by at most one detection, so
/// duplicate detections only match as often as the item occurs in ground
/// truth. The result does not depend on the order of either list.
pub fn match_entities(
    detected: &[PiiEntity],
    ground_truth: &[PiiEntity],
    case_sensitive: bool,
) -> MatchResult {
    let mut remaining: HashMap<(PiiCategory, String), usize> = HashMap::new();
    for entity in ground_truth {
        *remaining
            .entry((entity.category, normalize(&entity.text, case_sensitive)))
            .or_default() += 1;
    }

    let mut result = MatchResult::default();
    for entity in ground_truth {
        result.per_category.entry(entity.category).or_default();
    }

    for entity in detected {
        let key = (entity.category, normalize(&entity.text, case_sensitive));
        let counts = result.per_category.entry(entity.category).or_default();
        match remaining.get_mut(&key) {
            Some(left) if *left > 0 => {
                *left -= 1;
                counts.true_positives += 1;
            }
            _ => counts.false_positives += 1,
        }
    }

    for ((category, _), left) in remaining {
        if left > 0 {
            result.per_category.entry(category).or_default().false_negatives += left;
        }
    }

    for counts in result.per_category.values() {
        result.counts.add(*counts);
    }
    result
}

/// Per-category counts with their scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    #[serde(flatten)]
    pub counts: Counts,
    #[serde(flatten)]
    pub scores: Scores,
}

impl From<Counts> for CategoryMetrics {
    fn from(counts: Counts) -> Self {
        Self {
            counts,
            scores: counts.scores(),
        }
    }
}
