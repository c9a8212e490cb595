//! Document domain model

use super::entity::PiiEntity;
use super::ids::DocumentId;
use std::sync::Arc;

/// A loaded document with its ground-truth PII labels
///
/// The ground-truth list is fixed at construction; clones share it.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    text: String,
    ground_truth: Arc<[PiiEntity]>,
}

impl Document {
    /// Create a document from already-cleaned text
    pub fn new(id: DocumentId, text: impl Into<String>, ground_truth: Vec<PiiEntity>) -> Self {
        Self {
            id,
            text: text.into(),
            ground_truth: ground_truth.into(),
        }
    }

    /// Create a document without labels (redaction-only use)
    pub fn unlabelled(id: DocumentId, text: impl Into<String>) -> Self {
        Self::new(id, text, Vec::new())
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ground-truth entities in label order
    pub fn ground_truth(&self) -> &[PiiEntity] {
        &self.ground_truth
    }
}
