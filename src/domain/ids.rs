//! Domain identifier types with validation
//!
//! Newtype wrappers keep document and prompt identifiers from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document identifier (e.g. `Test A`)
///
/// # Examples
///
/// ```
/// use pii_eval::domain::ids::DocumentId;
///
/// let id = DocumentId::new("  Test A ").unwrap();
/// assert_eq!(id.as_str(), "Test A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId, trimming surrounding whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the document ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-system safe form of the ID
    ///
    /// Characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn file_stem(&self) -> String {
        sanitize_file_component(&self.0)
    }
}

/// Prompt variant identifier (e.g. `v2`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptId(String);

impl PromptId {
    /// Creates a new PromptId
    ///
    /// Prompt IDs end up in output file names, so whitespace is rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Prompt ID cannot be empty".to_string());
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(format!("Prompt ID cannot contain whitespace: '{trimmed}'"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the prompt ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-system safe form of the ID
    pub fn file_stem(&self) -> String {
        sanitize_file_component(&self.0)
    }
}

fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

macro_rules! impl_id_traits {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_id_traits!(DocumentId);
impl_id_traits!(PromptId);
