//! Prompt template store
//!
//! Holds the prompt variants under evaluation. Built-in variants `v1`-`v4`
//! can be extended or overridden from a TOML file:
//!
//! ```toml
//! [[prompts]]
//! id = "v5"
//! description = "Terse"
//! template = """
//! Find PII of these kinds:
//! {{categories}}
//! Text: {{document}}
//! """
//! ```

pub mod templates;

use crate::domain::{PiiCategory, PiiEvalError, PromptId, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use templates::BUILTIN_PROMPTS;

/// Substitution point for the document text
pub const DOCUMENT_PLACEHOLDER: &str = "document";

/// Substitution point for the numbered category list
pub const CATEGORIES_PLACEHOLDER: &str = "categories";

/// Characters of the template shown in comparison output
const PREVIEW_CHARS: usize = 100;

/// A named prompt template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVariant {
    pub id: PromptId,
    pub description: String,
    pub template: String,
}

impl PromptVariant {
    pub fn new(id: PromptId, description: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            template: template.into(),
        }
    }

    /// Substitute the document text and category list
    ///
    /// # Errors
    ///
    /// Returns `PiiEvalError::Template` if either substitution point is
    /// missing or the template names an unknown placeholder.
    pub fn render(&self, document_text: &str) -> Result<String> {
        let placeholder = placeholder_pattern()?;
        self.check_placeholders(&placeholder)?;

        let categories = render_category_list();
        let rendered = placeholder.replace_all(&self.template, |caps: &Captures| {
            if &caps[1] == DOCUMENT_PLACEHOLDER {
                document_text.to_string()
            } else {
                categories.clone()
            }
        });
        Ok(rendered.into_owned())
    }

    /// Check the template without rendering it
    pub fn validate(&self) -> Result<()> {
        self.check_placeholders(&placeholder_pattern()?)
    }

    fn check_placeholders(&self, placeholder: &Regex) -> Result<()> {
        let mut has_document = false;
        let mut has_categories = false;
        for caps in placeholder.captures_iter(&self.template) {
            match &caps[1] {
                DOCUMENT_PLACEHOLDER => has_document = true,
                CATEGORIES_PLACEHOLDER => has_categories = true,
                other => {
                    return Err(PiiEvalError::Template(format!(
                        "Prompt '{}' uses unknown placeholder {{{{{}}}}}",
                        self.id, other
                    )))
                }
            }
        }

        let missing: Vec<&str> = [
            (has_document, DOCUMENT_PLACEHOLDER),
            (has_categories, CATEGORIES_PLACEHOLDER),
        ]
        .iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(PiiEvalError::Template(format!(
                "Prompt '{}' is missing placeholder(s): {}",
                self.id,
                missing
                    .iter()
                    .map(|m| format!("{{{{{m}}}}}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        Ok(())
    }

    /// First 100 characters of the template, with `...` when truncated
    pub fn preview(&self) -> String {
        if self.template.chars().count() <= PREVIEW_CHARS {
            return self.template.clone();
        }
        let head: String = self.template.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}

fn placeholder_pattern() -> Result<Regex> {
    Regex::new(r"\{\{\s*([A-Za-z_]+)\s*\}\}")
        .map_err(|e| PiiEvalError::Template(format!("Invalid placeholder pattern: {e}")))
}

/// Numbered `N. Category: description` lines
pub fn render_category_list() -> String {
    PiiCategory::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}: {}", i + 1, c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptFile {
    #[serde(default)]
    prompts: Vec<PromptEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptEntry {
    id: String,
    #[serde(default)]
    description: String,
    template: String,
}

/// Ordered mapping from prompt id to variant
#[derive(Debug, Clone)]
pub struct PromptStore {
    variants: BTreeMap<PromptId, PromptVariant>,
}

impl PromptStore {
    /// Store with only the built-in variants
    pub fn builtin() -> Self {
        let mut variants = BTreeMap::new();
        for (id, description, template) in BUILTIN_PROMPTS {
            if let Ok(id) = PromptId::new(id) {
                variants.insert(id.clone(), PromptVariant::new(id, description, template));
            }
        }
        Self { variants }
    }

    /// Built-in variants plus those in the optional TOML file
    ///
    /// # Errors
    ///
    /// Returns `PiiEvalError::Configuration` if the file cannot be read or
    /// parsed, an id is invalid, or an id appears twice in the file.
    pub fn load(variants_path: Option<&Path>) -> Result<Self> {
        let mut store = Self::builtin();
        if let Some(path) = variants_path {
            let contents = fs::read_to_string(path).map_err(|e| {
                PiiEvalError::Configuration(format!(
                    "Failed to read prompt variants {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let added = store.extend_from_toml(&contents)?;
            tracing::info!(
                path = %path.display(),
                count = added,
                "Loaded prompt variants"
            );
        }
        Ok(store)
    }

    /// Add variants from TOML text; a file id replaces a built-in one
    ///
    /// Ids whose file-safe forms collide (`v2/draft` and `v2_draft`) are
    /// rejected, since their results files would overwrite each other.
    pub fn extend_from_toml(&mut self, contents: &str) -> Result<usize> {
        let file: PromptFile = toml::from_str(contents).map_err(|e| {
            PiiEvalError::Configuration(format!("Failed to parse prompt variants: {e}"))
        })?;

        let mut seen = Vec::new();
        for entry in file.prompts {
            let id = PromptId::new(entry.id).map_err(PiiEvalError::Configuration)?;
            if seen.contains(&id) {
                return Err(PiiEvalError::Configuration(format!(
                    "Prompt id '{id}' is defined more than once"
                )));
            }
            if let Some(other) = self
                .variants
                .keys()
                .find(|other| **other != id && other.file_stem() == id.file_stem())
            {
                return Err(PiiEvalError::Configuration(format!(
                    "Prompt ids '{other}' and '{id}' map to the same results file name '{}'",
                    id.file_stem()
                )));
            }
            seen.push(id.clone());
            self.variants.insert(
                id.clone(),
                PromptVariant::new(id, entry.description, entry.template),
            );
        }
        Ok(seen.len())
    }

    /// Look up a variant
    ///
    /// # Errors
    ///
    /// Returns `PiiEvalError::Template` for an unknown id.
    pub fn get(&self, id: &PromptId) -> Result<&PromptVariant> {
        self.variants.get(id).ok_or_else(|| {
            PiiEvalError::Template(format!(
                "Unknown prompt id '{}'. Available: {}",
                id,
                self.ids()
                    .iter()
                    .map(PromptId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }

    /// Render a variant with the document text
    pub fn render(&self, id: &PromptId, document_text: &str) -> Result<String> {
        self.get(id)?.render(document_text)
    }

    /// Variants in id order
    pub fn list(&self) -> Vec<&PromptVariant> {
        self.variants.values().collect()
    }

    pub fn ids(&self) -> Vec<PromptId> {
        self.variants.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
