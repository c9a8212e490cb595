//! Document loading
//!
//! Reads document texts from a spreadsheet, a directory of `.txt` files or a
//! JSON list, cleans them, and joins them with their ground-truth labels.
//!
//! # Example
//!
//! ```rust,no_run
//! use pii_eval::core::loader::{load_corpus, DocumentSource};
//! use std::path::Path;
//!
//! # fn example() -> pii_eval::domain::Result<()> {
//! let source = DocumentSource::detect(Path::new("data/documents.xlsx"), None)?;
//! let documents = load_corpus(&source, Path::new("data/parsed_data.json"))?;
//! println!("Loaded {} documents", documents.len());
//! # Ok(())
//! # }
//! ```

pub mod clean;
pub mod labels;

pub use clean::{clean_text, fix_encoding, TextCleaner};
pub use labels::{
    load_ground_truth, parse_ground_truth, parse_label_text, CategoryMap, GroundTruth, LabelMap,
};

use crate::adapters::spreadsheet::{is_spreadsheet, read_document_rows};
use crate::domain::{Document, DocumentId, PiiEvalError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Where document texts come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Workbook; first row is a header, column A name, column B content
    Spreadsheet {
        path: PathBuf,
        sheet: Option<String>,
    },
    /// Directory of `.txt` files; the file stem is the document id
    TextDirectory(PathBuf),
    /// JSON array of `{"name": ..., "content": ...}`
    Json(PathBuf),
}

impl DocumentSource {
    /// Pick the source kind from the path
    ///
    /// # Errors
    ///
    /// Returns `PiiEvalError::Load` if the path does not exist or has an
    /// unsupported extension.
    pub fn detect(path: &Path, sheet: Option<&str>) -> Result<Self> {
        if !path.exists() {
            return Err(PiiEvalError::Load(format!(
                "Documents source not found: {}",
                path.display()
            )));
        }
        if path.is_dir() {
            return Ok(Self::TextDirectory(path.to_path_buf()));
        }
        if is_spreadsheet(path) {
            return Ok(Self::Spreadsheet {
                path: path.to_path_buf(),
                sheet: sheet.map(str::to_string),
            });
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json(path.to_path_buf())),
            _ => Err(PiiEvalError::Load(format!(
                "Unsupported documents source {}: expected a spreadsheet, a .json file or a directory of .txt files",
                path.display()
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Spreadsheet { path, .. } => path,
            Self::TextDirectory(path) | Self::Json(path) => path,
        }
    }
}

/// A document row before cleaning and validation
#[derive(Debug, Clone, Deserialize)]
struct RawDocument {
    #[serde(alias = "id")]
    name: String,
    #[serde(alias = "text")]
    content: String,
    #[serde(skip)]
    origin: String,
}

/// Load and clean document texts without labels
///
/// Documents keep source order.
///
/// # Errors
///
/// Returns `PiiEvalError::Load` if the source is unreadable, a row has an
/// empty id or text, an id is duplicated, or the source holds no documents.
pub fn load_documents(source: &DocumentSource) -> Result<Vec<Document>> {
    let raw = read_raw_documents(source)?;
    if raw.is_empty() {
        return Err(PiiEvalError::Load(format!(
            "No documents found in {}",
            source.path().display()
        )));
    }

    let cleaner = TextCleaner::new()?;
    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(raw.len());

    for row in raw {
        let id = DocumentId::new(&row.name)
            .map_err(|e| PiiEvalError::Load(format!("{}: {}", row.origin, e)))?;
        if !seen.insert(id.clone()) {
            return Err(PiiEvalError::Load(format!(
                "{}: duplicate document id '{}'",
                row.origin, id
            )));
        }

        let text = cleaner.clean(&row.content);
        if text.is_empty() {
            return Err(PiiEvalError::Load(format!(
                "{}: document '{}' has no text",
                row.origin, id
            )));
        }

        documents.push(Document::unlabelled(id, text));
    }

    tracing::info!(
        source = %source.path().display(),
        count = documents.len(),
        "Loaded documents"
    );
    Ok(documents)
}

/// Load documents and attach their ground truth
///
/// # Errors
///
/// Everything [`load_documents`] and [`load_ground_truth`] fail on, plus a
/// document without a ground-truth entry. Entries for unknown documents are
/// logged and ignored.
pub fn load_corpus(source: &DocumentSource, ground_truth_path: &Path) -> Result<Vec<Document>> {
    let documents = load_documents(source)?;
    let mut ground_truth = load_ground_truth(ground_truth_path)?;

    let mut corpus = Vec::with_capacity(documents.len());
    for document in documents {
        let labels = ground_truth.remove(document.id()).ok_or_else(|| {
            PiiEvalError::Load(format!(
                "Document '{}' has no ground-truth entry in {}",
                document.id(),
                ground_truth_path.display()
            ))
        })?;
        corpus.push(Document::new(
            document.id().clone(),
            document.text(),
            labels,
        ));
    }

    for unknown in ground_truth.keys() {
        tracing::warn!(
            document_id = %unknown,
            "Ground-truth entry has no matching document, ignoring"
        );
    }

    Ok(corpus)
}

fn read_raw_documents(source: &DocumentSource) -> Result<Vec<RawDocument>> {
    match source {
        DocumentSource::Spreadsheet { path, sheet } => {
            let rows = read_document_rows(path, sheet.as_deref())?;
            Ok(rows
                .into_iter()
                .map(|row| RawDocument {
                    name: row.name,
                    content: row.content,
                    origin: format!("{} row {}", path.display(), row.row_number),
                })
                .collect())
        }
        DocumentSource::TextDirectory(dir) => read_text_directory(dir),
        DocumentSource::Json(path) => read_json_documents(path),
    }
}

fn read_text_directory(dir: &Path) -> Result<Vec<RawDocument>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        PiiEvalError::Load(format!("Failed to read directory {}: {}", dir.display(), e))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| PiiEvalError::Load(format!("Failed to read {}: {}", dir.display(), e)))?
            .path();
        let is_txt = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if path.is_file() && is_txt {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let content = fs::read_to_string(&path).map_err(|e| {
                PiiEvalError::Load(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            Ok(RawDocument {
                name,
                content,
                origin: path.display().to_string(),
            })
        })
        .collect()
}

fn read_json_documents(path: &Path) -> Result<Vec<RawDocument>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        PiiEvalError::Load(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let mut documents: Vec<RawDocument> = serde_json::from_str(&contents).map_err(|e| {
        PiiEvalError::Load(format!(
            "{} must be a JSON array of {{\"name\", \"content\"}} objects: {}",
            path.display(),
            e
        ))
    })?;
    for (index, document) in documents.iter_mut().enumerate() {
        document.origin = format!("{} item {}", path.display(), index);
    }
    Ok(documents)
}
