//! Document text cleaning
//!
//! Strips export markup from the source documents and normalizes encoding
//! artifacts and whitespace before the text is stored or sent to a model.

use crate::domain::{PiiEvalError, Result};
use regex::Regex;

/// Compiled cleaning patterns
///
/// # Example
///
/// ```
/// use pii_eval::core::loader::TextCleaner;
///
/// let cleaner = TextCleaner::new().unwrap();
/// let text = cleaner.clean("<START OF DOCUMENT: a>\n[Par-fe9b]: **Call** 01\\-555 0101\n<END OF DOCUMENT>");
/// assert_eq!(text, "Call 01-555 0101");
/// ```
#[derive(Debug, Clone)]
pub struct TextCleaner {
    document_markers: Regex,
    paragraph_ids: Regex,
    whitespace: Regex,
}

impl TextCleaner {
    /// Compile the cleaning patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            document_markers: compile(r"(?s)<START OF DOCUMENT:.*?>\n?|\n?<END OF DOCUMENT>")?,
            paragraph_ids: compile(r"\[Par-[A-Fa-f0-9]+\]:\s*")?,
            whitespace: compile(r"\s+")?,
        })
    }

    /// Clean one document
    pub fn clean(&self, raw: &str) -> String {
        let text = fix_encoding(raw);
        let text = self.document_markers.replace_all(&text, "");
        let text = self.paragraph_ids.replace_all(&text, "");
        let text = text.replace("**", "").replace("\\-", "-");
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| PiiEvalError::Load(format!("Invalid cleaning pattern {pattern}: {e}")))
}

/// Clean a single text with a freshly compiled [`TextCleaner`]
pub fn clean_text(raw: &str) -> Result<String> {
    Ok(TextCleaner::new()?.clean(raw))
}

/// Encoding fixes shared by cleaning and entity matching
///
/// Drops BOM and zero-width characters, maps Unicode spaces to ASCII space,
/// CRLF/CR to LF, and typographic quotes and dashes to ASCII.
pub fn fix_encoding(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    text.chars()
        .filter_map(|c| match c {
            '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' => None,
            '\r' => Some('\n'),
            '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
                Some(' ')
            }
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' => Some('\''),
            '\u{201C}' | '\u{201D}' | '\u{201F}' | '\u{2033}' => Some('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' => Some('-'),
            other => Some(other),
        })
        .collect()
}
