//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod evaluate;
pub mod init;
pub mod list_prompts;
pub mod parse_labels;
pub mod redact;
pub mod validate;

/// Split a comma-separated option into trimmed, non-empty items
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("v1, v2,,v3 "), vec!["v1", "v2", "v3"]);
        assert!(split_list(" , ").is_empty());
    }
}
