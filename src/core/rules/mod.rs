//! # Keyword Rules
//!
//! Parses the keyword-groups / destination-folders text syntax used by
//! keyword mode:
//!
//! ```text
//! groups:  invoice, receipt; photo, img
//! folders: Finance; Pictures
//! ```
//!
//! Semicolons separate groups (and folders), commas separate keywords
//! inside a group. Whitespace around tokens is ignored and keywords are
//! lower-cased. Group order is match precedence.

mod parser;

pub use parser::parse;

use serde::{Deserialize, Serialize};

/// One keyword group and the folder its matches go to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Lower-cased keywords, any of which selects this rule
    pub keywords: Vec<String>,
    /// Destination folder name, relative to the organized directory
    pub folder: String,
}

impl KeywordRule {
    /// Whether any keyword is a substring of the (already lower-cased) name
    fn matches(&self, lowered_name: &str) -> bool {
        self.keywords.iter().any(|k| lowered_name.contains(k.as_str()))
    }
}

/// Ordered, validated keyword rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRuleSet {
    rules: Vec<KeywordRule>,
}

impl KeywordRuleSet {
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Folder for a file name, or `None` when no group matches.
    ///
    /// Matching is a case-insensitive substring test against the full
    /// file name, extension included. The first matching group wins.
    pub fn folder_for(&self, filename: &str) -> Option<&str> {
        let lowered = filename.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.folder.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_group_wins() {
        let rules = parse("report; annual report", "Reports; Annual").unwrap();
        assert_eq!(rules.folder_for("annual report 2023.pdf"), Some("Reports"));
    }

    #[test]
    fn matching_ignores_case() {
        let rules = parse("invoice", "Finance").unwrap();
        assert_eq!(rules.folder_for("INVOICE-0042.PDF"), Some("Finance"));
    }

    #[test]
    fn matching_includes_extension() {
        let rules = parse("pdf", "Documents").unwrap();
        assert_eq!(rules.folder_for("scan.pdf"), Some("Documents"));
    }

    #[test]
    fn no_match_returns_none() {
        let rules = parse("invoice, receipt", "Finance").unwrap();
        assert_eq!(rules.folder_for("holiday.jpg"), None);
    }
}
