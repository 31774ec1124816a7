//! Parser for the keyword rule text boxes.

use super::{KeywordRule, KeywordRuleSet};
use crate::error::RuleError;
use std::collections::HashSet;

/// Parse keyword groups and destination folders into a rule set.
///
/// Blank group segments (for example a trailing `;`) are dropped before
/// counting. A segment that is not blank but yields no keywords (`" , "`)
/// is an error, as is any blank folder name.
pub fn parse(groups_text: &str, folders_text: &str) -> Result<KeywordRuleSet, RuleError> {
    if groups_text.trim().is_empty() || folders_text.trim().is_empty() {
        return Err(RuleError::EmptyRules);
    }

    let mut groups = Vec::new();
    for (i, segment) in groups_text.split(';').enumerate() {
        if segment.trim().is_empty() {
            continue;
        }
        let keywords: Vec<String> = segment
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(RuleError::EmptyKeywordGroup { index: i + 1 });
        }
        groups.push(keywords);
    }

    let mut folders = Vec::new();
    for (i, segment) in folders_text.split(';').enumerate() {
        let name = segment.trim();
        if name.is_empty() {
            return Err(RuleError::EmptyFolderName { index: i + 1 });
        }
        validate_folder_name(name)?;
        folders.push(name.to_string());
    }

    if groups.len() != folders.len() {
        return Err(RuleError::RuleCountMismatch {
            groups: groups.len(),
            folders: folders.len(),
        });
    }

    warn_on_shadowed_keywords(&groups, &folders);

    let rules = groups
        .into_iter()
        .zip(folders)
        .map(|(keywords, folder)| KeywordRule { keywords, folder })
        .collect();

    Ok(KeywordRuleSet { rules })
}

/// Folder names must stay inside the organized directory
fn validate_folder_name(name: &str) -> Result<(), RuleError> {
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(RuleError::InvalidFolderName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn warn_on_shadowed_keywords(groups: &[Vec<String>], folders: &[String]) {
    let mut seen = HashSet::new();
    for (keywords, folder) in groups.iter().zip(folders) {
        for keyword in keywords {
            if !seen.insert(keyword.as_str()) {
                tracing::warn!(
                    keyword = %keyword,
                    folder = %folder,
                    "Keyword appears in more than one group; the earlier group wins"
                );
            }
        }
    }
}
