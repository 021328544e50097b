//! Loader for commit-list files (one commit reference per line).
//!
//! Format: blank lines and lines starting with `#` or `//` are skipped; a
//! line with embedded whitespace is an error naming its 1-based line number;
//! everything else is lower-cased into the set.

use std::collections::BTreeSet;
use std::path::Path;

use crate::AttribError;

/// Parse commit-list content.
pub fn parse_commit_list(content: &str) -> Result<BTreeSet<String>, AttribError> {
    let mut commits = BTreeSet::new();
    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        if line.chars().any(char::is_whitespace) {
            return Err(AttribError::MalformedCommitList { line: idx + 1 });
        }
        commits.insert(line.to_lowercase());
    }
    Ok(commits)
}

/// Read and parse a commit-list file.
pub fn load_commit_list(path: &Path) -> Result<BTreeSet<String>, AttribError> {
    let content = std::fs::read_to_string(path)?;
    parse_commit_list(&content)
}
