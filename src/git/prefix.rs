//! Path prefix handling for roots below the repository top level.
//!
//! `git log` always reports paths relative to the top-level root. When the
//! caller operates on a subdirectory (`lib/` of the repo, say), those paths
//! must be rewritten relative to that subdirectory, and paths outside it
//! dropped.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::GitRunner;

/// Relative path from the git top-level root to `root`, with `/` separators.
///
/// Empty when `root` is the top level itself, and also when the top level
/// cannot be determined (treated as already normalized).
pub fn path_prefix<R: GitRunner>(runner: &R, root: &Path) -> String {
    let output = match runner.run(root, &["rev-parse", "--show-toplevel"]) {
        Ok(output) if output.success() => output,
        _ => return String::new(),
    };

    let top_level = canonical_or_raw(Path::new(output.stdout.trim()));
    let root = canonical_or_raw(root);
    let prefix = match root.strip_prefix(&top_level) {
        Ok(rel) => to_slash(rel),
        Err(_) => String::new(),
    };
    debug!(root = %root.display(), prefix = %prefix, "path prefix");
    prefix
}

/// Rewrite a top-level-relative log path into a caller-relative path.
///
/// - empty prefix: path unchanged
/// - path equal to the prefix: `Some("")`, the prefix directory itself
/// - path under `prefix/`: the remainder
/// - anything else: `None` (outside the caller's scope)
pub fn normalize_log_path<'a>(log_path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(log_path);
    }
    if log_path == prefix {
        return Some("");
    }
    log_path
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
}

/// Normalize a log path and keep it only if it names an actual file in scope.
pub(crate) fn scoped_path<'a>(log_path: &'a str, prefix: &str) -> Option<&'a str> {
    normalize_log_path(log_path, prefix).filter(|p| !p.is_empty())
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn to_slash(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
