//! Commit reference resolution and ancestor checks.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::GitRunner;

/// Outcome of resolving one commit reference.
///
/// Resolution is best-effort: a ref git cannot verify is kept as its
/// lower-cased literal token, so an abbreviated hash from another clone can
/// still prefix-match later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefResolution {
    Resolved(String),
    Unresolved(String),
}

impl RefResolution {
    pub fn into_token(self) -> String {
        match self {
            RefResolution::Resolved(hash) | RefResolution::Unresolved(hash) => hash,
        }
    }
}

/// Resolve a single ref (tag, branch, short hash) to its full commit hash.
///
/// Returns `None` for a blank ref.
pub fn resolve_ref<R: GitRunner>(runner: &R, root: &Path, commit_ref: &str) -> Option<RefResolution> {
    let token = commit_ref.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }

    let spec = format!("{}^{{commit}}", token);
    match runner.run(root, &["rev-parse", "--verify", &spec]) {
        Ok(output) if output.success() && !output.stdout.trim().is_empty() => {
            Some(RefResolution::Resolved(output.stdout.trim().to_lowercase()))
        }
        Ok(_) => {
            debug!(commit_ref = %token, "ref not resolvable, keeping literal token");
            Some(RefResolution::Unresolved(token))
        }
        Err(e) => {
            warn!(commit_ref = %token, error = %e, "ref resolution failed, keeping literal token");
            Some(RefResolution::Unresolved(token))
        }
    }
}

/// Resolve every ref in `refs`; never fails as a whole.
pub fn resolve_commit_hashes<'a, R, I>(runner: &R, root: &Path, refs: I) -> IgnoredCommits
where
    R: GitRunner,
    I: IntoIterator<Item = &'a str>,
{
    refs.into_iter()
        .filter_map(|r| resolve_ref(runner, root, r))
        .collect()
}

/// Resolved set of commits whose modifications should not count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnoredCommits {
    hashes: BTreeSet<String>,
}

impl IgnoredCommits {
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn hashes(&self) -> &BTreeSet<String> {
        &self.hashes
    }

    /// True if `hash` equals an entry or starts with one (abbreviated entries).
    pub fn matches(&self, hash: &str) -> bool {
        if self.hashes.is_empty() {
            return false;
        }
        let hash = hash.to_lowercase();
        self.hashes
            .iter()
            .any(|ignored| hash == *ignored || hash.starts_with(ignored.as_str()))
    }
}

impl FromIterator<RefResolution> for IgnoredCommits {
    fn from_iter<T: IntoIterator<Item = RefResolution>>(iter: T) -> Self {
        Self {
            hashes: iter.into_iter().map(RefResolution::into_token).collect(),
        }
    }
}

// ─── Ancestor memo ──────────────────────────────────────────────────

/// Memoized `merge-base --is-ancestor` answers for one run.
///
/// Keyed by (root, ancestor, descendant). Repository state is assumed static
/// while the cache lives.
#[derive(Debug, Default)]
pub struct AncestorCache {
    entries: HashMap<(PathBuf, String, String), bool>,
}

impl AncestorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `ancestor` is an ancestor of (or equal to) `descendant`.
    ///
    /// A non-zero exit is a plain `false`. If git cannot be started the
    /// answer is `false` and nothing is cached.
    pub fn is_ancestor<R: GitRunner>(
        &mut self,
        runner: &R,
        root: &Path,
        ancestor: &str,
        descendant: &str,
    ) -> bool {
        let key = (root.to_path_buf(), ancestor.to_string(), descendant.to_string());
        if let Some(&cached) = self.entries.get(&key) {
            return cached;
        }

        match runner.run(root, &["merge-base", "--is-ancestor", ancestor, descendant]) {
            Ok(output) => {
                let is_ancestor = output.success();
                self.entries.insert(key, is_ancestor);
                is_ancestor
            }
            Err(e) => {
                warn!(ancestor, descendant, error = %e, "ancestor check failed");
                false
            }
        }
    }
}
