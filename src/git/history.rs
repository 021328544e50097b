//! History attribution engine.
//!
//! Answers, for a working root:
//! - is it inside a git work tree at all?
//! - per file, the timestamp of the most recent first-parent commit that
//!   added or modified it
//! - which files were added and never modified by a non-ignored commit
//! - per file, a (hash, date, subject) description of its last change
//!
//! All queries are sequential, one git process at a time. The caches live in
//! the [`HistoryEngine`] that created them and assume the repository does not
//! change while the engine is alive.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::log_parser::{
    FileCommitDescription, ScanOrder, parse_description_log, parse_single_description,
    parse_status_log, parse_timestamp_log,
};
use super::prefix::path_prefix;
use super::resolve::{AncestorCache, IgnoredCommits, resolve_commit_hashes};
use super::{DESCRIPTION_DATE_FORMAT, GitCli, GitRunner};
use crate::AttribError;

// ─── Query argument lists ───────────────────────────────────────────

/// Keeps non-ASCII paths unquoted in log and listing output.
const RAW_PATHS: [&str; 2] = ["-c", "core.quotePath=false"];

const TIMESTAMP_LOG_ARGS: &[&str] = &[
    "log",
    "--first-parent",
    "--reverse",
    "--name-only",
    "--pretty=format:__COMMIT__ %ct",
    "--diff-filter=AM",
    "HEAD",
];

const STATUS_LOG_ARGS: &[&str] = &[
    "log",
    "--first-parent",
    "--name-status",
    "--pretty=format:__COMMIT__ %H",
    "--diff-filter=AM",
    "HEAD",
];

const DESCRIPTION_LOG_ARGS: &[&str] = &[
    "log",
    "--first-parent",
    "--reverse",
    "--name-only",
    DESCRIPTION_DATE_FORMAT,
    "--pretty=format:__COMMIT__%n%H%n%ad%n%s",
    "--diff-filter=AM",
    "HEAD",
];

fn with_raw_paths<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut full = Vec::with_capacity(RAW_PATHS.len() + args.len());
    full.extend_from_slice(&RAW_PATHS);
    full.extend_from_slice(args);
    full
}

// ─── Result types ───────────────────────────────────────────────────

/// Result of [`HistoryEngine::compute_history`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HistoryInfo {
    pub is_tracked: bool,
    /// Path → `%ct` of the most recent first-parent commit adding or modifying it.
    pub file_timestamps: BTreeMap<String, i64>,
    pub added_never_modified: BTreeSet<String>,
}

/// Per-repository description cache.
///
/// `None` entries are cached "no description" facts and are never
/// recomputed.
#[derive(Clone, Debug, Default)]
pub struct RepoDescriptions {
    pub is_tracked: bool,
    pub entries: HashMap<String, Option<FileCommitDescription>>,
}

// ─── Engine ─────────────────────────────────────────────────────────

/// History attribution engine owning its per-run caches.
#[derive(Debug)]
pub struct HistoryEngine<R: GitRunner = GitCli> {
    runner: R,
    ancestors: AncestorCache,
    descriptions: HashMap<PathBuf, RepoDescriptions>,
}

impl HistoryEngine<GitCli> {
    /// Engine backed by the `git` binary.
    pub fn new() -> Self {
        Self::with_runner(GitCli)
    }
}

impl Default for HistoryEngine<GitCli> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: GitRunner> HistoryEngine<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            ancestors: AncestorCache::new(),
            descriptions: HashMap::new(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// True iff git considers `root` to be inside a work tree.
    pub fn is_tracked(&self, root: &Path) -> bool {
        match self.runner.run(root, &["rev-parse", "--is-inside-work-tree"]) {
            Ok(output) => output.success() && output.stdout.trim().eq_ignore_ascii_case("true"),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "work tree check failed");
                false
            }
        }
    }

    /// Top-level root of the work tree containing `start`.
    pub fn repo_root(&self, start: &Path) -> Result<PathBuf, AttribError> {
        let output = self.runner.run(start, &["rev-parse", "--show-toplevel"])?;
        let top_level = output.stdout.trim();
        if !output.success() || top_level.is_empty() {
            return Err(AttribError::NotARepository {
                path: start.to_path_buf(),
            });
        }
        Ok(PathBuf::from(top_level))
    }

    /// Relative prefix from the top-level root to `root` (see [`path_prefix`]).
    pub fn path_prefix(&self, root: &Path) -> String {
        path_prefix(&self.runner, root)
    }

    /// Best-effort resolution of `refs` to full commit hashes.
    pub fn resolve_commit_hashes<'a, I>(&self, root: &Path, refs: I) -> IgnoredCommits
    where
        I: IntoIterator<Item = &'a str>,
    {
        resolve_commit_hashes(&self.runner, root, refs)
    }

    /// Memoized ancestor check; failures read as `false`.
    pub fn is_ancestor(&mut self, root: &Path, ancestor: &str, descendant: &str) -> bool {
        self.ancestors
            .is_ancestor(&self.runner, root, ancestor, descendant)
    }

    /// Per-file last-change timestamps and the added-never-modified set.
    ///
    /// Modifications made by commits in `ignored_modification_commits` do not
    /// disqualify a file from the added-never-modified set. Any failing log
    /// query aborts the whole computation.
    pub fn compute_history(
        &self,
        root: &Path,
        ignored_modification_commits: &BTreeSet<String>,
    ) -> Result<HistoryInfo, AttribError> {
        if !self.is_tracked(root) {
            debug!(root = %root.display(), "not a git work tree");
            return Ok(HistoryInfo::default());
        }

        let ignored = self.resolve_commit_hashes(
            root,
            ignored_modification_commits.iter().map(String::as_str),
        );
        let prefix = self.path_prefix(root);

        let timestamp_log = self
            .runner
            .run_checked(root, &with_raw_paths(TIMESTAMP_LOG_ARGS))?;
        let file_timestamps = parse_timestamp_log(&timestamp_log, &prefix, ScanOrder::OldestFirst);

        let status_log = self
            .runner
            .run_checked(root, &with_raw_paths(STATUS_LOG_ARGS))?;
        let sets = parse_status_log(&status_log, &prefix, &ignored);
        let added_never_modified = sets.added_never_modified();

        info!(
            root = %root.display(),
            files = file_timestamps.len(),
            added = sets.added.len(),
            added_never_modified = added_never_modified.len(),
            ignored_commits = ignored.len(),
            "history computed"
        );

        Ok(HistoryInfo {
            is_tracked: true,
            file_timestamps: file_timestamps.into_iter().collect(),
            added_never_modified,
        })
    }

    /// Most recent description for every file touched in first-parent history.
    ///
    /// A failing log yields an empty map.
    pub fn collect_recent_file_descriptions(
        &self,
        root: &Path,
    ) -> HashMap<String, Option<FileCommitDescription>> {
        let prefix = self.path_prefix(root);
        let output = match self
            .runner
            .run_checked(root, &with_raw_paths(DESCRIPTION_LOG_ARGS))
        {
            Ok(output) => output,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "bulk description query failed");
                return HashMap::new();
            }
        };

        parse_description_log(&output, &prefix)
            .into_iter()
            .map(|(path, desc)| (path, Some(desc)))
            .collect()
    }

    /// Start a description session for `root`, seeding it in bulk.
    ///
    /// Replaces any existing session for the same root.
    pub fn warm_descriptions(&mut self, root: &Path) -> &RepoDescriptions {
        let is_tracked = self.is_tracked(root);
        let entries = if is_tracked {
            self.collect_recent_file_descriptions(root)
        } else {
            HashMap::new()
        };
        debug!(root = %root.display(), files = entries.len(), "description cache warmed");

        self.descriptions.insert(root.to_path_buf(), RepoDescriptions { is_tracked, entries });
        &self.descriptions[root]
    }

    /// Description of the last first-parent commit touching `rel_path`.
    ///
    /// Cached per root, including "not found". A failing single-file query
    /// reads as "not found".
    pub fn file_description(&mut self, root: &Path, rel_path: &str) -> Option<FileCommitDescription> {
        if !self.descriptions.contains_key(root) {
            let is_tracked = self.is_tracked(root);
            self.descriptions.insert(
                root.to_path_buf(),
                RepoDescriptions {
                    is_tracked,
                    entries: HashMap::new(),
                },
            );
        }
        let runner = &self.runner;
        let repo = self.descriptions.get_mut(root)?;

        if let Some(cached) = repo.entries.get(rel_path) {
            return cached.clone();
        }

        let description = if repo.is_tracked {
            query_file_description(runner, root, rel_path)
        } else {
            None
        };
        repo.entries.insert(rel_path.to_string(), description.clone());
        description
    }

    /// Tracked files matching `pathspecs` (all of `.` when empty), joined onto `root`.
    pub fn list_tracked_files(&self, root: &Path, pathspecs: &[String]) -> Result<Vec<PathBuf>, AttribError> {
        let mut args = with_raw_paths(&["ls-files", "-z", "--"]);
        args.extend(pathspecs_or_dot(pathspecs));
        let output = self.runner.run_checked(root, &args)?;

        Ok(output
            .split('\0')
            .filter(|entry| !entry.is_empty())
            .map(|entry| root.join(entry))
            .collect())
    }

    /// Timestamp of the newest commit touching each file under `pathspecs`.
    ///
    /// Full history (not first-parent only), newest first.
    pub fn last_commit_timestamps(
        &self,
        root: &Path,
        pathspecs: &[String],
    ) -> Result<BTreeMap<String, i64>, AttribError> {
        let prefix = self.path_prefix(root);
        let mut args = with_raw_paths(&["log", "--name-only", "--pretty=format:__COMMIT__ %ct", "--"]);
        args.extend(pathspecs_or_dot(pathspecs));
        let output = self.runner.run_checked(root, &args)?;

        Ok(parse_timestamp_log(&output, &prefix, ScanOrder::NewestFirst)
            .into_iter()
            .collect())
    }
}

fn pathspecs_or_dot(pathspecs: &[String]) -> Vec<&str> {
    if pathspecs.is_empty() {
        vec!["."]
    } else {
        pathspecs.iter().map(String::as_str).collect()
    }
}

fn query_file_description<R: GitRunner>(
    runner: &R,
    root: &Path,
    rel_path: &str,
) -> Option<FileCommitDescription> {
    let args = [
        "log",
        "--first-parent",
        "-1",
        DESCRIPTION_DATE_FORMAT,
        "--format=%H%n%ad%n%s",
        "--",
        rel_path,
    ];
    match runner.run(root, &args) {
        Ok(output) if output.success() => parse_single_description(&output.stdout),
        Ok(output) => {
            debug!(path = rel_path, stderr = %output.stderr.trim(), "no description");
            None
        }
        Err(e) => {
            warn!(path = rel_path, error = %e, "description query failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
