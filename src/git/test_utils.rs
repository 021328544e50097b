//! Scripted [`GitRunner`] for tests that must not depend on a real repository.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use super::{GitOutput, GitRunner};
use crate::AttribError;

/// Answers git invocations from a table keyed by the space-joined argument
/// list, and records every call.
///
/// Unscripted invocations answer with exit code 128 and a "not scripted"
/// stderr, like git rejecting an unknown command.
#[derive(Debug, Default)]
pub(crate) struct ScriptedGit {
    responses: HashMap<String, GitOutput>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Script the answer for `args` (joined with single spaces).
    pub(crate) fn on(mut self, args: &str, output: GitOutput) -> Self {
        self.responses.insert(args.to_string(), output);
        self
    }

    /// Script a repository whose work tree check succeeds and whose top
    /// level is `top_level`.
    pub(crate) fn work_tree(self, top_level: &str) -> Self {
        self.on("rev-parse --is-inside-work-tree", GitOutput::ok("true\n"))
            .on("rev-parse --show-toplevel", GitOutput::ok(format!("{}\n", top_level)))
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of recorded calls whose argument string starts with `prefix`.
    pub(crate) fn count_matching(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl GitRunner for ScriptedGit {
    fn run(&self, _root: &Path, args: &[&str]) -> Result<GitOutput, AttribError> {
        let key = args.join(" ");
        self.calls.borrow_mut().push(key.clone());
        Ok(self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| GitOutput::failed(128, format!("fatal: not scripted: {}", key))))
    }
}

/// A git runner whose binary is missing.
#[derive(Debug, Default)]
pub(crate) struct MissingGit;

impl GitRunner for MissingGit {
    fn run(&self, _root: &Path, _args: &[&str]) -> Result<GitOutput, AttribError> {
        Err(AttribError::GitSpawn {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "git not found"),
        })
    }
}

/// Real temporary git repository driven through the `git` binary.
///
/// Author and committer dates are pinned per commit so timestamps are
/// deterministic.
pub(crate) struct TempRepo {
    pub(crate) dir: tempfile::TempDir,
}

impl TempRepo {
    pub(crate) fn init() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Self { dir };
        repo.git(&["init", "-q"]);
        repo.git(&["config", "user.email", "history@test.com"]);
        repo.git(&["config", "user.name", "History Test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn git(&self, args: &[&str]) -> String {
        self.git_at(args, None)
    }

    fn git_at(&self, args: &[&str], timestamp: Option<i64>) -> String {
        let mut cmd = std::process::Command::new("git");
        cmd.args(args).current_dir(self.path());
        if let Some(ts) = timestamp {
            let date = format!("@{} +0000", ts);
            cmd.env("GIT_AUTHOR_DATE", &date).env("GIT_COMMITTER_DATE", &date);
        }
        let output = cmd.output().expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub(crate) fn write(&self, rel_path: &str, content: &str) {
        let path = self.path().join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Stage everything and commit at `timestamp`; returns the full hash.
    pub(crate) fn commit(&self, message: &str, timestamp: i64) -> String {
        self.git(&["add", "-A"]);
        self.git_at(&["commit", "-q", "-m", message], Some(timestamp));
        self.git(&["rev-parse", "HEAD"])
    }
}
