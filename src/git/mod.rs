//! Git history queries: calls the `git` CLI and parses its log output.
//!
//! Every git invocation in this crate goes through [`GitRunner`]. The
//! production implementation is [`GitCli`], which spawns `git` as a
//! subprocess inside the given root and captures its output. Tests swap in a
//! scripted runner so parsing and caching can be exercised without git.
//!
//! Submodules, leaves first:
//! - [`prefix`]: maps top-level-relative log paths into the caller's root
//! - [`resolve`]: ref → hash resolution and the ancestor memo
//! - [`log_parser`]: marker-driven state machines over `git log` output
//! - [`commit_list`]: loader for ignored-commit list files
//! - [`history`]: the attribution engine tying it all together

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::AttribError;

pub mod commit_list;
pub mod history;
pub mod log_parser;
pub mod prefix;
pub mod resolve;

// ─── Log format constants ───────────────────────────────────────────

/// Sentinel that starts every commit header in our custom log formats.
/// Never appears at the start of a path or commit field in practice.
pub const COMMIT_MARKER: &str = "__COMMIT__";

/// Header prefix of the single-line formats (`__COMMIT__ %ct`, `__COMMIT__ %H`).
/// The space keeps paths such as `__COMMIT__notes.txt` out of the header path.
pub const COMMIT_HEADER: &str = "__COMMIT__ ";

/// Date format shared by the description queries.
pub const DESCRIPTION_DATE_FORMAT: &str = "--date=format:%Y-%m-%d %H:%M:%S %z";

/// Fallback failure message when git writes nothing to stderr.
const GENERIC_FAILURE: &str = "git command failed";

// ─── Gateway ────────────────────────────────────────────────────────

/// Captured result of one git invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl GitOutput {
    /// Successful (exit code 0) output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            code: Some(0),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            code: Some(code),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs git subcommands inside a repository root.
///
/// `run` only fails when git cannot be started at all; a non-zero exit is a
/// normal [`GitOutput`] so callers can tell "command failed" apart from
/// "command succeeded with empty output". No retries: failures are
/// structural (bad repo, bad ref).
pub trait GitRunner {
    fn run(&self, root: &Path, args: &[&str]) -> Result<GitOutput, AttribError>;

    /// Like [`run`](Self::run), but a non-zero exit becomes
    /// [`AttribError::CommandFailure`] carrying the trimmed stderr.
    fn run_checked(&self, root: &Path, args: &[&str]) -> Result<String, AttribError> {
        let output = self.run(root, args)?;
        if !output.success() {
            let stderr = output.stderr.trim();
            return Err(AttribError::CommandFailure {
                command: args.join(" "),
                message: if stderr.is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    stderr.to_string()
                },
            });
        }
        Ok(output.stdout)
    }
}

impl<R: GitRunner + ?Sized> GitRunner for &R {
    fn run(&self, root: &Path, args: &[&str]) -> Result<GitOutput, AttribError> {
        (**self).run(root, args)
    }
}

/// The real `git` binary found through `PATH`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GitCli;

impl GitRunner for GitCli {
    fn run(&self, root: &Path, args: &[&str]) -> Result<GitOutput, AttribError> {
        debug!(root = %root.display(), args = ?args, "git");

        // `-C` so a missing root is reported by git, not as a spawn failure.
        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(args)
            .output()
            .map_err(|source| AttribError::GitSpawn { source })?;

        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        })
    }
}

// ─── Test support ───────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
