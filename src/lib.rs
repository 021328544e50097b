//! # git-attrib: Git History Attribution
//!
//! Reconstructs per-file history facts from `git log` output:
//! - the timestamp of the last first-parent commit that added or modified
//!   each file
//! - which files were added and never modified afterwards, optionally
//!   ignoring a caller-supplied set of commits (bulk reformatting, say)
//! - a human-readable "last change" description (hash, date, subject) per file
//! - memoized commit ancestor checks
//!
//! ## Library usage
//!
//! The crate is primarily a CLI tool; the engine is exposed as a library for
//! integration testing and benchmarking.
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use std::path::Path;
//!
//! use git_attrib::HistoryEngine;
//!
//! let engine = HistoryEngine::new();
//! let info = engine.compute_history(Path::new("."), &BTreeSet::new())?;
//! for path in &info.added_never_modified {
//!     println!("{path}");
//! }
//! # Ok::<(), git_attrib::AttribError>(())
//! ```

pub mod error;
pub mod git;

pub use error::AttribError;
pub use git::commit_list::{load_commit_list, parse_commit_list};
pub use git::history::{HistoryEngine, HistoryInfo, RepoDescriptions};
pub use git::log_parser::{
    CommitCursor, DescriptionState, FileCommitDescription, FileStatusSets, ScanOrder,
    parse_description_log, parse_status_log, parse_timestamp_log,
};
pub use git::prefix::normalize_log_path;
pub use git::resolve::{AncestorCache, IgnoredCommits, RefResolution};
pub use git::{GitCli, GitOutput, GitRunner};
