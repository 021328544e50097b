//! Marker-driven parsers for our custom `git log` formats.
//!
//! Each query injects [`COMMIT_MARKER`](super::COMMIT_MARKER) into its
//! `--pretty` format, so the output is a sequence of commit headers each
//! followed by the paths that commit added or modified. The parsers below are
//! small state machines fed one line at a time.
//!
//! Shared rules:
//! - lines are trimmed; blank lines are skipped
//! - a path line seen before any commit header is discarded
//! - every path goes through [`scoped_path`](super::prefix::scoped_path);
//!   out-of-scope paths and the prefix directory itself are dropped
//! - single-line headers need the separating space ([`COMMIT_HEADER`]), so a
//!   path that merely starts with the marker stays a path
//! - in description mode a line equal to the bare marker always opens a new
//!   block; a file named exactly `__COMMIT__` is indistinguishable from a
//!   header there and ends the current block

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use super::{COMMIT_HEADER, COMMIT_MARKER};
use super::prefix::scoped_path;
use super::resolve::IgnoredCommits;

// ─── Shared types ───────────────────────────────────────────────────

/// The commit whose path lines are currently being read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitCursor<T> {
    NoCurrentCommit,
    CurrentCommit(T),
}

impl<T> CommitCursor<T> {
    pub fn current(&self) -> Option<&T> {
        match self {
            CommitCursor::NoCurrentCommit => None,
            CommitCursor::CurrentCommit(value) => Some(value),
        }
    }
}

/// Order in which a query lists commits, which decides who wins a path.
///
/// `OldestFirst` (`--reverse`): later lines overwrite earlier ones.
/// `NewestFirst` (git's default): the first line for a path is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    OldestFirst,
    NewestFirst,
}

/// Last-change description of a single file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileCommitDescription {
    pub commit_hash: String,
    pub commit_date: String,
    pub description: String,
}

/// Payload of a header line (`__COMMIT__ <value>`), if it is one.
///
/// Takes the untrimmed line so `__COMMIT__ ` with an empty value still reads
/// as a header.
fn marker_payload(raw_line: &str) -> Option<&str> {
    raw_line.trim_start().strip_prefix(COMMIT_HEADER).map(str::trim)
}

// ─── Timestamp-per-file mode ────────────────────────────────────────

/// Parses `--name-only --pretty=format:"__COMMIT__ %ct"` output into
/// path → commit timestamp.
#[derive(Debug)]
pub struct TimestampLogParser {
    prefix: String,
    order: ScanOrder,
    cursor: CommitCursor<i64>,
    timestamps: HashMap<String, i64>,
}

impl TimestampLogParser {
    pub fn new(prefix: impl Into<String>, order: ScanOrder) -> Self {
        Self {
            prefix: prefix.into(),
            order,
            cursor: CommitCursor::NoCurrentCommit,
            timestamps: HashMap::new(),
        }
    }

    pub fn cursor(&self) -> &CommitCursor<i64> {
        &self.cursor
    }

    pub fn feed_line(&mut self, raw_line: &str) {
        let line = raw_line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(payload) = marker_payload(raw_line) {
            self.cursor = match payload.parse::<i64>() {
                Ok(ts) => CommitCursor::CurrentCommit(ts),
                Err(e) => {
                    warn!(line = %line, error = %e, "skipping commit with bad timestamp");
                    CommitCursor::NoCurrentCommit
                }
            };
            return;
        }

        let Some(&timestamp) = self.cursor.current() else {
            return;
        };
        let Some(path) = scoped_path(line, &self.prefix) else {
            return;
        };

        match self.order {
            ScanOrder::OldestFirst => {
                self.timestamps.insert(path.to_string(), timestamp);
            }
            ScanOrder::NewestFirst => {
                self.timestamps.entry(path.to_string()).or_insert(timestamp);
            }
        }
    }

    pub fn finish(self) -> HashMap<String, i64> {
        debug!(files = self.timestamps.len(), "timestamp log parsed");
        self.timestamps
    }
}

/// Parse a whole timestamp-mode log.
pub fn parse_timestamp_log(output: &str, prefix: &str, order: ScanOrder) -> HashMap<String, i64> {
    let mut parser = TimestampLogParser::new(prefix, order);
    for line in output.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

// ─── Status-per-file mode ───────────────────────────────────────────

/// Cumulative add/modify sets from a `--name-status` log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileStatusSets {
    pub added: BTreeSet<String>,
    /// Paths modified by at least one commit outside the ignored set.
    pub modified: BTreeSet<String>,
}

impl FileStatusSets {
    /// Paths added and never modified by a non-ignored commit.
    pub fn added_never_modified(&self) -> BTreeSet<String> {
        self.added.difference(&self.modified).cloned().collect()
    }
}

/// Parses `--name-status --pretty=format:"__COMMIT__ %H"` output.
///
/// Only `A` and `M` status lines are expected (`--diff-filter=AM`); anything
/// else is ignored.
#[derive(Debug)]
pub struct StatusLogParser<'a> {
    prefix: String,
    ignored: &'a IgnoredCommits,
    cursor: CommitCursor<String>,
    sets: FileStatusSets,
}

impl<'a> StatusLogParser<'a> {
    pub fn new(prefix: impl Into<String>, ignored: &'a IgnoredCommits) -> Self {
        Self {
            prefix: prefix.into(),
            ignored,
            cursor: CommitCursor::NoCurrentCommit,
            sets: FileStatusSets::default(),
        }
    }

    pub fn cursor(&self) -> &CommitCursor<String> {
        &self.cursor
    }

    pub fn feed_line(&mut self, raw_line: &str) {
        let line = raw_line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(payload) = marker_payload(raw_line) {
            self.cursor = if payload.is_empty() {
                warn!("commit header without hash");
                CommitCursor::NoCurrentCommit
            } else {
                CommitCursor::CurrentCommit(payload.to_lowercase())
            };
            return;
        }

        let Some(hash) = self.cursor.current() else {
            return;
        };
        let Some((status, log_path)) = line.split_once('\t') else {
            return;
        };
        let Some(path) = scoped_path(log_path, &self.prefix) else {
            return;
        };

        match status {
            "A" => {
                self.sets.added.insert(path.to_string());
            }
            "M" => {
                if self.ignored.matches(hash) {
                    return;
                }
                self.sets.modified.insert(path.to_string());
            }
            other => debug!(status = other, path, "unexpected status line"),
        }
    }

    pub fn finish(self) -> FileStatusSets {
        debug!(
            added = self.sets.added.len(),
            modified = self.sets.modified.len(),
            "status log parsed"
        );
        self.sets
    }
}

/// Parse a whole status-mode log.
pub fn parse_status_log(output: &str, prefix: &str, ignored: &IgnoredCommits) -> FileStatusSets {
    let mut parser = StatusLogParser::new(prefix, ignored);
    for line in output.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

// ─── Description mode ───────────────────────────────────────────────

/// Position inside the `marker → hash → date → subject → paths*` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptionState {
    AwaitingMarker,
    AwaitingHash,
    AwaitingDate { hash: String },
    AwaitingSubject { hash: String, date: String },
    ConsumingPaths(FileCommitDescription),
}

/// Parses `--pretty=format:"__COMMIT__%n%H%n%ad%n%s" --name-only` output
/// (requested with `--reverse`, so later commits overwrite earlier ones).
#[derive(Debug)]
pub struct DescriptionLogParser {
    prefix: String,
    state: DescriptionState,
    descriptions: HashMap<String, FileCommitDescription>,
}

impl DescriptionLogParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            state: DescriptionState::AwaitingMarker,
            descriptions: HashMap::new(),
        }
    }

    pub fn state(&self) -> &DescriptionState {
        &self.state
    }

    pub fn feed_line(&mut self, raw_line: &str) {
        let line = raw_line.trim();
        if line.is_empty() {
            return;
        }

        // A marker always opens a new block, even mid-header.
        if line == COMMIT_MARKER {
            self.state = DescriptionState::AwaitingHash;
            return;
        }

        let state = std::mem::replace(&mut self.state, DescriptionState::AwaitingMarker);
        self.state = match state {
            DescriptionState::AwaitingMarker => DescriptionState::AwaitingMarker,
            DescriptionState::AwaitingHash => DescriptionState::AwaitingDate {
                hash: line.to_string(),
            },
            DescriptionState::AwaitingDate { hash } => DescriptionState::AwaitingSubject {
                hash,
                date: line.to_string(),
            },
            DescriptionState::AwaitingSubject { hash, date } => {
                DescriptionState::ConsumingPaths(FileCommitDescription {
                    commit_hash: hash,
                    commit_date: date,
                    description: line.to_string(),
                })
            }
            DescriptionState::ConsumingPaths(current) => {
                if let Some(path) = scoped_path(line, &self.prefix) {
                    self.descriptions.insert(path.to_string(), current.clone());
                }
                DescriptionState::ConsumingPaths(current)
            }
        };
    }

    pub fn finish(self) -> HashMap<String, FileCommitDescription> {
        debug!(files = self.descriptions.len(), "description log parsed");
        self.descriptions
    }
}

/// Parse a whole description-mode log.
pub fn parse_description_log(output: &str, prefix: &str) -> HashMap<String, FileCommitDescription> {
    let mut parser = DescriptionLogParser::new(prefix);
    for line in output.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Parse the single-file `--format=%H%n%ad%n%s` answer.
///
/// Needs three non-blank lines; extra lines are ignored.
pub fn parse_single_description(output: &str) -> Option<FileCommitDescription> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let commit_hash = lines.next()?.to_string();
    let commit_date = lines.next()?.to_string();
    let description = lines.next()?.to_string();
    Some(FileCommitDescription {
        commit_hash,
        commit_date,
        description,
    })
}

#[cfg(test)]
#[path = "log_parser_tests.rs"]
mod tests;
