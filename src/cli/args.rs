//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Working root to analyze (may be a subdirectory of the repository)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Commit whose modifications should not count (hash, short hash, tag, branch). Repeatable.
    #[arg(long = "ignore-commit", value_name = "REF")]
    pub ignore_commits: Vec<String>,

    /// File listing commits to ignore, one per line (# and // comments allowed)
    #[arg(long, value_name = "FILE")]
    pub ignore_commits_file: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct DescribeArgs {
    /// Paths relative to the root
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Working root (may be a subdirectory of the repository)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Skip the bulk history pass; query each path individually
    #[arg(long)]
    pub no_warm: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct TrackedArgs {
    /// Pathspecs relative to the repository root (default: everything)
    pub pathspecs: Vec<String>,

    /// Path inside the target repository
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Parser, Debug)]
pub struct LastCommitArgs {
    /// Pathspecs relative to the repository root (default: everything)
    pub pathspecs: Vec<String>,

    /// Path inside the target repository
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct IsAncestorArgs {
    /// Candidate ancestor commit
    pub ancestor: String,

    /// Candidate descendant commit
    pub descendant: String,

    /// Path inside the target repository
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,
}
