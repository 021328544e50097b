//! CLI layer: argument parsing, logging setup, and subcommand implementations.

pub mod args;

pub use args::*;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use git_attrib::{AttribError, FileCommitDescription, HistoryEngine, load_commit_list};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Git history attribution: last-change timestamps, added-never-modified files and commit descriptions
#[derive(Parser, Debug)]
#[command(name = "git-attrib", version, about, after_help = "\
Run 'git-attrib <COMMAND> --help' for detailed options.\n\
Set RUST_LOG to override --log-level with a full filter (e.g. RUST_LOG=git_attrib=debug).")]
pub(crate) struct Cli {
    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit log records as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Last-change timestamp per file and files added but never modified
    History(HistoryArgs),

    /// Hash, date and subject of the last commit touching each path
    Describe(DescribeArgs),

    /// List tracked files under the given pathspecs
    Tracked(TrackedArgs),

    /// Timestamp of the last commit touching each tracked file
    LastCommit(LastCommitArgs),

    /// Check whether one commit is an ancestor of another
    IsAncestor(IsAncestorArgs),
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    let result = match cli.command {
        Commands::History(args) => cmd_history(args),
        Commands::Describe(args) => cmd_describe(args),
        Commands::Tracked(args) => cmd_tracked(args),
        Commands::LastCommit(args) => cmd_last_commit(args),
        Commands::IsAncestor(args) => cmd_is_ancestor(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_level(level: &str) -> LevelFilter {
    match level {
        "error" => LevelFilter::ERROR,
        "info" => LevelFilter::INFO,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::WARN,
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ─── history ────────────────────────────────────────────────────────

/// Merge `--ignore-commit` flags with an optional commit-list file.
fn collect_ignored_commits(
    flags: &[String],
    list_file: Option<&Path>,
) -> Result<BTreeSet<String>, AttribError> {
    let mut commits = match list_file {
        Some(path) => load_commit_list(path)?,
        None => BTreeSet::new(),
    };
    for flag in flags {
        let commit = flag.trim();
        if commit.is_empty() {
            continue;
        }
        if commit.chars().any(char::is_whitespace) {
            return Err(AttribError::InvalidArgs(format!(
                "--ignore-commit '{}' must not contain spaces",
                commit
            )));
        }
        commits.insert(commit.to_lowercase());
    }
    Ok(commits)
}

fn cmd_history(args: HistoryArgs) -> Result<(), AttribError> {
    let ignored = collect_ignored_commits(&args.ignore_commits, args.ignore_commits_file.as_deref())?;

    let start = Instant::now();
    let engine = HistoryEngine::new();
    let history = engine.compute_history(&args.root, &ignored)?;
    info!(
        elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
        "history query finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if !history.is_tracked {
        eprintln!("{} is not inside a git work tree; no history available.", args.root.display());
        return Ok(());
    }

    for (path, timestamp) in &history.file_timestamps {
        println!("{}\t{}", timestamp, path);
    }
    println!();
    println!("Added, never modified ({}):", history.added_never_modified.len());
    for path in &history.added_never_modified {
        println!("  {}", path);
    }
    eprintln!(
        "{} file(s) with history, {} ignored commit ref(s).",
        history.file_timestamps.len(),
        ignored.len()
    );
    Ok(())
}

// ─── describe ───────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
struct DescribedPath<'a> {
    path: &'a str,
    last_change: Option<FileCommitDescription>,
}

fn cmd_describe(args: DescribeArgs) -> Result<(), AttribError> {
    let mut engine = HistoryEngine::new();
    if !args.no_warm {
        engine.warm_descriptions(&args.root);
    }

    let described: Vec<DescribedPath> = args
        .paths
        .iter()
        .map(|path| DescribedPath {
            path,
            last_change: engine.file_description(&args.root, path),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&described)?);
        return Ok(());
    }

    for entry in &described {
        match &entry.last_change {
            Some(desc) => println!(
                "{}\t{}\t{}\t{}",
                entry.path,
                short_hash(&desc.commit_hash),
                desc.commit_date,
                desc.description
            ),
            None => println!("{}\t-", entry.path),
        }
    }
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

// ─── tracked / last-commit ──────────────────────────────────────────

fn cmd_tracked(args: TrackedArgs) -> Result<(), AttribError> {
    let engine = HistoryEngine::new();
    let repo_root = engine.repo_root(&args.root)?;
    let files = engine.list_tracked_files(&repo_root, &args.pathspecs)?;
    for file in &files {
        println!("{}", file.display());
    }
    eprintln!("{} tracked file(s).", files.len());
    Ok(())
}

fn cmd_last_commit(args: LastCommitArgs) -> Result<(), AttribError> {
    let engine = HistoryEngine::new();
    let repo_root = engine.repo_root(&args.root)?;
    let files = engine.list_tracked_files(&repo_root, &args.pathspecs)?;
    let timestamps = engine.last_commit_timestamps(&repo_root, &args.pathspecs)?;

    let mut found: BTreeMap<String, i64> = BTreeMap::new();
    let mut skipped = 0usize;
    for file in &files {
        let rel = relative_slash_path(&repo_root, file);
        match timestamps.get(&rel) {
            Some(&ts) if file.is_file() => {
                found.insert(rel, ts);
            }
            _ => skipped += 1,
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        for (path, ts) in &found {
            println!("{}\t{}", ts, path);
        }
    }
    eprintln!("Found last commit for {} file(s). Skipped {} file(s).", found.len(), skipped);
    Ok(())
}

fn relative_slash_path(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file);
    rel.iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ─── is-ancestor ────────────────────────────────────────────────────

fn cmd_is_ancestor(args: IsAncestorArgs) -> Result<(), AttribError> {
    let mut engine = HistoryEngine::new();
    println!("{}", engine.is_ancestor(&args.root, &args.ancestor, &args.descendant));
    Ok(())
}
