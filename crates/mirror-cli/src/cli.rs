//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Mirror - keep a replica directory identical to a source directory
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Mirror continuously on an interval and on source changes
    ///
    /// Runs once immediately, then every interval and shortly after any
    /// change in the source tree, until interrupted with Ctrl-C.
    ///
    /// Examples:
    ///   mirror run ./src ./backup ./mirror.log        # every 60 seconds
    ///   mirror run ./src ./backup ./mirror.log 10     # every 10 seconds
    ///   mirror run --config mirror.toml               # settings from a file
    Run(RunArgs),

    /// Mirror once and exit
    Once(OnceArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Source directory
    #[arg(required_unless_present = "config")]
    pub source: Option<PathBuf>,

    /// Replica directory, created if missing
    #[arg(required_unless_present = "config")]
    pub replica: Option<PathBuf>,

    /// Log file, appended to
    #[arg(required_unless_present = "config")]
    pub log_file: Option<PathBuf>,

    /// Seconds between runs [default: 60]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_seconds: Option<u64>,

    /// Load settings from a TOML, JSON or YAML file
    #[arg(short, long, env = "MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Match paths case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Do not watch the source for changes; run on the interval only
    #[arg(long)]
    pub no_watch: bool,

    /// Quiet period after a change before running, in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct OnceArgs {
    /// Source directory
    pub source: PathBuf,

    /// Replica directory, created if missing
    pub replica: PathBuf,

    /// Show what would change without touching the replica
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Match paths case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,
}
