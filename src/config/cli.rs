use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "syskit")]
#[command(about = "System automation toolkit: backups, file maintenance, logs, metrics and periodic tasks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML); defaults to ./syskit.toml when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit the toolkit's own diagnostics as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Zip a folder or file into a backup archive
    Backup {
        source: PathBuf,
        destination: PathBuf,

        /// Glob patterns to skip, e.g. '*.tmp' (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Delete the source after a successful backup
        #[arg(long)]
        clean: bool,
    },

    /// Extract a backup archive
    Restore {
        archive: PathBuf,
        destination: PathBuf,
    },

    /// Copy a file or directory tree
    Copy {
        source: PathBuf,
        destination: PathBuf,

        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Move a file or directory tree
    Move {
        source: PathBuf,
        destination: PathBuf,

        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Delete a file or directory tree
    Delete { path: PathBuf },

    /// Delete files older than N days
    Clean {
        path: PathBuf,

        #[arg(long)]
        days: u64,

        #[arg(short, long)]
        recursive: bool,

        #[arg(short, long)]
        exclude: Vec<String>,

        /// Count matching files without deleting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Keep only the N newest files matching a pattern
    Keep {
        path: PathBuf,

        #[arg(long, default_value = "5")]
        keep: usize,

        #[arg(long, default_value = "*")]
        pattern: String,
    },

    /// Total size of a directory tree
    Size { path: PathBuf },

    /// List files in a directory
    List {
        path: PathBuf,

        /// Glob filter on file names, e.g. '*.log'
        #[arg(short, long)]
        pattern: Option<String>,

        /// Show size and modification time per file
        #[arg(short, long)]
        long: bool,
    },

    /// Show host environment info
    Info,

    /// Show current system metrics as JSON
    Monitor,

    /// Show the system health verdict
    Health,

    /// Poll system metrics on an interval
    Watch {
        /// Seconds between samples
        #[arg(long, default_value = "10")]
        every: u64,

        /// Stop after N samples (default: run until interrupted)
        #[arg(long)]
        count: Option<u64>,
    },

    /// Convert a CSV file into a styled XLSX
    Export {
        input: PathBuf,
        output: PathBuf,
    },

    /// Re-encode an image in place to shrink it
    Optimize {
        path: PathBuf,

        /// 1-100; defaults to the configured quality
        #[arg(short, long)]
        quality: Option<u8>,
    },

    /// Show recent log book entries
    Logs {
        #[arg(long)]
        category: Option<String>,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Run a command through the periodic-task gate (at most once per interval)
    Tick {
        /// Interval like '5 minutes'
        #[arg(long)]
        every: String,

        /// Task key in the shared state file
        #[arg(long, default_value = "default")]
        key: String,

        /// Stop firing after N runs (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_runs: u32,

        /// Command and arguments to execute
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
}
