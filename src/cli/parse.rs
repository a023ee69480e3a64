//! CLI parse: clap types for hashsync. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hashsync - one-way, fingerprint-based directory sync to remote storage
#[derive(Parser)]
#[command(name = "hashsync")]
#[command(about = "Upload new and changed files from a directory tree to remote storage")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces global and ./hashsync.toml loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sync root directory (overrides sync.root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Destination container id (overrides sync.destination)
    #[arg(long)]
    pub destination: Option<String>,

    /// Manifest file path (overrides sync.manifest_path)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload new and changed files, then save the manifest
    Sync {
        /// Show what would be uploaded without uploading or saving
        #[arg(long)]
        dry_run: bool,
        /// Save the manifest after every successful upload
        #[arg(long)]
        incremental: bool,
        /// Record per-file failures and continue instead of aborting
        #[arg(long)]
        skip_errors: bool,
    },
    /// Compare the sync root against the manifest
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the fingerprint of a file
    Hash {
        path: PathBuf,
        /// blake3 or sha256 (defaults to sync.algorithm)
        #[arg(long)]
        algorithm: Option<String>,
    },
    /// Inspect the manifest
    Manifest {
        #[command(subcommand)]
        command: ManifestCommands,
    },
}

#[derive(Subcommand)]
pub enum ManifestCommands {
    /// List manifest entries
    Show {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
