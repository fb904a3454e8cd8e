//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O happen here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// pkgscan -- scan package manifests for known vulnerabilities.
///
/// Use `pkgscan <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "pkgscan", version, about, long_about = None)]
pub struct Cli {
    /// Path to the pkgscan.toml configuration file.
    #[arg(short, long, default_value = "pkgscan.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit manifests to the scan service and print the results.
    Scan(ScanArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Scan package manifests (files, or directories containing them).
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Manifest files or directories to scan.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Run the scans one after another instead of in parallel.
    #[arg(long)]
    pub sequential: bool,

    /// Maximum number of concurrent scans (overrides sca.max_workers).
    #[arg(long)]
    pub workers: Option<usize>,
}

// ---- config ----

/// Manage pkgscan configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, sca).
        #[arg(long)]
        section: Option<String>,
    },
}
