// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `syncwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "syncwatch",
    version,
    about = "Watch directories and mirror them to rsync destinations on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the configuration file (YAML).
    ///
    /// Default: `config.yaml` in the home directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SYNCWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// rsync executable to use, as a name looked up on PATH or a path.
    #[arg(long, value_name = "BINARY", default_value = "rsync")]
    pub rsync_binary: String,

    /// Load and validate the configuration, print it, and exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
