//! Command-line argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::commands::Command;

/// dgate - service domain blacklist manager
///
/// Maintains a filter file of rules that blacklist services from the file
/// or tag domain, answers membership queries against it, and cleans out
/// rules whose services no longer exist.
#[derive(Parser, Debug)]
#[command(name = "dgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "DGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Filter file path
    #[arg(short = 'f', long, value_name = "FILE", env = "DGATE_FILTER", global = true)]
    pub file: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format for logs
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Log file path
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// Compact format
    Compact,
}
