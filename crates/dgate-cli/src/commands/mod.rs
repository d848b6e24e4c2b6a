//! CLI commands

pub mod completions;
pub mod config;
pub mod rules;

use anyhow::{Context, Result};
use clap::Subcommand;
use dgate_core::Config;
use std::path::PathBuf;

use crate::args::Args;

/// Application name used for platform directories
pub const APP_NAME: &str = "dgate";

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all rules in the filter
    List,

    /// Add or retype a rule
    Add(rules::AddArgs),

    /// Remove a rule
    Remove(rules::KeyArgs),

    /// Check whether a service is allowed
    Check(rules::KeyArgs),

    /// Print the allowed subset of the given services
    Filter(rules::FilterArgs),

    /// Drop rules whose services no longer exist in a registry
    Clean(rules::CleanArgs),

    /// Summarize changes between two filter files
    Diff(rules::DiffArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Resolved configuration and paths shared by commands
#[derive(Debug)]
pub struct Session {
    /// Loaded or default configuration
    pub config: Config,
    /// Filter file to operate on
    pub filter_path: PathBuf,
}

impl Session {
    /// Resolve configuration and the filter path from arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = match args.config.clone().or_else(find_config_file) {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        let filter_path = args
            .file
            .clone()
            .or_else(|| config.filter.filter_file.clone())
            .unwrap_or_else(default_filter_path);

        Ok(Self { config, filter_path })
    }
}

/// Default filter file location
pub fn default_filter_path() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("rules.json"))
        .unwrap_or_else(|| PathBuf::from("rules.json"))
}

/// First existing config file among the search paths
pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths().into_iter().find(|path| path.exists())
}

/// Config file search paths, in priority order
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("dgate.toml")];

    if let Some(dirs) = directories::ProjectDirs::from("", "", APP_NAME) {
        paths.push(dirs.config_dir().join("config.toml"));
    }

    paths
}

/// Dispatch a parsed command
pub fn execute(command: Command, session: &Session) -> Result<()> {
    match command {
        Command::List => rules::list(session),
        Command::Add(add) => rules::add(session, add),
        Command::Remove(key) => rules::remove(session, key),
        Command::Check(key) => rules::check(session, key),
        Command::Filter(filter) => rules::filter(session, filter),
        Command::Clean(clean) => rules::clean(session, clean),
        Command::Diff(diff) => rules::diff(diff),
        Command::Config(config_args) => config::execute(session, config_args),
        Command::Completions(comp_args) => completions::execute(comp_args),
    }
}
