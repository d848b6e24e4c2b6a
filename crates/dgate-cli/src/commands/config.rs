//! Config command - configuration management

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dgate_core::Config;
use std::path::PathBuf;
use tracing::info;

use super::{config_search_paths, default_filter_path, Session};

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Generate a configuration file with default values
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "dgate.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config and data file locations
    Paths,
}

/// Execute config command
pub fn execute(session: &Session, args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(session),
        ConfigAction::Generate { output } => generate_config(output),
        ConfigAction::Validate { file } => validate_config(file),
        ConfigAction::Paths => show_paths(session),
    }
}

fn show_config(session: &Session) -> Result<()> {
    let toml_str = session
        .config
        .to_toml()
        .context("Failed to serialize config")?;

    println!("{}", toml_str);
    Ok(())
}

fn generate_config(output: PathBuf) -> Result<()> {
    let toml_str = Config::default()
        .to_toml()
        .context("Failed to serialize config")?;

    let content = format!(
        "# dgate configuration\n\
         # filter.filter_file and filter.registry_file may be set to fixed paths\n\n\
         {}",
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!("Generated config file: {}", output.display());
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load config from {}", file.display()))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("✓ Configuration is valid");
    println!(
        "  Rule warning threshold: {}",
        config.filter.too_many_rules_threshold
    );
    if let Some(path) = &config.filter.filter_file {
        println!("  Filter file: {}", path.display());
    }
    if let Some(path) = &config.filter.registry_file {
        println!("  Registry file: {}", path.display());
    }

    Ok(())
}

fn show_paths(session: &Session) -> Result<()> {
    println!("Configuration file search paths:");
    println!();

    for (i, path) in config_search_paths().iter().enumerate() {
        println!("  {}. {}", i + 1, path.display());
    }

    println!();
    println!("Filter file:");
    println!();
    println!("  active:  {}", session.filter_path.display());
    println!("  default: {}", default_filter_path().display());

    Ok(())
}
