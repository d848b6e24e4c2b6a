//! Logging initialization

use anyhow::{Context, Result};
use dgate_core::config::LoggingConfig;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::{Args, LogFormat};

/// Pick the log level from flags, then config, then INFO
fn level(args: &Args, config: &LoggingConfig) -> Level {
    if args.quiet {
        return Level::ERROR;
    }

    match args.verbose {
        0 => config
            .level
            .as_deref()
            .and_then(|l| Level::from_str(l).ok())
            .unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialize logging based on CLI arguments and configuration
///
/// Console output goes to stderr so command output on stdout stays clean.
pub fn init(args: &Args, config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level(args, config).into())
        .from_env_lossy();

    let log_file = args.log_file.as_ref().or(config.file.as_ref());

    match args.log_format {
        LogFormat::Text => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(args.verbose >= 2)
                    .with_thread_ids(args.verbose >= 3)
                    .with_file(args.verbose >= 3)
                    .with_line_number(args.verbose >= 3),
            );

            if let Some(log_file) = log_file {
                let file = std::fs::File::create(log_file)
                    .with_context(|| format!("Failed to create log file: {}", log_file.display()))?;
                let file_layer = fmt::layer().with_ansi(false).with_writer(file);
                subscriber.with(file_layer).init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr));

            if let Some(log_file) = log_file {
                let file = std::fs::File::create(log_file)
                    .with_context(|| format!("Failed to create log file: {}", log_file.display()))?;
                let file_layer = fmt::layer().json().with_writer(file);
                subscriber.with(file_layer).init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr));

            if let Some(log_file) = log_file {
                let file = std::fs::File::create(log_file)
                    .with_context(|| format!("Failed to create log file: {}", log_file.display()))?;
                let file_layer = fmt::layer().compact().with_ansi(false).with_writer(file);
                subscriber.with(file_layer).init();
            } else {
                subscriber.init();
            }
        }
    }

    Ok(())
}
