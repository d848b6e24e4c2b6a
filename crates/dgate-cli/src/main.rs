//! dgate CLI
//!
//! Command-line interface for the service domain filter.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use args::Args;
use commands::Session;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let session = Session::from_args(&args)?;

    // Initialize logging
    logging::init(&args, &session.config.logging)?;

    let result = commands::execute(args.command, &session);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}
