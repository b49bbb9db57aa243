use clap::Parser;
use pubsync::config::{Cli, Command};
use pubsync::Config;
use std::process::exit;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let layer = fmt::layer().compact().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(layer).with(filter).init();

    match run() {
        Ok(true) => exit(0),
        Ok(false) => exit(1),
        Err(error) => {
            error!("{error:#}");
            exit(1);
        }
    }
}

/// Returns whether the command succeeded.
fn run() -> anyhow::Result<bool> {
    match Cli::parse().command {
        Command::Sync(args) => {
            // Convert CLI args to Config - this validates immediately
            let config = Config::try_from(args)?;
            pubsync::commands::sync::run(&config)?;
            Ok(true)
        }
        Command::Verify(args) => {
            let config = Config::try_from(args)?;
            let report = pubsync::commands::verify::run(&config)?;
            Ok(report.is_ok())
        }
    }
}
