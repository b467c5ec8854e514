//! cancelcheck CLI Entry Point
//!
//! This is the main entry point for the cancelcheck command-line tool.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cancelcheck_cli::{Cli, Commands};
use cancelcheck_core::{BackendInterface, ThresholdConfig, BACKEND_NAME, VERSION};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval(args) => cancelcheck_cli::eval::execute(args)?,
        Commands::Replay(args) => cancelcheck_cli::replay::execute(args)?,
        Commands::Info => {
            let defaults = ThresholdConfig::default();
            println!("cancelcheck {}", env!("CARGO_PKG_VERSION"));
            println!("backend: {BACKEND_NAME} {VERSION}");
            println!(
                "entry points: {}",
                BackendInterface::checkcancellation().implemented()
            );
            println!("threshold-binary32 = {}", defaults.threshold_b32);
            println!("threshold-binary64 = {}", defaults.threshold_b64);
        }
    }

    Ok(())
}
