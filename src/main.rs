//! mlinterpret - Main Entry Point
//!
//! Partial dependence and permutation importance from the command line.

use clap::Parser;
use mlinterpret::cli::{cmd_importance, cmd_info, cmd_pdp, load_config, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so tables and JSON on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mlinterpret=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Pdp(args) => cmd_pdp(&args, &config)?,
        Commands::Importance(args) => cmd_importance(&args, &config)?,
        Commands::Info { data } => cmd_info(&data)?,
    }

    Ok(())
}
