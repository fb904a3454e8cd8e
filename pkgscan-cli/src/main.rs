//! pkgscan CLI -- submit package manifests to a remote vulnerability scan service.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging is set up before the command runs, so a broken config file
    // must not prevent it. The command itself reports config errors.
    let mut general = commands::load_config(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_default();
    if let Some(level) = cli.log_level.clone() {
        general.log_level = level;
    }

    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    tracing::debug!(config = %cli.config.display(), "pkgscan starting");

    let writer = OutputWriter::new(cli.output);
    let result = match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
