use clap::Parser;

use grid_cli::cli::Cli;
use grid_cli::{commands, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_args(&cli.global)?;
    if !grid_logging::initialize(settings.log_destination.clone(), settings.log_level) {
        eprintln!("Warning: logging could not be initialized; continuing without logs");
    }

    commands::run(cli.command, settings).await
}
