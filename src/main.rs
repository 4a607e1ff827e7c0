use anyhow::Result;
use clap::Parser;

use kanban_sync::cli::{Cli, CliCommand};
use kanban_sync::telemetry::{init_tracing, LogTarget};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = kanban_sync::config::from_cli(&cli)?;

    match cli.command {
        Some(CliCommand::Tui) | None => {
            let log_path = config.log_path();
            init_tracing(config.log_filter(), LogTarget::File(&log_path))?;
            kanban_sync::tui::run(config)?;
        }
        Some(command) => {
            init_tracing(config.log_filter(), LogTarget::Stderr)?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            kanban_sync::commands::execute(&config, command, &mut handle)?;
        }
    }

    Ok(())
}
