use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    /// Append to a file. Used while the terminal UI owns the screen.
    File(&'a Path),
}

fn env_filter(filter: &str) -> Result<EnvFilter> {
    let directive: Directive = filter
        .parse()
        .with_context(|| format!("Invalid log filter '{}'", filter))?;
    Ok(EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy())
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_tracing(filter: &str, target: LogTarget<'_>) -> Result<()> {
    let env_filter = env_filter(filter)?;

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .try_init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .compact()
                .try_init();
        }
    }
    Ok(())
}
