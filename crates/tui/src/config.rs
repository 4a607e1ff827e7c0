pub use kanban_core::config::*;

use crate::cli::Cli;

pub fn from_cli(cli: &Cli) -> anyhow::Result<AppConfig> {
    AppConfig::discover(ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        base_url: cli.base_url.clone(),
        log_filter: cli.log_filter.clone(),
    })
}
