mod cli;
mod display;
mod error;

use std::path::Path;

use clap::Parser;
use cli::{Cli, RunCommand};
use error::SolarCliResult;
use log::debug;
use solar_insights::config::Config;

const DEFAULT_LOGGING_LEVEL: &str = "warn";

fn main() -> SolarCliResult<()> {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    let _ =
        std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL));
    pretty_env_logger::init_timed();
    let args = Cli::parse();
    debug!("args: {args:?}");
    let config: Config = match dirs::config_dir() {
        // Linux: ~/.config/solar_insights/config.toml
        Some(dir) => read_config_from_toml(&dir.join("solar_insights").join("config.toml"))?,
        None => Config::default(),
    };
    debug!("config: {config:?}");

    if let Some(command) = args.command {
        command.run(config)?;
    }
    Ok(())
}

fn read_config_from_toml(file_path: &Path) -> SolarCliResult<Config> {
    match std::fs::read_to_string(file_path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Error reading config file {}", file_path.display()))
            .into()),
    }
}
