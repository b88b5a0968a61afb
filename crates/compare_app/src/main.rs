mod config;
mod platform;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = config::Cli::parse();
    let config = config::resolve(cli)?;
    platform::logging::initialize(config.log, config.log_level);
    platform::run_app(config)
}
