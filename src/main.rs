//! Wordleish - play an on-chain word game from the terminal.

mod cli;
mod commands;

use cli::Cli;
use tracing::{debug, error};
use wordleish::config::Config;
use wordleish::error::Result;
use wordleish::logging;

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Precedence:
    // 1. CLI arguments (highest)
    // 2. Environment variables
    // 3. Config file
    let config_path = cli.config_path();
    debug!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_defaults()?;
    cli.apply_to(&mut config);
    config.validate()?;

    commands::dispatch(&cli.command, &config).await
}
