//! Nugu CLI binary.
//!
//! - `nugu run` connects to Discord and serves commands
//! - `nugu refresh-stats` recomputes idol game counters

use clap::Parser;
use nugu::{BotConfig, Cli, Commands, init_logging, refresh_stats, run_bot};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref())?;
    init_logging(config.logging(), cli.verbose)?;

    match cli.command {
        Commands::Run => run_bot(&config).await?,
        Commands::RefreshStats => {
            let updated = refresh_stats(&config).await?;
            println!("Recomputed statistics for {} idols", updated);
        }
    }

    Ok(())
}
