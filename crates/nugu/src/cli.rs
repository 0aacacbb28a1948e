//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nugu - Discord bot for the nugu idol guessing game
#[derive(Parser, Debug)]
#[command(name = "nugu")]
#[command(about = "Discord bot for the nugu idol guessing game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./nugu.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Connect to Discord and serve commands until stopped
    Run,

    /// Recompute every idol's game counters from stored games, then exit
    RefreshStats,
}
