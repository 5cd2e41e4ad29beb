//! Command-line interface for swap_puzzle.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Swap Puzzle - rebuild a shuffled picture one swap at a time
#[derive(Parser, Debug)]
#[command(name = "swap_puzzle")]
#[command(about = "Swap tile puzzle with per-level best times", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the records database (created if it doesn't exist)
    #[arg(long, global = true, default_value = "swap_puzzle.db")]
    pub db_path: String,

    /// Path to the level catalog JSON
    #[arg(long, global = true, default_value = "levels.json")]
    pub levels: PathBuf,

    /// Path to the settings TOML
    #[arg(long, global = true, default_value = "settings.toml")]
    pub settings: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a level (defaults to the first one not yet completed)
    Play {
        /// Level id from the catalog
        #[arg(short, long, conflicts_with = "custom")]
        level: Option<String>,

        /// Board side length for this session only (2-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=5))]
        size: Option<u8>,

        /// Play an image outside the catalog; its record is kept under the custom id
        #[arg(long)]
        custom: Option<String>,
    },

    /// Show every level with its best time and moves
    Gallery,

    /// List stored records
    Records,

    /// Show or change settings
    Settings {
        /// Board side length for new sessions (2-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=5))]
        difficulty: Option<u8>,

        /// Music volume (0.0-1.0)
        #[arg(short, long)]
        volume: Option<f32>,

        /// Flip the mute switch
        #[arg(long)]
        toggle_mute: bool,
    },
}
