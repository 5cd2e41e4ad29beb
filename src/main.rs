//! Swap Puzzle - terminal front end
//!
//! Plays levels from a JSON catalog and keeps best results in SQLite.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use strum::IntoEnumIterator;
use swap_puzzle::{
    Difficulty, GameSettings, Gallery, LevelCatalog, LevelId, PlayLoop, RecordStore, SessionController,
    SqliteRecordRepository, run_play_loop, start_label,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Play { level, size, custom } => run_play(&cli.db_path, &cli.levels, &cli.settings, level, size, custom).await,
        Command::Gallery => show_gallery(&cli.db_path, &cli.levels),
        Command::Records => show_records(&cli.db_path),
        Command::Settings {
            difficulty,
            volume,
            toggle_mute,
        } => update_settings(&cli.settings, difficulty, volume, toggle_mute),
    }
}

/// Logs go to stderr so they never interleave with the board on stdout.
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,swap_puzzle=debug")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Opens the record store, falling back to memory when the database is unusable.
#[instrument]
fn open_records(db_path: &str) -> RecordStore {
    match SqliteRecordRepository::open(db_path) {
        Ok(repository) => RecordStore::open(repository),
        Err(e) => {
            warn!(error = %e, "Database unavailable, records will not be kept");
            RecordStore::in_memory()
        }
    }
}

/// Run an interactive session on stdin/stdout.
#[instrument(skip_all, fields(level = ?level, size = ?size))]
async fn run_play(
    db_path: &str,
    levels: &std::path::Path,
    settings: &std::path::Path,
    level: Option<String>,
    size: Option<u8>,
    custom: Option<String>,
) -> Result<()> {
    let settings = GameSettings::load(settings).context("Failed to load settings")?;
    let catalog = LevelCatalog::from_file(levels).context("Failed to load level catalog")?;
    let records = open_records(db_path);

    let difficulty = match size {
        Some(side) => Difficulty::try_from(usize::from(side)).context("Invalid board size")?,
        None => settings.difficulty,
    };

    let level_id = match (level, &custom) {
        (_, Some(image)) => {
            println!("Custom image: {}", image);
            LevelId::custom()
        }
        (Some(id), None) => {
            let id = LevelId::new(id);
            if catalog.get(&id).is_none() {
                bail!("No level '{}' in the catalog", id);
            }
            id
        }
        (None, None) => {
            let ids = catalog.ids();
            match records.first_incomplete_level(&ids) {
                Some(id) => id.clone(),
                None => bail!("The level catalog is empty"),
            }
        }
    };

    info!(level = %level_id, %difficulty, "Starting play");
    println!("{} - type 'help' for commands", start_label(&records));
    if settings.muted {
        println!("Sound: muted");
    } else {
        println!("Sound: volume {:.0}%", settings.effective_volume() * 100.0);
    }

    let mut play = PlayLoop::new(SessionController::new(records), catalog, difficulty);
    if let Some(image) = custom {
        play = play.with_custom_image(image);
    }
    for line in play.start(level_id) {
        println!("{}", line);
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut controller = run_play_loop(play, stdin).await?;
    controller
        .records_mut()
        .flush()
        .context("Failed to save records")?;
    Ok(())
}

/// Print the gallery.
#[instrument(skip(levels))]
fn show_gallery(db_path: &str, levels: &std::path::Path) -> Result<()> {
    let catalog = LevelCatalog::from_file(levels).context("Failed to load level catalog")?;
    let records = open_records(db_path);
    let gallery = Gallery::build(&catalog, &records);

    println!("{}/{} levels completed", gallery.completed(), catalog.len());
    print!("{}", gallery);
    Ok(())
}

/// Print every stored record.
#[instrument]
fn show_records(db_path: &str) -> Result<()> {
    let records = open_records(db_path);
    if !records.has_progress() {
        println!("No records yet.");
        return Ok(());
    }
    for (level_id, record) in records.records() {
        println!("{:<16} {}", level_id, record);
    }
    Ok(())
}

/// Apply setting changes, save them, and print the result.
#[instrument(skip(path))]
fn update_settings(
    path: &std::path::Path,
    difficulty: Option<u8>,
    volume: Option<f32>,
    toggle_mute: bool,
) -> Result<()> {
    let mut settings = GameSettings::load(path).context("Failed to load settings")?;
    let changed = difficulty.is_some() || volume.is_some() || toggle_mute;

    if let Some(side) = difficulty {
        settings.difficulty = Difficulty::try_from(usize::from(side)).context("Invalid difficulty")?;
    }
    if let Some(volume) = volume {
        settings.set_volume(volume);
    }
    if toggle_mute {
        settings.toggle_mute();
    }
    if changed {
        settings.save(path).context("Failed to save settings")?;
        info!("Settings updated");
    }

    let choices: Vec<String> = Difficulty::iter()
        .map(|d| format!("{} {}", d.label(), d))
        .collect();
    println!("Difficulty: {} ({})", settings.difficulty.label(), settings.difficulty);
    println!("Volume:     {:.2}", settings.volume);
    println!("Muted:      {}", settings.muted);
    println!("Available:  {}", choices.join(", "));
    Ok(())
}
