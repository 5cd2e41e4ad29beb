//! Line-driven play loop.
//!
//! Reads commands from an async line source and ticks the session clock
//! once per second. All game state lives in the [`SessionController`]; this
//! module only translates text into controller calls and results into text.

use std::str::FromStr;

use anyhow::{Context, Result};
use swap_puzzle_core::{Difficulty, Grid, LevelId, LevelRecord, SessionController, SwapOutcome, format_clock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, instrument};

use crate::catalog::LevelCatalog;

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    /// Exchange the tiles at two positions.
    Swap(usize, usize),
    /// Stop the clock.
    Pause,
    /// Restart the clock.
    Resume,
    /// Print the board.
    Show,
    /// Show the target image and the solved arrangement.
    Hint,
    /// Move on to the next level in the catalog.
    Next,
    /// Reshuffle the current level.
    Restart,
    /// Print the command list.
    Help,
    /// Leave the play loop.
    Quit,
}

impl FromStr for PlayCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();

        let parsed = match command.as_str() {
            "swap" | "s" => {
                let a = words.next().and_then(|w| w.parse().ok());
                let b = words.next().and_then(|w| w.parse().ok());
                match (a, b) {
                    (Some(a), Some(b)) => Self::Swap(a, b),
                    _ => return Err(CommandError::BadSwap),
                }
            }
            "pause" | "p" => Self::Pause,
            "resume" | "r" => Self::Resume,
            "show" => Self::Show,
            "hint" | "h" => Self::Hint,
            "next" | "n" => Self::Next,
            "restart" => Self::Restart,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        if words.next().is_some() {
            return Err(CommandError::TrailingInput(line.trim().to_string()));
        }
        Ok(parsed)
    }
}

/// A line that is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CommandError {
    /// Command word not recognised.
    #[display("Unknown command '{}' (try 'help')", _0)]
    Unknown(String),

    /// `swap` without two positions.
    #[display("Usage: swap <position> <position>")]
    BadSwap,

    /// Extra words after a complete command.
    #[display("Unexpected input in '{}'", _0)]
    TrailingInput(String),
}

impl std::error::Error for CommandError {}

const HELP: &str = "\
Commands:
  swap A B   exchange the tiles at positions A and B
  pause      stop the clock
  resume     continue after a pause
  show       print the board
  hint       show the target picture and where every tile belongs
  next       play the next level
  restart    reshuffle this level
  quit       leave
Positions count from 0, left to right, top to bottom. Tiles marked * are home and locked.";

/// Text produced by one command, and whether the loop should end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    /// Lines to show the player.
    pub lines: Vec<String>,
    /// Leave the loop after showing `lines`.
    pub quit: bool,
}

impl Step {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

/// Play state around a [`SessionController`].
#[derive(Debug)]
pub struct PlayLoop {
    controller: SessionController,
    catalog: LevelCatalog,
    difficulty: Difficulty,
    custom_image: Option<String>,
}

impl PlayLoop {
    /// Wraps a controller for interactive play.
    #[instrument(skip(controller, catalog))]
    pub fn new(controller: SessionController, catalog: LevelCatalog, difficulty: Difficulty) -> Self {
        Self {
            controller,
            catalog,
            difficulty,
            custom_image: None,
        }
    }

    /// Sets the image shown by `hint` for the custom level.
    pub fn with_custom_image(mut self, image: impl Into<String>) -> Self {
        self.custom_image = Some(image.into());
        self
    }

    /// Starts a level at the configured difficulty and describes it.
    #[instrument(skip(self))]
    pub fn start(&mut self, level_id: LevelId) -> Vec<String> {
        let title = self
            .catalog
            .get(&level_id)
            .map_or_else(|| level_id.to_string(), |level| level.title().clone());
        self.controller.start(level_id, self.difficulty.side());

        let mut lines = vec![format!("Level: {} ({})", title, self.difficulty)];
        lines.extend(self.render());
        lines
    }

    /// Applies one command.
    #[instrument(skip(self))]
    pub fn handle(&mut self, command: PlayCommand) -> Step {
        match command {
            PlayCommand::Swap(a, b) => Step::lines(self.swap(a, b)),
            PlayCommand::Pause => {
                let line = if self.controller.pause() {
                    "Paused. Type 'resume' to continue."
                } else {
                    "Nothing to pause."
                };
                Step::lines(vec![line.to_string()])
            }
            PlayCommand::Resume => {
                let line = if self.controller.resume() {
                    "Resumed."
                } else {
                    "Not paused."
                };
                Step::lines(vec![line.to_string()])
            }
            PlayCommand::Show => Step::lines(self.render()),
            PlayCommand::Hint => Step::lines(self.hint()),
            PlayCommand::Next => {
                let current = self.controller.session().map(|session| session.level_id().clone());
                let next = match current {
                    Some(id) => self.catalog.next_after(&id),
                    None => self.catalog.levels().first(),
                };
                match next.map(|level| level.id().clone()) {
                    Some(id) => Step::lines(self.start(id)),
                    None => Step::lines(vec!["No levels in the catalog.".to_string()]),
                }
            }
            PlayCommand::Restart => match self.controller.session().map(|session| session.level_id().clone()) {
                Some(id) => Step::lines(self.start(id)),
                None => Step::lines(vec!["No level in play.".to_string()]),
            },
            PlayCommand::Help => Step::lines(HELP.lines().map(str::to_string).collect()),
            PlayCommand::Quit => {
                self.controller.exit();
                Step {
                    lines: vec!["Bye.".to_string()],
                    quit: true,
                }
            }
        }
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self) -> bool {
        self.controller.tick()
    }

    /// The wrapped controller.
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Unwraps the controller, e.g. to flush records on exit.
    pub fn into_controller(self) -> SessionController {
        self.controller
    }

    fn swap(&mut self, a: usize, b: usize) -> Vec<String> {
        match self.controller.apply_swap(a, b) {
            SwapOutcome::Rejected(reason) => vec![format!("Can't swap: {}", reason)],
            SwapOutcome::Swapped { .. } => self.render(),
            SwapOutcome::Solved(outcome) => {
                let mut lines = self.render();
                let Some(session) = self.controller.session() else {
                    return lines;
                };
                let run: LevelRecord = session.result();
                lines.push(format!("Solved in {} with {} moves!", run.display_time(), run.moves()));
                if outcome.improved {
                    lines.push("New record!".to_string());
                }
                let best = outcome.best(run);
                lines.push(format!("Best: {} / {} moves", best.display_time(), best.moves()));
                lines.push("Type 'next' for the next level or 'quit' to leave.".to_string());
                lines
            }
        }
    }

    /// Leaves the clock and move count alone.
    fn hint(&self) -> Vec<String> {
        let Some(session) = self.controller.session() else {
            return vec!["No level in play.".to_string()];
        };
        let image = if session.level_id().as_str() == LevelId::CUSTOM {
            self.custom_image.clone()
        } else {
            self.catalog.get(session.level_id()).map(|level| level.image().clone())
        };

        let mut lines = vec![format!(
            "Target image: {}",
            image.as_deref().unwrap_or("(unknown)")
        )];
        lines.push("Solved board:".to_string());
        lines.extend(Grid::solved(session.grid().side()).display().lines().map(str::to_string));
        lines
    }

    fn render(&self) -> Vec<String> {
        let (Some(snapshot), Some(session)) = (self.controller.snapshot(), self.controller.session()) else {
            return vec!["No level in play.".to_string()];
        };
        let mut lines = vec![format!(
            "Time {}  Moves {}  Home {}/{}  {}",
            format_clock(snapshot.elapsed_seconds),
            snapshot.move_count,
            snapshot.locked_positions.len(),
            session.grid().len(),
            snapshot.phase
        )];
        lines.extend(session.grid().display().lines().map(str::to_string));
        lines
    }
}

/// Runs the play loop until `quit` or end of input, returning the controller.
///
/// Commands are read line by line from `input`; the clock ticks on a fixed
/// one-second interval in between.
#[instrument(skip_all)]
pub async fn run<R>(mut play: PlayLoop, input: R) -> Result<SessionController>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let period = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Play loop started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                play.tick();
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read command")? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<PlayCommand>() {
                    Ok(command) => {
                        let step = play.handle(command);
                        for text in &step.lines {
                            println!("{}", text);
                        }
                        if step.quit {
                            break;
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    info!("Play loop finished");
    Ok(play.into_controller())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Level;
    use swap_puzzle_core::{RecordStore, SessionPhase};

    fn play_on(arrangement: Vec<usize>) -> PlayLoop {
        let catalog = LevelCatalog::new(vec![Level::new("a", "a.jpg", "Alpha"), Level::new("b", "b.jpg", "Beta")])
            .expect("unique ids");
        let mut controller = SessionController::new(RecordStore::in_memory());
        let grid = Grid::from_home_indices(2, arrangement).expect("valid arrangement");
        controller.start_with_grid(LevelId::from("a"), grid);
        PlayLoop::new(controller, catalog, Difficulty::Easy)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("swap 1 2".parse::<PlayCommand>(), Ok(PlayCommand::Swap(1, 2)));
        assert_eq!("S 0 3".parse::<PlayCommand>(), Ok(PlayCommand::Swap(0, 3)));
        assert_eq!("pause".parse::<PlayCommand>(), Ok(PlayCommand::Pause));
        assert_eq!("q".parse::<PlayCommand>(), Ok(PlayCommand::Quit));
        assert_eq!("swap 1".parse::<PlayCommand>(), Err(CommandError::BadSwap));
        assert_eq!("swap a b".parse::<PlayCommand>(), Err(CommandError::BadSwap));
        assert!(matches!("dance".parse::<PlayCommand>(), Err(CommandError::Unknown(_))));
        assert!(matches!("pause now".parse::<PlayCommand>(), Err(CommandError::TrailingInput(_))));
    }

    #[test]
    fn test_solving_reports_new_record() {
        let mut play = play_on(vec![1, 0, 3, 2]);
        play.handle(PlayCommand::Swap(0, 1));
        let step = play.handle(PlayCommand::Swap(2, 3));

        assert!(step.lines.iter().any(|line| line == "New record!"));
        assert_eq!(play.controller().phase(), SessionPhase::Solved);
    }

    #[test]
    fn test_locked_swap_explained() {
        let mut play = play_on(vec![0, 2, 1, 3]);
        let step = play.handle(PlayCommand::Swap(0, 1));
        assert_eq!(step.lines, vec!["Can't swap: Tile at position 0 is locked".to_string()]);
    }

    #[test]
    fn test_next_moves_through_catalog() {
        let mut play = play_on(vec![1, 0, 3, 2]);
        play.handle(PlayCommand::Next);
        let session = play.controller().session().expect("session");
        assert_eq!(session.level_id(), &LevelId::from("b"));
        assert_eq!(session.grid().len(), 4);
    }

    #[test]
    fn test_hint_shows_target_without_touching_session() {
        let mut play = play_on(vec![1, 0, 3, 2]);
        play.tick();
        play.handle(PlayCommand::Swap(0, 1));
        let before = play.controller().snapshot();

        let step = play.handle(PlayCommand::Hint);

        assert_eq!(step.lines[0], "Target image: a.jpg");
        assert_eq!(step.lines[1], "Solved board:");
        assert_eq!(&step.lines[2..], &["0* 1*", "2* 3*"]);
        assert!(!step.quit);
        assert_eq!(play.controller().snapshot(), before);
        assert_eq!("hint".parse::<PlayCommand>(), Ok(PlayCommand::Hint));
    }

    #[test]
    fn test_hint_for_custom_image() {
        let catalog = LevelCatalog::new(vec![Level::new("a", "a.jpg", "Alpha")]).expect("unique ids");
        let mut controller = SessionController::new(RecordStore::in_memory());
        let grid = Grid::from_home_indices(2, vec![1, 0, 3, 2]).expect("valid arrangement");
        controller.start_with_grid(LevelId::custom(), grid);
        let mut play = PlayLoop::new(controller, catalog, Difficulty::Easy).with_custom_image("me.png");

        let step = play.handle(PlayCommand::Hint);
        assert_eq!(step.lines[0], "Target image: me.png");
    }

    #[test]
    fn test_quit_ends_session() {
        let mut play = play_on(vec![1, 0, 3, 2]);
        let step = play.handle(PlayCommand::Quit);
        assert!(step.quit);
        assert_eq!(play.controller().phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_run_stops_at_quit() {
        let play = play_on(vec![1, 0, 3, 2]);
        let input = tokio::io::BufReader::new(&b"swap 0 1\nbogus\nquit\nswap 2 3\n"[..]);

        let controller = run(play, input).await.expect("loop runs");
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.records().records().is_empty());
    }
}
