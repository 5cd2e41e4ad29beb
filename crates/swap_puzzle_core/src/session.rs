//! Play sessions and the controller that drives them.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!          Solved -> Idle (next level or menu exit)
//! ```
//!
//! Every operation is total. Calls that make no sense in the current phase
//! (a swap while paused, a tick after solving) change nothing and report
//! that through their return value.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::contracts::SwapRejection;
use crate::grid::{self, Grid};
use crate::record::{LevelId, LevelRecord, RecordOutcome};
use crate::store::RecordStore;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum SessionPhase {
    /// No level in play.
    Idle,
    /// Clock running, swaps accepted.
    Running,
    /// Clock stopped, swaps refused.
    Paused,
    /// Every tile home; clock stopped for good.
    Solved,
}

/// One play-through of a level.
#[derive(Debug, Clone)]
pub struct Session {
    level_id: LevelId,
    grid: Grid,
    elapsed_seconds: u32,
    move_count: u32,
    phase: SessionPhase,
    completion: Option<RecordOutcome>,
}

impl Session {
    fn new(level_id: LevelId, grid: Grid) -> Self {
        Self {
            level_id,
            grid,
            elapsed_seconds: 0,
            move_count: 0,
            phase: SessionPhase::Running,
            completion: None,
        }
    }

    /// Level being played.
    pub fn level_id(&self) -> &LevelId {
        &self.level_id
    }

    /// Current board.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Seconds the clock has run.
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    /// Successful swaps so far.
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Current phase (never [`SessionPhase::Idle`]).
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True while paused.
    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    /// True once every tile is home.
    pub fn is_solved(&self) -> bool {
        self.phase == SessionPhase::Solved
    }

    /// Record comparison made when the session was solved.
    pub fn completion(&self) -> Option<RecordOutcome> {
        self.completion
    }

    /// This run's result as a record.
    pub fn result(&self) -> LevelRecord {
        LevelRecord::new(self.elapsed_seconds, self.move_count)
    }
}

/// What the rendering side needs after each state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Level being played.
    pub level_id: LevelId,
    /// Positions whose tile is home.
    pub locked_positions: BTreeSet<usize>,
    /// Every tile home.
    pub is_solved: bool,
    /// Seconds on the clock.
    pub elapsed_seconds: u32,
    /// Successful swaps.
    pub move_count: u32,
    /// Current phase.
    pub phase: SessionPhase,
}

/// Result of a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Nothing changed.
    Rejected(SwapRejection),
    /// Tiles exchanged; puzzle not yet solved.
    Swapped {
        /// Move count after this swap.
        move_count: u32,
        /// Number of tiles now home.
        locked: usize,
    },
    /// Tiles exchanged and the puzzle is solved; the record store was consulted.
    Solved(RecordOutcome),
}

/// Drives sessions and owns the record store they report to.
#[derive(Debug)]
pub struct SessionController {
    records: RecordStore,
    session: Option<Session>,
}

impl SessionController {
    /// Creates an idle controller.
    #[instrument(skip(records))]
    pub fn new(records: RecordStore) -> Self {
        info!(records = records.records().len(), "Creating session controller");
        Self { records, session: None }
    }

    /// Starts a level on a freshly shuffled `grid_size`×`grid_size` board.
    ///
    /// Any previous session is discarded.
    #[instrument(skip(self))]
    pub fn start(&mut self, level_id: LevelId, grid_size: usize) -> &Session {
        self.start_with_grid(level_id, grid::generate(grid_size))
    }

    /// Starts a level, shuffling with the given RNG.
    #[instrument(skip(self, rng))]
    pub fn start_with<R: Rng>(&mut self, level_id: LevelId, grid_size: usize, rng: &mut R) -> &Session {
        self.start_with_grid(level_id, grid::generate_with(grid_size, rng))
    }

    /// Starts a level on a given board.
    ///
    /// A board that is already solved (only possible for one tile or none)
    /// completes the session immediately.
    #[instrument(skip(self, grid), fields(side = grid.side()))]
    pub fn start_with_grid(&mut self, level_id: LevelId, grid: Grid) -> &Session {
        if let Some(old) = &self.session {
            debug!(level_id = %old.level_id, phase = %old.phase, "Discarding previous session");
        }
        info!(level_id = %level_id, tiles = grid.len(), "Starting session");

        let mut session = Session::new(level_id, grid);
        if session.grid.is_solved() {
            warn!("Board starts solved, completing immediately");
            Self::complete(&mut self.records, &mut session);
        }
        self.session.insert(session)
    }

    /// Swaps the tiles at two positions.
    ///
    /// Only accepted while running and when neither tile is locked. A
    /// successful swap bumps the move count and re-derives the locked set;
    /// if that solves the puzzle the record store is consulted exactly once.
    #[instrument(skip(self))]
    pub fn apply_swap(&mut self, a: usize, b: usize) -> SwapOutcome {
        let Some(session) = self.session.as_mut() else {
            debug!("Swap ignored: no session");
            return SwapOutcome::Rejected(SwapRejection::NotRunning(SessionPhase::Idle));
        };

        if session.phase != SessionPhase::Running {
            debug!(phase = %session.phase, "Swap ignored: session not running");
            return SwapOutcome::Rejected(SwapRejection::NotRunning(session.phase));
        }

        let next = match session.grid.swapped(a, b) {
            Ok(next) => next,
            Err(rejection) => {
                debug!(%rejection, "Swap rejected");
                return SwapOutcome::Rejected(rejection);
            }
        };

        session.grid = next;
        session.move_count = session.move_count.saturating_add(1);
        let locked = session.grid.locked_positions().len();
        debug!(move_count = session.move_count, locked, "Swap applied");

        if locked == session.grid.len() {
            SwapOutcome::Solved(Self::complete(&mut self.records, session))
        } else {
            SwapOutcome::Swapped {
                move_count: session.move_count,
                locked,
            }
        }
    }

    /// Advances the clock by one second while running.
    ///
    /// Returns whether the clock moved.
    #[instrument(skip(self))]
    pub fn tick(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.phase == SessionPhase::Running => {
                session.elapsed_seconds = session.elapsed_seconds.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    /// Pauses a running session.
    ///
    /// Does nothing before the first move or tick, so an untouched board
    /// cannot be paused. Returns whether the phase changed.
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.phase == SessionPhase::Running => {
                if session.move_count == 0 && session.elapsed_seconds == 0 {
                    debug!("Pause ignored: session not started");
                    return false;
                }
                session.phase = SessionPhase::Paused;
                info!(elapsed = session.elapsed_seconds, "Session paused");
                true
            }
            _ => false,
        }
    }

    /// Resumes a paused session. Returns whether the phase changed.
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.phase == SessionPhase::Paused => {
                session.phase = SessionPhase::Running;
                info!(elapsed = session.elapsed_seconds, "Session resumed");
                true
            }
            _ => false,
        }
    }

    /// Leaves the current session and returns to idle.
    #[instrument(skip(self))]
    pub fn exit(&mut self) -> Option<Session> {
        let session = self.session.take();
        if let Some(session) = &session {
            info!(level_id = %session.level_id, phase = %session.phase, "Session exited");
        }
        session
    }

    /// Current phase; [`SessionPhase::Idle`] when no session exists.
    pub fn phase(&self) -> SessionPhase {
        self.session.as_ref().map_or(SessionPhase::Idle, Session::phase)
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// State for the rendering side.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(|session| SessionSnapshot {
            level_id: session.level_id.clone(),
            locked_positions: session.grid.locked_positions(),
            is_solved: session.is_solved(),
            elapsed_seconds: session.elapsed_seconds,
            move_count: session.move_count,
            phase: session.phase,
        })
    }

    /// The record store.
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Mutable access to the record store.
    pub fn records_mut(&mut self) -> &mut RecordStore {
        &mut self.records
    }

    fn complete(records: &mut RecordStore, session: &mut Session) -> RecordOutcome {
        session.phase = SessionPhase::Solved;
        let outcome = records.compare_and_store(&session.level_id, session.elapsed_seconds, session.move_count);
        session.completion = Some(outcome);
        info!(
            level_id = %session.level_id,
            elapsed = session.elapsed_seconds,
            moves = session.move_count,
            improved = outcome.improved,
            "Puzzle solved"
        );
        outcome
    }
}
