//! Pure swap-puzzle game logic.
//!
//! An image is cut into an N×N grid of tiles and shuffled; the player swaps
//! tiles until every tile sits on its home position.
//!
//! # Architecture
//!
//! - **Grid**: tile identities, fair shuffling, lock and win detection
//! - **Records**: best result per level and the comparison policy
//! - **Store**: records plus the persistence collaborator behind them
//! - **Session**: one play-through (grid, timer, move counter) and its state machine
//!
//! # Example
//!
//! ```
//! use swap_puzzle_core::{LevelId, RecordStore, SessionController, SwapOutcome};
//!
//! let mut controller = SessionController::new(RecordStore::in_memory());
//! controller.start(LevelId::from("lvl1"), 3);
//!
//! let session = controller.session().expect("session started");
//! assert_eq!(session.grid().len(), 9);
//! assert!(!session.grid().is_solved());
//!
//! match controller.apply_swap(0, 1) {
//!     SwapOutcome::Rejected(reason) => println!("rejected: {reason}"),
//!     outcome => println!("{outcome:?}"),
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod clock;
mod contracts;
mod error;
mod grid;
mod record;
mod session;
mod store;

pub use clock::format_clock;
pub use contracts::{Contract, LegalSwap, NeitherLocked, PositionsDistinct, PositionsInBounds, Swap, SwapContract, SwapRejection};
pub use error::{GridError, StoreError};
pub use grid::{
    Difficulty, Grid, GridInvariants, Invariant, InvariantSet, InvariantViolation, PermutationInvariant,
    SquareBoardInvariant, Tile, generate, generate_with, is_solved, locked_positions,
};
pub use record::{LevelId, LevelRecord, RecordMap, RecordOutcome};
pub use session::{Session, SessionController, SessionPhase, SessionSnapshot, SwapOutcome};
pub use store::{MemoryPersistence, RecordPersistence, RecordStore};
