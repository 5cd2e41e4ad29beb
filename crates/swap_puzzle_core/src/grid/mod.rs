//! The puzzle grid: tiles, shuffling, and placement rules.

mod invariants;
mod rules;
mod shuffle;
mod types;

pub use invariants::{
    GridInvariants, Invariant, InvariantSet, InvariantViolation, PermutationInvariant, SquareBoardInvariant,
};
pub use rules::{is_solved, locked_positions};
pub use shuffle::{generate, generate_with};
pub use types::{Difficulty, Grid, Tile};
