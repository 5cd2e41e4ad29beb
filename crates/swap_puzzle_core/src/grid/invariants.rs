//! First-class invariants for the puzzle grid.
//!
//! Invariants are logical properties that must hold for every board the
//! engine hands out. They are testable independently and are checked after
//! every swap in debug builds.

use super::Grid;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: the board holds exactly N² tiles.
pub struct SquareBoardInvariant;

impl Invariant<Grid> for SquareBoardInvariant {
    fn holds(grid: &Grid) -> bool {
        grid.len() == grid.side() * grid.side()
    }

    fn description() -> &'static str {
        "Board must hold exactly side² tiles"
    }
}

/// Invariant: home indices form a permutation of `0..N²` (no duplicates, no gaps).
pub struct PermutationInvariant;

impl Invariant<Grid> for PermutationInvariant {
    fn holds(grid: &Grid) -> bool {
        let mut seen = vec![false; grid.len()];
        grid.tiles().iter().all(|tile| match seen.get_mut(tile.home_index()) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        })
    }

    fn description() -> &'static str {
        "Tile home indices must be a permutation of 0..side²"
    }
}

/// All grid invariants as a composable set.
pub type GridInvariants = (SquareBoardInvariant, PermutationInvariant);
