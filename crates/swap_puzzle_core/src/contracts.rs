//! Contract-based validation for tile swaps.
//!
//! A swap is legal when both positions are on the board, distinct, and
//! neither holds a locked tile. Postconditions check that the board is
//! still a permutation and that exactly the two requested positions changed.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::grid::{Grid, GridInvariants, InvariantSet, InvariantViolation};
use crate::session::SessionPhase;

/// A request to exchange the tiles at two board positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swap {
    /// First board position.
    pub a: usize,
    /// Second board position.
    pub b: usize,
}

impl Swap {
    /// Creates a new swap request.
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }
}

impl std::fmt::Display for Swap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// Why a swap was refused. Refusals leave all state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum SwapRejection {
    /// Position is not on the board.
    #[display("Position {} is off the board", _0)]
    OutOfBounds(usize),

    /// Both positions are the same.
    #[display("Position {} cannot be swapped with itself", _0)]
    SamePosition(usize),

    /// The tile at the position is already home.
    #[display("Tile at position {} is locked", _0)]
    Locked(usize),

    /// The session is not accepting moves.
    #[display("Session is {}, not running", _0)]
    NotRunning(SessionPhase),
}

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), SwapRejection>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), InvariantViolation>;
}

/// Precondition: both positions are on the board.
pub struct PositionsInBounds;

impl PositionsInBounds {
    /// Validates that both positions index into the board.
    #[instrument(skip(grid))]
    pub fn check(swap: &Swap, grid: &Grid) -> Result<(), SwapRejection> {
        for position in [swap.a, swap.b] {
            if position >= grid.len() {
                return Err(SwapRejection::OutOfBounds(position));
            }
        }
        Ok(())
    }
}

/// Precondition: the two positions differ.
pub struct PositionsDistinct;

impl PositionsDistinct {
    /// Validates that the swap names two different positions.
    #[instrument]
    pub fn check(swap: &Swap) -> Result<(), SwapRejection> {
        if swap.a == swap.b {
            Err(SwapRejection::SamePosition(swap.a))
        } else {
            Ok(())
        }
    }
}

/// Precondition: neither tile is locked.
pub struct NeitherLocked;

impl NeitherLocked {
    /// Validates that neither position holds a tile already at home.
    #[instrument(skip(grid))]
    pub fn check(swap: &Swap, grid: &Grid) -> Result<(), SwapRejection> {
        for position in [swap.a, swap.b] {
            if grid.is_locked(position) {
                return Err(SwapRejection::Locked(position));
            }
        }
        Ok(())
    }
}

/// Composite precondition: all swap preconditions.
pub struct LegalSwap;

impl LegalSwap {
    /// Validates all preconditions for a swap.
    #[instrument(skip(grid))]
    pub fn check(swap: &Swap, grid: &Grid) -> Result<(), SwapRejection> {
        PositionsInBounds::check(swap, grid)?;
        PositionsDistinct::check(swap)?;
        NeitherLocked::check(swap, grid)?;
        Ok(())
    }
}

/// Contract for swap actions.
///
/// Preconditions:
/// - Both positions on the board
/// - Positions distinct
/// - Neither tile locked
///
/// Postconditions:
/// - Board is still a permutation of `0..N²`
/// - Exactly two positions changed
pub struct SwapContract;

impl Contract<Grid, Swap> for SwapContract {
    fn pre(grid: &Grid, swap: &Swap) -> Result<(), SwapRejection> {
        LegalSwap::check(swap, grid)
    }

    fn post(before: &Grid, after: &Grid) -> Result<(), InvariantViolation> {
        GridInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            InvariantViolation::new(format!("Postcondition failed: {}", descriptions))
        })?;

        let changed = before
            .tiles()
            .iter()
            .zip(after.tiles())
            .filter(|(old, new)| old != new)
            .count();
        if before.len() != after.len() || changed != 2 {
            warn!(changed, "Swap changed an unexpected number of positions");
            return Err(InvariantViolation::new(format!(
                "Postcondition failed: expected 2 changed positions, found {}",
                changed
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrambled() -> Grid {
        // Positions 0 and 3 are locked.
        Grid::from_home_indices(2, vec![0, 2, 1, 3]).expect("valid arrangement")
    }

    #[test]
    fn test_precondition_legal_swap() {
        assert!(SwapContract::pre(&scrambled(), &Swap::new(1, 2)).is_ok());
    }

    #[test]
    fn test_precondition_out_of_bounds() {
        assert_eq!(
            SwapContract::pre(&scrambled(), &Swap::new(1, 4)),
            Err(SwapRejection::OutOfBounds(4))
        );
    }

    #[test]
    fn test_precondition_same_position() {
        assert_eq!(
            SwapContract::pre(&scrambled(), &Swap::new(2, 2)),
            Err(SwapRejection::SamePosition(2))
        );
    }

    #[test]
    fn test_precondition_locked() {
        assert_eq!(
            SwapContract::pre(&scrambled(), &Swap::new(0, 3)),
            Err(SwapRejection::Locked(0))
        );
        assert_eq!(
            SwapContract::pre(&scrambled(), &Swap::new(2, 3)),
            Err(SwapRejection::Locked(3))
        );
    }

    #[test]
    fn test_postcondition_holds_after_swap() {
        let before = scrambled();
        let after = before.swapped(1, 2).expect("legal swap");
        assert!(SwapContract::post(&before, &after).is_ok());
    }

    #[test]
    fn test_postcondition_detects_untouched_board() {
        let before = scrambled();
        assert!(SwapContract::post(&before, &before.clone()).is_err());
    }
}
