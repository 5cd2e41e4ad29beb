//! Placement rules for the puzzle grid.
//!
//! Locked tiles are always recomputed from the board itself rather than
//! tracked incrementally across swaps.

use std::collections::BTreeSet;

use tracing::instrument;

use super::Grid;

/// Positions whose tile is at its home index.
#[instrument(skip(grid), fields(side = grid.side()))]
pub fn locked_positions(grid: &Grid) -> BTreeSet<usize> {
    grid.tiles()
        .iter()
        .enumerate()
        .filter(|(position, tile)| tile.home_index() == *position)
        .map(|(position, _)| position)
        .collect()
}

/// Checks if the puzzle is solved: every position locked.
#[instrument(skip(grid), fields(side = grid.side()))]
pub fn is_solved(grid: &Grid) -> bool {
    locked_positions(grid).len() == grid.len()
}
