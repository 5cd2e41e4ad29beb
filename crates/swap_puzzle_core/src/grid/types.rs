//! Core domain types for the puzzle grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::contracts::{Contract, Swap, SwapContract, SwapRejection};
use crate::error::GridError;

/// A slice of the puzzle image.
///
/// The home index is the board position the tile occupies when the puzzle
/// is solved. It never changes after the tile is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    home_index: usize,
}

impl Tile {
    /// Creates a tile belonging at `home_index`.
    pub fn new(home_index: usize) -> Self {
        Self { home_index }
    }

    /// Returns the position this tile belongs to.
    pub fn home_index(&self) -> usize {
        self.home_index
    }

    /// Row and column of the image slice this tile shows on a board of the given side.
    pub fn row_col(&self, side: usize) -> (usize, usize) {
        if side == 0 {
            return (0, 0);
        }
        (self.home_index / side, self.home_index % side)
    }
}

/// Side length of the board, chosen from a small fixed set.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(try_from = "usize", into = "usize")]
pub enum Difficulty {
    /// 2×2 board.
    #[display("2x2")]
    Easy,
    /// 3×3 board.
    #[display("3x3")]
    Medium,
    /// 4×4 board.
    #[default]
    #[display("4x4")]
    Hard,
    /// 5×5 board.
    #[display("5x5")]
    Expert,
}

impl Difficulty {
    /// Board side length N.
    pub fn side(self) -> usize {
        match self {
            Self::Easy => 2,
            Self::Medium => 3,
            Self::Hard => 4,
            Self::Expert => 5,
        }
    }

    /// Number of tiles on the board (N²).
    pub fn tile_count(self) -> usize {
        self.side() * self.side()
    }

    /// Display label for menus.
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }
}

impl TryFrom<usize> for Difficulty {
    type Error = GridError;

    #[track_caller]
    fn try_from(side: usize) -> Result<Self, Self::Error> {
        match side {
            2 => Ok(Self::Easy),
            3 => Ok(Self::Medium),
            4 => Ok(Self::Hard),
            5 => Ok(Self::Expert),
            other => Err(GridError::new(format!(
                "Unsupported difficulty {}: board side must be between 2 and 5",
                other
            ))),
        }
    }
}

impl From<Difficulty> for usize {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.side()
    }
}

/// N×N puzzle board.
///
/// Tiles are stored in row-major board order. The sequence of home indices
/// is always a permutation of `0..N²`.
///
/// Deserialization goes through [`Grid::from_home_indices`], so a decoded
/// board is always a valid permutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridParts")]
pub struct Grid {
    pub(super) side: usize,
    pub(super) tiles: Vec<Tile>,
}

#[derive(Deserialize)]
struct GridParts {
    side: usize,
    tiles: Vec<Tile>,
}

impl TryFrom<GridParts> for Grid {
    type Error = GridError;

    fn try_from(parts: GridParts) -> Result<Self, Self::Error> {
        Self::from_home_indices(parts.side, parts.tiles.iter().map(Tile::home_index).collect())
    }
}

/// Number of tiles on a `side`×`side` board, or `None` if that overflows.
pub(super) fn tile_count(side: usize) -> Option<usize> {
    side.checked_mul(side)
}

impl Grid {
    /// Creates a solved board (every tile at home).
    ///
    /// A side whose square overflows `usize` yields the empty 0×0 board.
    #[instrument]
    pub fn solved(side: usize) -> Self {
        let Some(count) = tile_count(side) else {
            warn!(side, "Board side too large, using an empty board");
            return Self {
                side: 0,
                tiles: Vec::new(),
            };
        };
        let tiles = (0..count).map(Tile::new).collect();
        Self { side, tiles }
    }

    /// Builds a board from an explicit arrangement of home indices.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] unless `home_indices` is a permutation of `0..side²`.
    #[instrument(skip(home_indices), fields(count = home_indices.len()))]
    pub fn from_home_indices(side: usize, home_indices: Vec<usize>) -> Result<Self, GridError> {
        let expected = tile_count(side)
            .ok_or_else(|| GridError::new(format!("Board side {} is too large", side)))?;
        if home_indices.len() != expected {
            return Err(GridError::new(format!(
                "Expected {} tiles for a {}x{} board, got {}",
                expected,
                side,
                side,
                home_indices.len()
            )));
        }

        let mut seen = vec![false; expected];
        for &index in &home_indices {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(GridError::new(format!("Duplicate tile {}", index))),
                None => return Err(GridError::new(format!("Tile {} out of range 0..{}", index, expected))),
            }
        }

        Ok(Self {
            side,
            tiles: home_indices.into_iter().map(Tile::new).collect(),
        })
    }

    /// Returns the board side length N.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the number of tiles (N²).
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true for the degenerate 0×0 board.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Returns all tiles in board order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Gets the tile at a board position.
    pub fn tile(&self, position: usize) -> Option<Tile> {
        self.tiles.get(position).copied()
    }

    /// Returns the home index of every tile, in board order.
    pub fn home_indices(&self) -> Vec<usize> {
        self.tiles.iter().map(Tile::home_index).collect()
    }

    /// Checks whether the tile at `position` sits on its home position.
    pub fn is_locked(&self, position: usize) -> bool {
        self.tile(position).is_some_and(|tile| tile.home_index() == position)
    }

    /// Positions whose tile is at home.
    pub fn locked_positions(&self) -> BTreeSet<usize> {
        super::rules::locked_positions(self)
    }

    /// True when every tile is at home.
    pub fn is_solved(&self) -> bool {
        super::rules::is_solved(self)
    }

    /// Returns a new board with the tiles at `a` and `b` exchanged.
    ///
    /// Locked tiles never move; the swap is rejected and `self` is untouched.
    #[instrument(skip(self), fields(side = self.side))]
    pub fn swapped(&self, a: usize, b: usize) -> Result<Grid, SwapRejection> {
        let action = Swap::new(a, b);
        SwapContract::pre(self, &action)?;

        let mut next = self.clone();
        next.tiles.swap(a, b);
        debug!(a, b, "Tiles swapped");

        debug_assert!(
            SwapContract::post(self, &next).is_ok(),
            "Swap postcondition violated"
        );

        Ok(next)
    }

    /// Formats the board as rows of home indices, `*` marking locked tiles.
    pub fn display(&self) -> String {
        let width = self.len().saturating_sub(1).to_string().len();
        let mut result = String::new();
        for (position, tile) in self.tiles.iter().enumerate() {
            let marker = if tile.home_index() == position { '*' } else { ' ' };
            result.push_str(&format!("{:>width$}{}", tile.home_index(), marker, width = width));
            if (position + 1) % self.side.max(1) == 0 {
                if position + 1 < self.len() {
                    result.push('\n');
                }
            } else {
                result.push(' ');
            }
        }
        result
    }
}
