//! Fair shuffling of a fresh board.

use rand::Rng;
use tracing::{debug, info, instrument};

use super::types::tile_count;
use super::{Grid, Tile};

/// Generates a shuffled `side`×`side` board using the thread RNG.
///
/// See [`generate_with`].
#[instrument]
pub fn generate(side: usize) -> Grid {
    generate_with(side, &mut rand::rng())
}

/// Generates a shuffled `side`×`side` board from the given RNG.
///
/// The result is a uniformly random permutation of the tiles, excluding the
/// solved arrangement. Boards with at most one tile have nothing to shuffle
/// and come back solved, as do sides whose square overflows (see
/// [`Grid::solved`]).
#[instrument(skip(rng))]
pub fn generate_with<R: Rng>(side: usize, rng: &mut R) -> Grid {
    let count = match tile_count(side) {
        Some(count) if count > 1 => count,
        _ => {
            debug!(side, "Degenerate board, skipping shuffle");
            return Grid::solved(side);
        }
    };

    let mut home_indices: Vec<usize> = (0..count).collect();
    let mut attempts = 0u32;
    loop {
        fisher_yates(&mut home_indices, rng);
        attempts += 1;
        if !is_identity(&home_indices) {
            break;
        }
        debug!(attempts, "Shuffle produced the solved board, retrying");
    }

    info!(side, attempts, "Generated shuffled board");
    Grid {
        side,
        tiles: home_indices.into_iter().map(Tile::new).collect(),
    }
}

fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

fn is_identity(home_indices: &[usize]) -> bool {
    home_indices.iter().enumerate().all(|(position, &home)| position == home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_never_returns_identity() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let grid = generate_with(2, &mut rng);
            assert!(!grid.is_solved());
        }
    }

    #[test]
    fn test_generate_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for side in 2..=5 {
            let grid = generate_with(side, &mut rng);
            let mut indices = grid.home_indices();
            indices.sort_unstable();
            assert_eq!(indices, (0..side * side).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_degenerate_sides_do_not_loop() {
        assert!(generate(0).is_empty());
        let single = generate(1);
        assert_eq!(single.len(), 1);
        assert!(single.is_solved());
    }

    #[test]
    fn test_overflowing_side_is_degenerate() {
        let grid = generate(usize::MAX);
        assert!(grid.is_empty());
        assert_eq!(grid.side(), 0);
        assert!(grid.is_solved());
    }

    #[test]
    fn test_two_by_two_reaches_every_non_identity_arrangement() {
        // 4! - 1 = 23 reachable boards
        let mut rng = StdRng::seed_from_u64(1234);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5_000 {
            seen.insert(generate_with(2, &mut rng).home_indices());
        }
        assert_eq!(seen.len(), 23);
    }
}
