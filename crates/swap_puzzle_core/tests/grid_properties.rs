//! Property tests for board generation and the swap rules.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use swap_puzzle_core::{Grid, GridInvariants, InvariantSet, SwapRejection, generate_with, is_solved, locked_positions};

/// Any arrangement of a 2x2 to 5x5 board.
fn arrangement() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (2usize..=5).prop_flat_map(|side| {
        Just((0..side * side).collect::<Vec<_>>())
            .prop_shuffle()
            .prop_map(move |homes| (side, homes))
    })
}

proptest! {
    #[test]
    fn generated_board_is_a_shuffled_permutation(side in 0usize..=6, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = generate_with(side, &mut rng);

        let mut homes = grid.home_indices();
        homes.sort_unstable();
        prop_assert_eq!(homes, (0..side * side).collect::<Vec<_>>());
        prop_assert_eq!(is_solved(&grid), side * side <= 1);
        prop_assert!(GridInvariants::check_all(&grid).is_ok());
    }

    #[test]
    fn fully_locked_iff_solved((side, homes) in arrangement()) {
        let grid = Grid::from_home_indices(side, homes).expect("valid arrangement");
        prop_assert_eq!(locked_positions(&grid).len() == side * side, is_solved(&grid));
    }

    #[test]
    fn swap_touching_a_locked_tile_is_rejected(
        (side, homes) in arrangement(),
        other in any::<prop::sample::Index>(),
    ) {
        let grid = Grid::from_home_indices(side, homes).expect("valid arrangement");
        let locked: Vec<usize> = locked_positions(&grid).into_iter().collect();
        prop_assume!(!locked.is_empty());

        let a = locked[0];
        let b = other.index(grid.len());
        prop_assume!(a != b);

        let before = grid.clone();
        prop_assert_eq!(grid.swapped(a, b), Err(SwapRejection::Locked(a)));
        prop_assert_eq!(grid, before);
    }

    #[test]
    fn legal_swap_changes_exactly_two_positions((side, homes) in arrangement()) {
        let grid = Grid::from_home_indices(side, homes).expect("valid arrangement");
        let loose: Vec<usize> = (0..grid.len()).filter(|pos| !grid.is_locked(*pos)).collect();
        prop_assume!(loose.len() >= 2);

        let next = grid.swapped(loose[0], loose[1]).expect("neither tile locked");
        let changed = grid
            .home_indices()
            .iter()
            .zip(next.home_indices())
            .filter(|(before, after)| **before != *after)
            .count();
        prop_assert_eq!(changed, 2);
    }
}
