//! Ghost solution detection
//!
//! A ghost solution is a pair of strip numbers from two different source
//! pairs whose sum and product both appear somewhere in the grid. Such a
//! board can be "solved" with numbers that were never meant for those
//! cells.

use crate::puzzle::{CellKind, GridCell, StripItem};
use std::collections::HashSet;

/// Find the first cross-pair collision on a board.
///
/// Returns the pair ids of the two strip items involved, or an empty
/// vector when the board is clean. Only the first collision is reported;
/// the repair loop fixes one pair per iteration.
pub fn find_conflicts(strip: &[StripItem], grid: &[GridCell]) -> Vec<u32> {
    let sums: HashSet<u32> = values_of(grid, CellKind::Sum);
    let products: HashSet<u32> = values_of(grid, CellKind::Product);

    for (i, first) in strip.iter().enumerate() {
        for second in &strip[i + 1..] {
            if first.pair_id == second.pair_id {
                continue;
            }

            let sum = first.value + second.value;
            let product = first.value * second.value;

            if sums.contains(&sum) && products.contains(&product) {
                return vec![first.pair_id, second.pair_id];
            }
        }
    }

    Vec::new()
}

fn values_of(grid: &[GridCell], kind: CellKind) -> HashSet<u32> {
    grid.iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Pair, Puzzle};

    #[test]
    fn test_clean_board() {
        let puzzle = Puzzle::from_pairs(&[Pair::new(2, 9, 0), Pair::new(4, 7, 1)]);
        // Cross pairs: 2+4, 2+7, 9+4, 9+7 -> sums 6, 9, 13, 16; grid sums are 11, 11
        assert!(find_conflicts(&puzzle.strip, &puzzle.grid).is_empty());
    }

    #[test]
    fn test_duplicate_pair_conflicts() {
        // Two identical pairs: the a of one and the b of the other form a ghost
        let puzzle = Puzzle::from_pairs(&[Pair::new(3, 5, 0), Pair::new(3, 5, 1)]);
        assert_eq!(find_conflicts(&puzzle.strip, &puzzle.grid), vec![0, 1]);
    }

    #[test]
    fn test_collision_across_unrelated_cells() {
        // 2 from pair 0 and 6 from pair 2 give 8 and 12, both already on the board
        let pairs = [Pair::new(2, 6, 0), Pair::new(1, 7, 1), Pair::new(6, 9, 2)];
        let puzzle = Puzzle::from_pairs(&pairs);
        let conflicts = find_conflicts(&puzzle.strip, &puzzle.grid);
        assert_eq!(conflicts, vec![0, 2]);
    }

    #[test]
    fn test_same_pair_never_conflicts() {
        let puzzle = Puzzle::from_pairs(&[Pair::new(6, 6, 0)]);
        assert!(find_conflicts(&puzzle.strip, &puzzle.grid).is_empty());
    }

    #[test]
    fn test_sum_alone_is_not_a_conflict() {
        // 5 + 1 = 6 matches the sum of (3, 3) but 5 is not a product on the board
        let pairs = [Pair::new(4, 5, 0), Pair::new(1, 8, 1), Pair::new(3, 3, 2)];
        let puzzle = Puzzle::from_pairs(&pairs);
        assert!(find_conflicts(&puzzle.strip, &puzzle.grid).is_empty());
    }
}
