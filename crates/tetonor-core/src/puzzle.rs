use serde::{Deserialize, Serialize};

/// Source numbers for one sum cell and one product cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub a: u32,
    pub b: u32,
    /// Identifier shared by every cell and strip item derived from this pair
    pub id: u32,
}

impl Pair {
    pub fn new(a: u32, b: u32, id: u32) -> Self {
        Self { a, b, id }
    }

    pub fn sum(&self) -> u32 {
        self.a + self.b
    }

    pub fn product(&self) -> u32 {
        self.a * self.b
    }

    /// The two numbers, smallest first
    pub fn sorted(&self) -> (u32, u32) {
        sorted(self.a, self.b)
    }
}

/// Order two values ascending
pub(crate) fn sorted(x: u32, y: u32) -> (u32, u32) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Which operation a grid cell shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Sum,
    Product,
}

impl CellKind {
    pub fn apply(&self, x: u32, y: u32) -> u32 {
        match self {
            CellKind::Sum => x + y,
            CellKind::Product => x * y,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            CellKind::Sum => CellKind::Product,
            CellKind::Product => CellKind::Sum,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            CellKind::Sum => '+',
            CellKind::Product => '×',
        }
    }
}

/// One value in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub value: u32,
    pub kind: CellKind,
    pub pair_id: u32,
    /// Flips to true once and stays there until the next round
    pub solved: bool,
    /// The intended source numbers
    pub solution: (u32, u32),
}

impl GridCell {
    /// Whether `(x, y)` in either order is this cell's intended solution
    pub fn is_solution(&self, x: u32, y: u32) -> bool {
        sorted(self.solution.0, self.solution.1) == sorted(x, y)
    }
}

/// One number on the strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripItem {
    pub value: u32,
    pub pair_id: u32,
    pub used: bool,
    /// Stable identity that survives sorting
    pub id: u32,
}

/// A board: grid cells plus strip numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub grid: Vec<GridCell>,
    pub strip: Vec<StripItem>,
}

impl Puzzle {
    /// Derive the unshuffled grid and strip from a pair set.
    ///
    /// Each pair contributes its sum cell then its product cell, and its
    /// `a` then `b` strip items. Strip ids run `0..2N` in that order.
    pub fn from_pairs(pairs: &[Pair]) -> Self {
        let mut grid = Vec::with_capacity(pairs.len() * 2);
        let mut strip = Vec::with_capacity(pairs.len() * 2);

        for pair in pairs {
            for kind in [CellKind::Sum, CellKind::Product] {
                grid.push(GridCell {
                    value: kind.apply(pair.a, pair.b),
                    kind,
                    pair_id: pair.id,
                    solved: false,
                    solution: (pair.a, pair.b),
                });
            }
            for value in [pair.a, pair.b] {
                let id = strip.len() as u32;
                strip.push(StripItem {
                    value,
                    pair_id: pair.id,
                    used: false,
                    id,
                });
            }
        }

        Self { grid, strip }
    }

    pub fn is_solved(&self) -> bool {
        self.grid.iter().all(|c| c.solved)
    }

    pub fn solved_count(&self) -> usize {
        self.grid.iter().filter(|c| c.solved).count()
    }

    /// Index of the other cell of the same pair
    pub fn sibling_of(&self, index: usize) -> Option<usize> {
        let cell = self.grid.get(index)?;
        self.grid
            .iter()
            .position(|c| c.pair_id == cell.pair_id && c.kind == cell.kind.opposite())
    }

    /// Check the structural invariants of a derived board.
    ///
    /// Every pair id must appear exactly once as a sum cell, once as a
    /// product cell and exactly twice on the strip, and nothing else may
    /// appear.
    pub fn check_invariants(&self) -> Result<(), String> {
        use std::collections::BTreeMap;

        if self.grid.len() != self.strip.len() {
            return Err(format!(
                "grid has {} cells but strip has {} items",
                self.grid.len(),
                self.strip.len()
            ));
        }

        let mut counts: BTreeMap<u32, (usize, usize, usize)> = BTreeMap::new();
        for cell in &self.grid {
            let entry = counts.entry(cell.pair_id).or_default();
            match cell.kind {
                CellKind::Sum => entry.0 += 1,
                CellKind::Product => entry.1 += 1,
            }
            let (a, b) = cell.solution;
            if cell.kind.apply(a, b) != cell.value {
                return Err(format!(
                    "cell {} {:?} does not match its solution {:?}",
                    cell.value, cell.kind, cell.solution
                ));
            }
        }
        for item in &self.strip {
            counts.entry(item.pair_id).or_default().2 += 1;
        }

        for (pair_id, (sums, products, items)) in counts {
            if (sums, products, items) != (1, 1, 2) {
                return Err(format!(
                    "pair {} has {} sum cells, {} product cells and {} strip items",
                    pair_id, sums, products, items
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Puzzle {
        Puzzle::from_pairs(&[Pair::new(3, 4, 0), Pair::new(5, 5, 1)])
    }

    #[test]
    fn test_from_pairs_layout() {
        let puzzle = sample();
        assert_eq!(puzzle.grid.len(), 4);
        assert_eq!(puzzle.strip.len(), 4);

        assert_eq!(puzzle.grid[0].value, 7);
        assert_eq!(puzzle.grid[0].kind, CellKind::Sum);
        assert_eq!(puzzle.grid[1].value, 12);
        assert_eq!(puzzle.grid[1].kind, CellKind::Product);
        assert_eq!(puzzle.grid[3].value, 25);

        let ids: Vec<u32> = puzzle.strip.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(puzzle.strip[3].pair_id, 1);
        assert!(puzzle.check_invariants().is_ok());
    }

    #[test]
    fn test_is_solution_ignores_order() {
        let puzzle = sample();
        assert!(puzzle.grid[0].is_solution(4, 3));
        assert!(puzzle.grid[0].is_solution(3, 4));
        assert!(!puzzle.grid[0].is_solution(2, 5));
    }

    #[test]
    fn test_sibling_lookup() {
        let puzzle = sample();
        assert_eq!(puzzle.sibling_of(0), Some(1));
        assert_eq!(puzzle.sibling_of(3), Some(2));
        assert_eq!(puzzle.sibling_of(9), None);
    }

    #[test]
    fn test_invariant_violation_detected() {
        let mut puzzle = sample();
        puzzle.grid[1].kind = CellKind::Sum;
        assert!(puzzle.check_invariants().is_err());

        let mut puzzle = sample();
        puzzle.strip.pop();
        assert!(puzzle.check_invariants().is_err());
    }

    #[test]
    fn test_solved_tracking() {
        let mut puzzle = sample();
        assert!(!puzzle.is_solved());
        for cell in &mut puzzle.grid {
            cell.solved = true;
        }
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.solved_count(), 4);
    }
}
