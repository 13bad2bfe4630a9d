use crate::config::{Difficulty, GameConfig, LevelConfig, RepairPolicy};
use crate::conflict::find_conflicts;
use crate::error::GameError;
use crate::puzzle::{Pair, Puzzle};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How a board came out of the repair loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Boards built and checked, including the accepted one
    pub attempts: usize,
    /// False when the board was accepted with a ghost solution left in it
    pub clean: bool,
}

/// A shuffled, ready-to-play board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPuzzle {
    pub difficulty: Difficulty,
    pub puzzle: Puzzle,
    pub report: GenerationReport,
}

/// Tetonor puzzle generator
pub struct Generator {
    config: GameConfig,
    rng: StdRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a new generator with default configuration
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self::seeded(GameConfig::default(), seed)
    }

    /// Custom configuration and a fixed seed
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Draw `a` and `b` independently and uniformly from the level's range
    pub fn generate_pair(&mut self, level: LevelConfig, id: u32) -> Pair {
        let a = self.rng.gen_range(level.min..=level.max);
        let b = self.rng.gen_range(level.min..=level.max);
        Pair::new(a, b, id)
    }

    /// Generate a board for the given level.
    ///
    /// Each iteration rebuilds the board from the current pairs and looks
    /// for a ghost solution. A clean board is shuffled and returned. A
    /// conflicted one gets the first conflicting pair redrawn. What happens
    /// when the attempt budget runs out depends on the repair policy.
    pub fn generate(&mut self, difficulty: Difficulty) -> Result<GeneratedPuzzle, GameError> {
        self.config.validate()?;
        let level = self.config.level(difficulty)?;
        let policy = self.config.repair;
        let max_attempts = policy.max_attempts();

        let mut pairs: Vec<Pair> = (0..self.config.total_pairs as u32)
            .map(|id| self.generate_pair(level, id))
            .collect();

        for attempt in 1..=max_attempts {
            let puzzle = Puzzle::from_pairs(&pairs);
            let conflicts = find_conflicts(&puzzle.strip, &puzzle.grid);

            if conflicts.is_empty() {
                info!("Puzzle generated cleanly after {} attempts", attempt);
                return Ok(self.finish(difficulty, puzzle, attempt, true));
            }

            if attempt == max_attempts {
                if let RepairPolicy::AcceptAfter { .. } = policy {
                    warn!(
                        "Max attempts ({}) reached, accepting puzzle with ghost solutions",
                        max_attempts
                    );
                    return Ok(self.finish(difficulty, puzzle, attempt, false));
                }
                break;
            }

            let bad_id = conflicts[0];
            debug!("Attempt {}: regenerating pair {}", attempt, bad_id);
            if let Some(slot) = pairs.iter_mut().find(|p| p.id == bad_id) {
                *slot = self.generate_pair(level, bad_id);
            }
        }

        warn!("Puzzle generation exhausted {} attempts", max_attempts);
        Err(GameError::GenerationExhausted {
            attempts: max_attempts,
        })
    }

    /// Shuffle the grid and sort the strip ascending by value
    fn finish(
        &mut self,
        difficulty: Difficulty,
        mut puzzle: Puzzle,
        attempts: usize,
        clean: bool,
    ) -> GeneratedPuzzle {
        self.shuffle(&mut puzzle.grid);
        puzzle.strip.sort_by_key(|item| item.value);

        GeneratedPuzzle {
            difficulty,
            puzzle,
            report: GenerationReport { attempts, clean },
        }
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            slice.swap(i, j);
        }
    }
}
