use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tetonor_core::Difficulty;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
    Abandoned,
}

/// Statistics for a specific level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub wins: u32,
    pub losses: u32,
    pub abandoned: u32,
    /// Local high score, only set by completed boards
    pub best_score: Option<u32>,
    pub total_score: u64,
}

impl LevelStats {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.abandoned
    }

    pub fn win_rate(&self) -> f32 {
        if self.games() > 0 {
            self.wins as f32 / self.games() as f32 * 100.0
        } else {
            0.0
        }
    }
}

/// Player name and per-level statistics, persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsManager {
    pub player_name: String,
    #[serde(default)]
    by_level: BTreeMap<Difficulty, LevelStats>,
    /// Where to save; `None` keeps everything in memory
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for StatsManager {
    fn default() -> Self {
        Self::new("Player")
    }
}

impl StatsManager {
    pub fn new(player_name: &str) -> Self {
        Self {
            player_name: player_name.to_string(),
            by_level: BTreeMap::new(),
            path: None,
        }
    }

    /// Load stats from file, starting fresh when it is missing or unreadable
    pub fn load(path: &Path) -> Self {
        let mut stats: Self = match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Ignoring unreadable stats file {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        stats.path = Some(path.to_path_buf());
        stats
    }

    /// Save stats to file
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn level(&self, level: Difficulty) -> LevelStats {
        self.by_level.get(&level).cloned().unwrap_or_default()
    }

    pub fn best_score(&self, level: Difficulty) -> Option<u32> {
        self.by_level.get(&level).and_then(|s| s.best_score)
    }

    /// Record a finished round.
    ///
    /// Returns true when a win set a new local high score for the level.
    pub fn record(&mut self, level: Difficulty, result: GameResult, score: u32) -> bool {
        let stats = self.by_level.entry(level).or_default();
        match result {
            GameResult::Win => {
                stats.wins += 1;
                stats.total_score += u64::from(score);
                if stats.best_score.map_or(true, |best| score > best) {
                    stats.best_score = Some(score);
                    return true;
                }
                false
            }
            GameResult::Loss => {
                stats.losses += 1;
                false
            }
            GameResult::Abandoned => {
                stats.abandoned += 1;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_score_only_from_wins() {
        let mut stats = StatsManager::new("ada");
        assert!(stats.record(Difficulty::Easy, GameResult::Win, 500));
        assert!(!stats.record(Difficulty::Easy, GameResult::Win, 400));
        assert!(!stats.record(Difficulty::Easy, GameResult::Loss, 900));
        assert!(stats.record(Difficulty::Easy, GameResult::Win, 650));

        let easy = stats.level(Difficulty::Easy);
        assert_eq!(easy.best_score, Some(650));
        assert_eq!(easy.wins, 3);
        assert_eq!(easy.losses, 1);
        assert_eq!(easy.games(), 4);
        assert_eq!(stats.best_score(Difficulty::Hard), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("tetonor-stats-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stats.json");

        let mut stats = StatsManager::load(&path);
        stats.player_name = "grace".to_string();
        stats.record(Difficulty::Hard, GameResult::Win, 1200);
        stats.record(Difficulty::Hard, GameResult::Abandoned, 0);
        stats.save().unwrap();

        let loaded = StatsManager::load(&path);
        assert_eq!(loaded.player_name, "grace");
        assert_eq!(loaded.level(Difficulty::Hard), stats.level(Difficulty::Hard));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = std::env::temp_dir().join(format!("tetonor-stats-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stats.json");
        fs::write(&path, "{ not json").unwrap();

        let stats = StatsManager::load(&path);
        assert_eq!(stats.player_name, "Player");
        assert_eq!(stats.level(Difficulty::Easy).games(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
