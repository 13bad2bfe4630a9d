use crate::error::GameError;
use crate::scoring::ScoringPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Difficulty level of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All levels, easiest first
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// Stable lowercase key used for storage and the ranking API
    pub fn key(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Exact inverse of [`Difficulty::key`]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|d| d.key() == key)
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::UnknownLevel(s.to_string())),
        }
    }
}

/// Number range and score multiplier for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Smallest strip number (inclusive)
    pub min: u32,
    /// Largest strip number (inclusive)
    pub max: u32,
    /// Score multiplier
    pub multiplier: u32,
}

impl LevelConfig {
    pub fn easy() -> Self {
        Self {
            min: 1,
            max: 12,
            multiplier: 1,
        }
    }

    pub fn medium() -> Self {
        Self {
            min: 1,
            max: 20,
            multiplier: 2,
        }
    }

    pub fn hard() -> Self {
        Self {
            min: 1,
            max: 50,
            multiplier: 4,
        }
    }

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::easy(),
            Difficulty::Medium => Self::medium(),
            Difficulty::Hard => Self::hard(),
        }
    }

    fn validate(&self) -> Result<(), GameError> {
        // Products of two values must fit in a u32
        if self.min > self.max || self.max > u16::MAX as u32 {
            return Err(GameError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// What the repair loop does when it runs out of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RepairPolicy {
    /// Keep the last conflicted board once the budget is spent
    AcceptAfter { max_attempts: usize },
    /// Fail with `GenerationExhausted` once the budget is spent
    Strict { max_attempts: usize },
}

impl RepairPolicy {
    pub fn max_attempts(&self) -> usize {
        match *self {
            RepairPolicy::AcceptAfter { max_attempts } | RepairPolicy::Strict { max_attempts } => {
                max_attempts.max(1)
            }
        }
    }
}

impl Default for RepairPolicy {
    fn default() -> Self {
        RepairPolicy::AcceptAfter { max_attempts: 100 }
    }
}

/// Largest board a config may ask for
pub const MAX_PAIRS: usize = 64;

/// Tunable game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of source pairs per board
    pub total_pairs: usize,
    /// Mistakes that end a round
    pub max_mistakes: u32,
    /// Delay between completing a selection and adjudicating it
    pub settle_delay_ms: u64,
    /// Repair loop budget and exhaustion behaviour
    pub repair: RepairPolicy,
    /// Point values
    pub scoring: ScoringPolicy,
    /// Per-level ranges and multipliers
    pub levels: BTreeMap<Difficulty, LevelConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let levels = Difficulty::all()
            .iter()
            .map(|&d| (d, LevelConfig::for_difficulty(d)))
            .collect();

        Self {
            total_pairs: 8,
            max_mistakes: 3,
            settle_delay_ms: 300,
            repair: RepairPolicy::default(),
            scoring: ScoringPolicy::default(),
            levels,
        }
    }
}

impl GameConfig {
    /// Look up the range and multiplier for a level
    pub fn level(&self, difficulty: Difficulty) -> Result<LevelConfig, GameError> {
        self.levels
            .get(&difficulty)
            .copied()
            .ok_or_else(|| GameError::UnknownLevel(difficulty.key().to_string()))
    }

    /// Check the table for values that cannot produce a board
    pub fn validate(&self) -> Result<(), GameError> {
        if self.total_pairs == 0 {
            return Err(GameError::ZeroPairs);
        }
        if self.total_pairs > MAX_PAIRS {
            return Err(GameError::TooManyPairs {
                count: self.total_pairs,
                max: MAX_PAIRS,
            });
        }
        if self.max_mistakes == 0 {
            return Err(GameError::ZeroMistakes);
        }
        for level in self.levels.values() {
            level.validate()?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let config = GameConfig::default();
        assert_eq!(config.total_pairs, 8);
        assert_eq!(config.max_mistakes, 3);
        assert_eq!(config.level(Difficulty::Easy).unwrap(), LevelConfig::easy());
        assert_eq!(config.level(Difficulty::Hard).unwrap().multiplier, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(GameError::UnknownLevel("nightmare".to_string()))
        );
    }

    #[test]
    fn test_missing_level_is_unknown() {
        let mut config = GameConfig::default();
        config.levels.remove(&Difficulty::Medium);
        assert_eq!(
            config.level(Difficulty::Medium),
            Err(GameError::UnknownLevel("medium".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.levels.insert(
            Difficulty::Easy,
            LevelConfig {
                min: 9,
                max: 3,
                multiplier: 1,
            },
        );
        assert_eq!(
            config.validate(),
            Err(GameError::InvalidRange { min: 9, max: 3 })
        );

        let config = GameConfig {
            total_pairs: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(GameError::ZeroPairs));
    }

    #[test]
    fn test_validate_limits_pairs_and_mistakes() {
        let config = GameConfig {
            total_pairs: 100_000,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(GameError::TooManyPairs {
                count: 100_000,
                max: MAX_PAIRS
            })
        );

        let config = GameConfig {
            total_pairs: MAX_PAIRS,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = GameConfig {
            max_mistakes: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(GameError::ZeroMistakes));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "max_mistakes": 5,
            "repair": { "policy": "strict", "max_attempts": 500 },
            "levels": { "easy": { "min": 2, "max": 9, "multiplier": 1 } }
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!(config.max_mistakes, 5);
        assert_eq!(config.total_pairs, 8);
        assert_eq!(config.repair, RepairPolicy::Strict { max_attempts: 500 });
        assert_eq!(config.level(Difficulty::Easy).unwrap().min, 2);
        assert!(config.level(Difficulty::Hard).is_err());
    }

    #[test]
    fn test_from_key_is_exact() {
        assert_eq!(Difficulty::from_key("medium"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_key("Medium"), None);
        assert_eq!(Difficulty::from_key(" hard"), None);
        // The CLI parser is forgiving
        assert_eq!(" Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
    }

    #[test]
    fn test_level_cycle() {
        for &d in Difficulty::all() {
            assert_eq!(d.next().prev(), d);
        }
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    }
}
