use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether points are awarded for an intended match or a ghost solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreKind {
    Normal,
    Ghost,
}

/// Point values used to score adjudications
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Points for any intended match before the multiplier
    pub base_points: u32,
    /// Largest time bonus, granted for an instant answer
    pub time_bonus_cap: f64,
    /// Time bonus lost per elapsed second
    pub time_penalty_per_sec: f64,
    /// Flat points for a new ghost solution before the multiplier
    pub ghost_bonus: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_points: 100,
            time_bonus_cap: 50.0,
            time_penalty_per_sec: 2.0,
            ghost_bonus: 50,
        }
    }
}

impl ScoringPolicy {
    /// Points for one adjudication.
    ///
    /// Ghost solutions are worth `ghost_bonus × multiplier` regardless of
    /// time. Normal matches are worth
    /// `round((base + max(0, cap − penalty × seconds)) × multiplier)`.
    pub fn score(&self, kind: ScoreKind, elapsed: Duration, multiplier: u32) -> u32 {
        match kind {
            ScoreKind::Ghost => self.ghost_bonus * multiplier,
            ScoreKind::Normal => {
                let seconds = elapsed.as_secs_f64();
                let time_bonus =
                    (self.time_bonus_cap - self.time_penalty_per_sec * seconds).max(0.0);
                ((self.base_points as f64 + time_bonus) * multiplier as f64).round() as u32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_answer_gets_full_bonus() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.score(ScoreKind::Normal, Duration::ZERO, 1), 150);
    }

    #[test]
    fn test_slow_answer_gets_base_only() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.score(ScoreKind::Normal, Duration::from_secs(25), 1), 100);
        assert_eq!(policy.score(ScoreKind::Normal, Duration::from_secs(600), 1), 100);
    }

    #[test]
    fn test_partial_bonus_is_rounded() {
        let policy = ScoringPolicy::default();
        // 50 - 2 * 10.3 = 29.4 -> 129.4 * 2 = 258.8
        assert_eq!(
            policy.score(ScoreKind::Normal, Duration::from_millis(10_300), 2),
            259
        );
        assert_eq!(policy.score(ScoreKind::Normal, Duration::from_secs(5), 4), 560);
    }

    #[test]
    fn test_ghost_bonus_ignores_time() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.score(ScoreKind::Ghost, Duration::ZERO, 1), 50);
        assert_eq!(policy.score(ScoreKind::Ghost, Duration::from_secs(90), 4), 200);
    }
}
