//! Persisted progress counters
//!
//! The storage collaborator owns where these live; the core only defines
//! the record and how a finished run updates it.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sim::GameState;

/// High score and furthest unlocked level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub high_score: u64,
    /// 1-based level index the player may start from
    pub unlocked_level: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            high_score: 0,
            unlocked_level: 1,
        }
    }
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score beats the stored high score
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.high_score
    }

    /// Fold a game snapshot into the counters.
    /// Returns true if anything changed (caller should persist).
    pub fn record(&mut self, game: &GameState) -> bool {
        let mut changed = false;
        if self.qualifies(game.score) {
            self.high_score = game.score;
            changed = true;
        }
        let reached = match game.status {
            crate::sim::GameStatus::LevelComplete => game.level + 1,
            _ => game.level,
        };
        if reached > self.unlocked_level {
            self.unlocked_level = reached;
            changed = true;
        }
        if changed {
            log::info!(
                "Progress updated: high score {}, unlocked level {}",
                self.high_score,
                self.unlocked_level
            );
        }
        changed
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let mut progress: Self = serde_json::from_str(json).map_err(Error::Progress)?;
        progress.unlocked_level = progress.unlocked_level.max(1);
        Ok(progress)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameStatus;

    fn game(score: u64, level: u32, status: GameStatus) -> GameState {
        GameState {
            score,
            level,
            status,
            ..GameState::new(3)
        }
    }

    #[test]
    fn test_record_raises_high_score() {
        let mut progress = Progress::new();
        assert!(progress.record(&game(120, 1, GameStatus::GameOver)));
        assert_eq!(progress.high_score, 120);

        // Lower score does not lower it
        assert!(!progress.record(&game(50, 1, GameStatus::GameOver)));
        assert_eq!(progress.high_score, 120);
    }

    #[test]
    fn test_level_complete_unlocks_next_level() {
        let mut progress = Progress::new();
        progress.record(&game(0, 4, GameStatus::LevelComplete));
        assert_eq!(progress.unlocked_level, 5);

        // Failing an earlier level keeps the unlock
        progress.record(&game(0, 2, GameStatus::GameOver));
        assert_eq!(progress.unlocked_level, 5);
    }

    #[test]
    fn test_json_roundtrip_and_floor() {
        let progress = Progress {
            high_score: 9001,
            unlocked_level: 17,
        };
        assert_eq!(Progress::from_json(&progress.to_json()).unwrap(), progress);

        let zero = Progress::from_json(r#"{"high_score":1,"unlocked_level":0}"#).unwrap();
        assert_eq!(zero.unlocked_level, 1);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Progress::from_json("[]"),
            Err(Error::Progress(_))
        ));
    }
}
