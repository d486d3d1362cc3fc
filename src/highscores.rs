//! Per-game high scores
//!
//! One durable key per game, `<game>HighScore`, holding a non-negative
//! integer. Writes are last-write-wins; only improvements are written.

use crate::error::StorageError;
use crate::games::GameKind;
use crate::persistence::KeyValueStore;

/// High score slot for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    key: String,
}

impl HighScore {
    pub fn for_game(kind: GameKind) -> Self {
        Self {
            key: format!("{}HighScore", kind.slug()),
        }
    }

    /// Storage key, e.g. `snakeHighScore`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored best; a missing key is 0
    pub fn load(&self, store: &dyn KeyValueStore) -> Result<u64, StorageError> {
        match store.get(&self.key)? {
            None => Ok(0),
            Some(raw) => {
                serde_json::from_str::<u64>(raw.trim()).map_err(|source| StorageError::Malformed {
                    key: self.key.clone(),
                    source,
                })
            }
        }
    }

    /// Stored best, treating unreadable data as no score yet
    pub fn best(&self, store: &dyn KeyValueStore) -> u64 {
        self.load(store).unwrap_or_else(|e| {
            log::warn!("Ignoring high score: {e}");
            0
        })
    }

    /// Record `score` if it beats the stored best; returns whether it did
    pub fn submit(&self, store: &mut dyn KeyValueStore, score: u64) -> Result<bool, StorageError> {
        if score == 0 || score <= self.best(store) {
            return Ok(false);
        }
        store.set(&self.key, &score.to_string())?;
        log::info!("New high score for {}: {score}", self.key);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_key_format() {
        assert_eq!(HighScore::for_game(GameKind::Snake).key(), "snakeHighScore");
        assert_eq!(
            HighScore::for_game(GameKind::BallAvoidance).key(),
            "ballAvoidanceHighScore"
        );
    }

    #[test]
    fn test_submit_only_improvements() {
        let mut store = MemoryStore::new();
        let hs = HighScore::for_game(GameKind::Dino);
        assert_eq!(hs.best(&store), 0);
        assert!(!hs.submit(&mut store, 0).unwrap());
        assert!(hs.submit(&mut store, 40).unwrap());
        assert!(!hs.submit(&mut store, 12).unwrap());
        assert!(!hs.submit(&mut store, 40).unwrap());
        assert_eq!(hs.best(&store), 40);
    }

    #[test]
    fn test_corrupt_value_reads_as_zero() {
        let mut store = MemoryStore::new();
        store.set("snakeHighScore", "lots").unwrap();
        let hs = HighScore::for_game(GameKind::Snake);
        assert!(hs.load(&store).is_err());
        assert_eq!(hs.best(&store), 0);
        assert!(hs.submit(&mut store, 3).unwrap());
        assert_eq!(hs.load(&store).unwrap(), 3);
    }
}
