//! Best-score tracking
//!
//! A single global best score, stored as a decimal string under one key.
//! The key has no namespace or version; any other game sharing the same
//! storage origin and key would overwrite it.

use crate::persistence::KeyValueStore;

/// Best score across sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// Storage key, shared with earlier releases of the game
    pub const STORAGE_KEY: &'static str = "splitSecondSparkHighScore";

    /// Load the stored best; missing, unreadable or negative values load as 0
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get_int(Self::STORAGE_KEY) {
            Ok(Some(value)) => {
                let best = u64::try_from(value).unwrap_or(0);
                log::info!("Loaded high score {}", best);
                Self { best }
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Could not read high score: {}", e);
                Self::default()
            }
        }
    }

    /// Whether `score` would replace the current best (ties don't)
    pub fn beats(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a final score. Returns true if it set a new best, in which
    /// case it is written to `store`. Write failures are logged and dropped.
    pub fn submit(&mut self, score: u64, store: &mut impl KeyValueStore) -> bool {
        if !self.beats(score) {
            return false;
        }
        self.best = score;
        log::info!("New high score: {}", score);
        let value = i64::try_from(score).unwrap_or(i64::MAX);
        if let Err(e) = store.set_int(Self::STORAGE_KEY, value) {
            log::warn!("High score not saved: {}", e);
        }
        true
    }
}
