//! High score persistence
//!
//! A single integer, persisted to LocalStorage as JSON. On native builds the
//! value only lives for the process.

use serde::{Deserialize, Serialize};

use crate::platform::HighScoreStore;

/// Best score across sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScore {
    pub best: u32,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fly_frog_high_score";

    pub fn new(best: u32) -> Self {
        Self { best }
    }

    /// Fold a finished run's score in; returns true on a new record
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Parse a stored value; anything unreadable counts as no history
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<HighScore>(raw.trim()) {
            Ok(score) => score,
            Err(e) => {
                log::warn!("Ignoring unreadable high score {:?}: {}", raw, e);
                Self::default()
            }
        }
    }

    /// Load the high score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                let score = Self::parse(&raw);
                log::info!("Loaded high score {}", score.best);
                return score;
            }
        } else {
            log::warn!("LocalStorage unavailable, high score will not persist");
        }

        log::info!("No high score found, starting fresh");
        Self::default()
    }

    /// Save the high score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save high score");
                    return;
                }
                log::info!("High score saved ({})", self.best);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl HighScoreStore for HighScore {
    fn load_high_score(&self) -> u32 {
        self.best
    }

    fn save_high_score(&mut self, score: u32) {
        if self.record(score) {
            self.save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_maximum() {
        let mut high = HighScore::new(10);
        assert!(!high.record(7));
        assert!(!high.record(10));
        assert!(high.record(11));
        assert_eq!(high.best, 11);
    }

    #[test]
    fn test_stored_as_plain_integer() {
        assert_eq!(serde_json::to_string(&HighScore::new(42)).unwrap(), "42");
        assert_eq!(HighScore::parse("42"), HighScore::new(42));
        assert_eq!(HighScore::parse(" 7\n"), HighScore::new(7));
    }

    #[test]
    fn test_garbage_parses_as_zero() {
        assert_eq!(HighScore::parse("not a number"), HighScore::default());
        assert_eq!(HighScore::parse("-3"), HighScore::default());
        assert_eq!(HighScore::parse(""), HighScore::default());
    }

    #[test]
    fn test_store_never_lowers() {
        let mut store = HighScore::new(30);
        store.save_high_score(12);
        assert_eq!(store.load_high_score(), 30);
        store.save_high_score(31);
        assert_eq!(store.load_high_score(), 31);
    }
}
