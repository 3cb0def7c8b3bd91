//! Best-score tracking
//!
//! A single scalar persisted through a [`Storage`] under a fixed key. Read
//! once at construction, written whenever a run beats it.

use crate::platform::Storage;

/// Best score seen, optionally backed by storage
pub struct HighScore {
    best: u64,
    storage: Option<Box<dyn Storage>>,
}

impl HighScore {
    /// Storage key for the persisted value
    pub const STORAGE_KEY: &'static str = "hackergame_highscore";

    /// Load from storage; a missing or unparseable value counts as zero
    pub fn load(storage: Option<Box<dyn Storage>>) -> Self {
        let best = storage
            .as_ref()
            .and_then(|s| s.get(Self::STORAGE_KEY))
            .and_then(|raw| parse_score(&raw))
            .unwrap_or(0);

        if best > 0 {
            log::info!("Loaded high score {}", best);
        }
        Self { best, storage }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Offer a score. Returns true (and persists) if it is a new best.
    pub fn submit(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Some(storage) = self.storage.as_mut() {
            storage.set(Self::STORAGE_KEY, &score.to_string());
        }
        true
    }
}

/// Stored values may be written by older builds as floats ("1250.0")
fn parse_score(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_loads_existing_value() {
        let mut storage = MemoryStorage::new();
        storage.set(HighScore::STORAGE_KEY, "1250");
        let high = HighScore::load(Some(Box::new(storage)));
        assert_eq!(high.best(), 1250);
    }

    #[test]
    fn test_garbage_counts_as_zero() {
        let mut storage = MemoryStorage::new();
        storage.set(HighScore::STORAGE_KEY, "lots");
        assert_eq!(HighScore::load(Some(Box::new(storage))).best(), 0);
        assert_eq!(parse_score("300.0"), Some(300));
        assert_eq!(parse_score("-4"), None);
    }

    #[test]
    fn test_only_new_best_is_persisted() {
        let shared = Rc::new(RefCell::new(MemoryStorage::new()));
        let mut high = HighScore::load(Some(Box::new(shared.clone())));

        assert!(high.submit(50));
        assert!(!high.submit(50));
        assert!(!high.submit(10));
        assert!(high.submit(150));
        assert_eq!(
            shared.borrow().get(HighScore::STORAGE_KEY).as_deref(),
            Some("150")
        );
    }
}
