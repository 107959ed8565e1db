use crate::store::ScoreStore;

/// Maximum number of scores kept in the leaderboard.
pub const MAX_ENTRIES: usize = 10;

/// Bounded, descending-sorted high-score list over an injected store.
///
/// The store is an explicit dependency rather than ambient state, so tests
/// run against `MemoryStore` and the shipped game against `JsonFileStore`.
pub struct Leaderboard {
    store: Box<dyn ScoreStore>,
}

impl Leaderboard {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// Record a score. Zero and negative scores are rejected at submission;
    /// positive scores are merged into the stored list, which stays sorted
    /// descending and truncated to the top `MAX_ENTRIES`.
    pub fn submit(&mut self, score: i32) {
        if score <= 0 {
            tracing::debug!(score, "Ignored non-positive score submission");
            return;
        }
        let mut scores = self.store.load();
        scores.push(score as u32);
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores.truncate(MAX_ENTRIES);
        self.store.save(&scores);
    }

    /// The stored scores, best first.
    pub fn load(&self) -> Vec<u32> {
        self.store.load()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }
}

impl std::fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaderboard").finish_non_exhaustive()
    }
}
