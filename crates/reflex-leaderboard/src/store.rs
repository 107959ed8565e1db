use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Durable backing store for the high-score list.
///
/// The leaderboard is single-writer; implementations only need to make a
/// whole-list replace durable and never expose a half-written list.
pub trait ScoreStore: Send {
    /// Read the stored scores. Unreadable or corrupt data is recovered
    /// locally as an empty list, never propagated as an error.
    fn load(&self) -> Vec<u32>;
    /// Replace the stored scores.
    fn save(&mut self, scores: &[u32]);
    /// Empty the store.
    fn clear(&mut self);
}

/// On-disk serialization: one named array key, missing value reads as empty.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreFile {
    #[serde(default)]
    high_scores: Vec<u32>,
}

/// JSON-file backed store. Writes go to a sibling temp file first and are
/// renamed into place, so a crash mid-write leaves the previous list intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Vec<u32> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            // First run: no file yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e,
                    "Failed to read leaderboard, treating as empty");
                return Vec::new();
            },
        };
        match serde_json::from_str::<ScoreFile>(&contents) {
            Ok(file) => file.high_scores,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e,
                    "Corrupt leaderboard data, treating as empty");
                Vec::new()
            },
        }
    }

    fn save(&mut self, scores: &[u32]) {
        let file = ScoreFile {
            high_scores: scores.to_vec(),
        };
        let json = match serde_json::to_string(&file) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize leaderboard");
                return;
            },
        };
        let tmp = self.tmp_path();
        let result = std::fs::write(&tmp, json).and_then(|_| std::fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e,
                "Failed to persist leaderboard");
        }
    }

    fn clear(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e,
                "Failed to clear leaderboard");
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: Vec<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Vec<u32> {
        self.scores.clone()
    }

    fn save(&mut self, scores: &[u32]) {
        self.scores = scores.to_vec();
    }

    fn clear(&mut self) {
        self.scores.clear();
    }
}
