pub mod leaderboard;
pub mod recorder;
pub mod store;

pub use leaderboard::{Leaderboard, MAX_ENTRIES};
pub use recorder::ScoreRecorder;
pub use store::{JsonFileStore, MemoryStore, ScoreStore};
