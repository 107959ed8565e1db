use crate::leaderboard::Leaderboard;

/// Commits final round scores to the leaderboard.
///
/// Thin by design: the round engine emits a final score and this adapter
/// owns the only write path into persistent history.
#[derive(Debug)]
pub struct ScoreRecorder {
    leaderboard: Leaderboard,
}

impl ScoreRecorder {
    pub fn new(leaderboard: Leaderboard) -> Self {
        Self { leaderboard }
    }

    /// Record a round's final score. Non-positive scores are dropped by
    /// the leaderboard itself.
    pub fn commit(&mut self, final_score: i32) {
        tracing::debug!(final_score, "Committing round score");
        self.leaderboard.submit(final_score);
    }

    /// Current high scores, best first.
    pub fn high_scores(&self) -> Vec<u32> {
        self.leaderboard.load()
    }

    pub fn leaderboard_mut(&mut self) -> &mut Leaderboard {
        &mut self.leaderboard
    }
}
