use reflex_core::config::{ConfigError, RoundConfig};
use reflex_core::events::RoundEvent;
use reflex_core::slots::SlotId;
use reflex_leaderboard::ScoreRecorder;

use crate::RoundEngine;

/// A round engine wired to a score recorder.
///
/// Forwards the engine's operations unchanged and commits the final score
/// of each round to the leaderboard the moment the `RoundEnded` event is
/// emitted, so a caller driving the session cannot forget (or repeat) the
/// commit.
pub struct GameSession {
    engine: RoundEngine,
    recorder: ScoreRecorder,
}

impl GameSession {
    pub fn new(config: RoundConfig, recorder: ScoreRecorder) -> Self {
        Self {
            engine: RoundEngine::new(config),
            recorder,
        }
    }

    pub fn with_seed(config: RoundConfig, seed: u64, recorder: ScoreRecorder) -> Self {
        Self {
            engine: RoundEngine::with_seed(config, seed),
            recorder,
        }
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    /// Current high scores, best first.
    pub fn high_scores(&self) -> Vec<u32> {
        self.recorder.high_scores()
    }

    pub fn start(&mut self) -> Result<Vec<RoundEvent>, ConfigError> {
        self.engine.start()
    }

    pub fn tick(&mut self, dt: f32) -> Vec<RoundEvent> {
        let events = self.engine.tick(dt);
        self.commit_final_score(&events);
        events
    }

    pub fn select(&mut self, slot: SlotId) -> Vec<RoundEvent> {
        self.engine.select(slot)
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    fn commit_final_score(&mut self, events: &[RoundEvent]) {
        for event in events {
            if let RoundEvent::RoundEnded { final_score } = event {
                self.recorder.commit(*final_score);
            }
        }
    }
}
