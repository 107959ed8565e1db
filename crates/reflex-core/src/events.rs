use serde::{Deserialize, Serialize};

use crate::slots::SlotId;

/// Whether acting on a target rewards or penalizes the player.
///
/// Every spawned target carries a role; outside decoy mode the reward
/// probability is 1.0, so the role is always `Reward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRole {
    Reward,
    Penalty,
}

/// The single terminal event ending a live target's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveOutcome {
    /// The player acted on the target while it was live.
    Selected,
    /// The target's own lifetime elapsed.
    TimedOut,
    /// The round ended while the target was still live.
    RoundExpired,
}

/// Round lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Idle,
    Active,
    Ended,
}

/// Events emitted by the round engine. Rendering and audio are driven
/// entirely from these; the engine never touches a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    RoundStarted,
    TargetActivated { slot: SlotId, role: TargetRole },
    TargetResolved { slot: SlotId, outcome: ResolveOutcome },
    ScoreChanged { score: i32, delta: i32 },
    RoundEnded { final_score: i32 },
}
