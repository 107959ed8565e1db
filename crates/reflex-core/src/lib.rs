pub mod clock;
pub mod config;
pub mod events;
pub mod slots;
pub mod timers;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::config::RoundConfig;
    use crate::events::{ResolveOutcome, RoundEvent, TargetRole};
    use crate::slots::SlotId;

    /// Build a config for deterministic round tests.
    pub fn test_config(
        slot_count: usize,
        round_time: f32,
        max_simultaneous_targets: usize,
        target_lifetime: Option<f32>,
    ) -> RoundConfig {
        RoundConfig {
            slot_count,
            round_time,
            max_simultaneous_targets,
            target_lifetime,
            reward_probability: 1.0,
        }
    }

    /// Slots activated in an event batch, in emission order.
    pub fn activated_slots(events: &[RoundEvent]) -> Vec<SlotId> {
        events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::TargetActivated { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect()
    }

    /// Activated (slot, role) pairs in an event batch.
    pub fn activated_roles(events: &[RoundEvent]) -> Vec<(SlotId, TargetRole)> {
        events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::TargetActivated { slot, role } => Some((*slot, *role)),
                _ => None,
            })
            .collect()
    }

    /// Resolved (slot, outcome) pairs in an event batch.
    pub fn resolved_slots(events: &[RoundEvent]) -> Vec<(SlotId, ResolveOutcome)> {
        events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::TargetResolved { slot, outcome } => Some((*slot, *outcome)),
                _ => None,
            })
            .collect()
    }

    /// The final score from a `RoundEnded` event, if the batch contains one.
    pub fn final_score(events: &[RoundEvent]) -> Option<i32> {
        events.iter().find_map(|e| match e {
            RoundEvent::RoundEnded { final_score } => Some(*final_score),
            _ => None,
        })
    }

    /// Sum of all `ScoreChanged` deltas in an event batch.
    pub fn score_delta_sum(events: &[RoundEvent]) -> i32 {
        events
            .iter()
            .map(|e| match e {
                RoundEvent::ScoreChanged { delta, .. } => *delta,
                _ => 0,
            })
            .sum()
    }
}
