pub mod scoring;
pub mod session;
pub mod spawner;

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use reflex_core::clock::RoundTimer;
use reflex_core::config::{ConfigError, RoundConfig};
use reflex_core::events::{ResolveOutcome, RoundEvent, RoundPhase, TargetRole};
use reflex_core::slots::{SlotId, SlotPool};
use reflex_core::timers::TimerQueue;

use spawner::{LiveTarget, spawn_target};

pub use session::GameSession;

/// The round lifecycle state machine.
///
/// One cooperative timeline drives everything: `tick` advances both the
/// round countdown and the per-target timeout queue, and `select` is applied
/// on the same timeline by the caller. A target resolves exactly once;
/// whichever of selection and timeout lands first removes it from the live
/// map and cancels the other path, so the loser is a silent no-op.
pub struct RoundEngine {
    config: RoundConfig,
    phase: RoundPhase,
    timer: RoundTimer,
    score: i32,
    pool: SlotPool,
    timers: TimerQueue<SlotId>,
    live: HashMap<SlotId, LiveTarget>,
    rng: StdRng,
}

impl RoundEngine {
    pub fn new(config: RoundConfig) -> Self {
        let seed = rand::rng().random();
        Self::with_seed(config, seed)
    }

    /// Deterministic construction for simulation and tests.
    pub fn with_seed(config: RoundConfig, seed: u64) -> Self {
        let timer = RoundTimer::new(config.round_time);
        let pool = SlotPool::new(config.slot_count);
        Self {
            config,
            phase: RoundPhase::Idle,
            timer,
            score: 0,
            pool,
            timers: TimerQueue::new(),
            live: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Remaining round time in seconds, clamped at 0.
    pub fn remaining(&self) -> f32 {
        self.timer.remaining()
    }

    /// Remaining round time as `mm:ss` for the timer display.
    pub fn formatted_remaining(&self) -> String {
        self.timer.formatted()
    }

    pub fn live_target_count(&self) -> usize {
        self.live.len()
    }

    /// Slots currently occupied by a live target, in slot order.
    pub fn live_slots(&self) -> Vec<SlotId> {
        let mut slots: Vec<SlotId> = self.live.keys().copied().collect();
        slots.sort_unstable();
        slots
    }

    /// Role of the live target on `slot`, if any. Drives the target's
    /// visual styling externally.
    pub fn target_role(&self, slot: SlotId) -> Option<TargetRole> {
        self.live.get(&slot).map(|t| t.role)
    }

    /// Begin a round. Only valid from `Idle`; a start request in any other
    /// phase is ignored, matching the start-button guard it stands in for.
    ///
    /// Invalid configuration is surfaced here and the round does not begin.
    /// A pool smaller than `max_simultaneous_targets` is not an error: the
    /// round starts with as many targets as fit.
    pub fn start(&mut self) -> Result<Vec<RoundEvent>, ConfigError> {
        if self.phase != RoundPhase::Idle {
            return Ok(Vec::new());
        }
        self.config.validate()?;

        self.timer = RoundTimer::new(self.config.round_time);
        self.score = 0;
        self.pool = SlotPool::new(self.config.slot_count);
        self.timers.clear();
        self.live.clear();
        self.phase = RoundPhase::Active;

        let mut events = vec![RoundEvent::RoundStarted];
        self.fill_to_capacity(&mut events);
        tracing::debug!(
            targets = self.live.len(),
            round_time = self.config.round_time,
            "Round started"
        );
        Ok(events)
    }

    /// Advance the round by `dt` seconds: fire due target timeouts, then
    /// the round countdown. A tick in `Idle` or `Ended` is a no-op.
    pub fn tick(&mut self, dt: f32) -> Vec<RoundEvent> {
        if self.phase != RoundPhase::Active {
            return Vec::new();
        }
        let mut events = Vec::new();

        for slot in self.timers.advance(dt) {
            self.resolve(slot, ResolveOutcome::TimedOut, &mut events);
        }

        if self.timer.tick(dt) {
            self.finish_round(&mut events);
        } else {
            // Retry any refill that found no free slot earlier
            self.fill_to_capacity(&mut events);
        }
        events
    }

    /// Apply a player selection for `slot`. Selections outside an active
    /// round, or for a slot whose target already resolved, are silently
    /// ignored; that stale-event tolerance is what makes the selection /
    /// timeout race safe.
    pub fn select(&mut self, slot: SlotId) -> Vec<RoundEvent> {
        if self.phase != RoundPhase::Active {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.resolve(slot, ResolveOutcome::Selected, &mut events);
        events
    }

    /// Return to `Idle` after a finished round. Does not touch the
    /// leaderboard.
    pub fn reset(&mut self) {
        if self.phase != RoundPhase::Ended {
            return;
        }
        self.phase = RoundPhase::Idle;
        self.score = 0;
        self.timer = RoundTimer::new(self.config.round_time);
        self.pool = SlotPool::new(self.config.slot_count);
        self.timers.clear();
        self.live.clear();
    }

    /// The single resolution path for every terminal target event.
    /// Absent map entries mean the target already resolved: no-op.
    fn resolve(&mut self, slot: SlotId, outcome: ResolveOutcome, events: &mut Vec<RoundEvent>) {
        let Some(target) = self.live.remove(&slot) else {
            return;
        };
        if let Some(handle) = target.timeout {
            self.timers.cancel(handle);
        }
        self.pool.release(slot);
        events.push(RoundEvent::TargetResolved { slot, outcome });

        if outcome == ResolveOutcome::Selected {
            let delta = scoring::selection_delta(target.role);
            self.score += delta;
            events.push(RoundEvent::ScoreChanged {
                score: self.score,
                delta,
            });
        }

        // Refill keeps the live-target count constant for the whole round;
        // forced end-of-round resolution must not respawn.
        if outcome != ResolveOutcome::RoundExpired {
            self.fill_to_capacity(events);
        }
    }

    fn fill_to_capacity(&mut self, events: &mut Vec<RoundEvent>) {
        while self.live.len() < self.config.max_simultaneous_targets {
            let Some(target) =
                spawn_target(&mut self.pool, &mut self.timers, &self.config, &mut self.rng)
            else {
                break;
            };
            events.push(RoundEvent::TargetActivated {
                slot: target.slot,
                role: target.role,
            });
            self.live.insert(target.slot, target);
        }
    }

    fn finish_round(&mut self, events: &mut Vec<RoundEvent>) {
        let mut slots: Vec<SlotId> = self.live.keys().copied().collect();
        slots.sort_unstable();
        for slot in slots {
            self.resolve(slot, ResolveOutcome::RoundExpired, events);
        }
        self.timers.clear();
        self.phase = RoundPhase::Ended;
        tracing::debug!(final_score = self.score, "Round ended");
        events.push(RoundEvent::RoundEnded {
            final_score: self.score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::test_helpers::{
        activated_roles, activated_slots, final_score, resolved_slots, score_delta_sum,
        test_config,
    };

    fn active_engine(config: RoundConfig, seed: u64) -> RoundEngine {
        let mut engine = RoundEngine::with_seed(config, seed);
        engine.start().unwrap();
        engine
    }

    #[test]
    fn start_spawns_requested_targets() {
        let engine = active_engine(test_config(9, 15.0, 3, Some(1.0)), 1);
        assert_eq!(engine.phase(), RoundPhase::Active);
        assert_eq!(engine.live_target_count(), 3);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn start_emits_round_started_then_activations() {
        let mut engine = RoundEngine::with_seed(test_config(9, 15.0, 3, Some(1.0)), 1);
        let events = engine.start().unwrap();
        assert_eq!(events[0], RoundEvent::RoundStarted);
        assert_eq!(activated_slots(&events).len(), 3);
    }

    #[test]
    fn start_with_invalid_config_does_not_begin() {
        let mut engine = RoundEngine::with_seed(test_config(0, 15.0, 3, Some(1.0)), 1);
        assert!(engine.start().is_err());
        assert_eq!(engine.phase(), RoundPhase::Idle);
    }

    #[test]
    fn start_while_active_is_ignored() {
        let mut engine = active_engine(test_config(9, 15.0, 3, Some(1.0)), 1);
        let before = engine.live_slots();
        let events = engine.start().unwrap();
        assert!(events.is_empty());
        assert_eq!(engine.live_slots(), before);
    }

    #[test]
    fn capacity_shortfall_degrades_without_error() {
        let engine = active_engine(test_config(2, 15.0, 3, Some(1.0)), 1);
        assert_eq!(engine.live_target_count(), 2);
        assert_eq!(engine.phase(), RoundPhase::Active);
    }

    #[test]
    fn selection_scores_and_refills() {
        let mut engine = active_engine(test_config(9, 15.0, 3, Some(1.0)), 2);
        let slot = engine.live_slots()[0];
        let events = engine.select(slot);

        assert_eq!(engine.score(), 1);
        assert_eq!(
            resolved_slots(&events),
            vec![(slot, ResolveOutcome::Selected)]
        );
        assert_eq!(activated_slots(&events).len(), 1, "Refill should spawn");
        assert_eq!(engine.live_target_count(), 3);
    }

    #[test]
    fn selecting_same_slot_twice_scores_once() {
        let mut engine = active_engine(test_config(9, 15.0, 1, None), 3);
        let slot = engine.live_slots()[0];
        engine.select(slot);
        let score_after_first = engine.score();

        // The refill may have landed on the same slot; only select again
        // if it is genuinely stale.
        if !engine.live_slots().contains(&slot) {
            let events = engine.select(slot);
            assert!(events.is_empty(), "Stale selection must be a no-op");
        }
        assert_eq!(engine.score(), score_after_first);
    }

    #[test]
    fn selection_of_never_active_slot_is_ignored() {
        let mut engine = active_engine(test_config(3, 15.0, 1, None), 4);
        let live = engine.live_slots();
        let stale: SlotId = (0..3).find(|s| !live.contains(s)).unwrap();

        let events = engine.select(stale);
        assert!(events.is_empty());
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn timeouts_never_score_and_keep_count_constant() {
        let mut engine = active_engine(test_config(9, 15.0, 3, Some(1.0)), 5);
        let events = engine.tick(1.0);

        let resolved = resolved_slots(&events);
        assert_eq!(resolved.len(), 3);
        assert!(
            resolved
                .iter()
                .all(|(_, outcome)| *outcome == ResolveOutcome::TimedOut)
        );
        assert_eq!(score_delta_sum(&events), 0);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.live_target_count(), 3, "Each timeout must refill");
    }

    #[test]
    fn selection_cancels_pending_timeout() {
        let mut engine = active_engine(test_config(2, 15.0, 1, Some(1.0)), 6);
        let slot = engine.live_slots()[0];
        engine.tick(0.5);
        engine.select(slot);
        assert_eq!(engine.score(), 1);

        // Crossing the first target's 1.0s deadline: the cancelled timeout must
        // not fire, and the replacement's own deadline is still ahead.
        let events = engine.tick(0.6);
        assert!(resolved_slots(&events).is_empty());
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.live_target_count(), 1);
    }

    #[test]
    fn zero_lifetime_activates_before_resolving() {
        let mut engine = RoundEngine::with_seed(test_config(9, 15.0, 1, Some(0.0)), 7);
        let start_events = engine.start().unwrap();
        let spawned = activated_slots(&start_events);
        assert_eq!(spawned.len(), 1, "Zero lifetime must still activate");

        let events = engine.tick(0.016);
        let resolved = resolved_slots(&events);
        assert_eq!(resolved[0], (spawned[0], ResolveOutcome::TimedOut));
        assert_eq!(engine.live_target_count(), 1);
    }

    #[test]
    fn round_timer_expires_exactly_once() {
        let mut engine = active_engine(test_config(9, 2.0, 1, None), 8);
        let events = engine.tick(1.0);
        assert!(final_score(&events).is_none());

        let events = engine.tick(1.5);
        assert_eq!(final_score(&events), Some(0));
        assert_eq!(engine.phase(), RoundPhase::Ended);
        assert_eq!(engine.remaining(), 0.0);

        // Further ticks after Ended are no-ops
        assert!(engine.tick(1.0).is_empty());
        assert_eq!(engine.phase(), RoundPhase::Ended);
    }

    #[test]
    fn round_end_force_resolves_without_scoring_or_refill() {
        let mut engine = active_engine(test_config(9, 1.0, 3, Some(10.0)), 9);
        let events = engine.tick(1.0);

        let resolved = resolved_slots(&events);
        assert_eq!(resolved.len(), 3);
        assert!(
            resolved
                .iter()
                .all(|(_, outcome)| *outcome == ResolveOutcome::RoundExpired)
        );
        assert_eq!(score_delta_sum(&events), 0);
        assert_eq!(engine.live_target_count(), 0);
        assert_eq!(final_score(&events), Some(0));
    }

    #[test]
    fn final_score_reflects_selections() {
        let mut engine = active_engine(test_config(9, 5.0, 2, None), 10);
        for _ in 0..4 {
            let slot = engine.live_slots()[0];
            engine.select(slot);
        }
        let events = engine.tick(5.0);
        assert_eq!(final_score(&events), Some(4));
    }

    #[test]
    fn stale_timeouts_cannot_leak_into_a_new_round() {
        let mut engine = active_engine(test_config(9, 1.0, 3, Some(10.0)), 11);
        engine.tick(1.0);
        assert_eq!(engine.phase(), RoundPhase::Ended);

        engine.reset();
        engine.start().unwrap();
        // Old deadlines (10s) would fall inside this window if they survived
        let events = engine.tick(0.5);
        assert!(resolved_slots(&events).is_empty());
        assert_eq!(engine.live_target_count(), 3);
    }

    #[test]
    fn reset_only_applies_after_ended() {
        let mut engine = active_engine(test_config(9, 15.0, 3, Some(1.0)), 12);
        engine.reset();
        assert_eq!(engine.phase(), RoundPhase::Active);

        engine.tick(15.0);
        engine.reset();
        assert_eq!(engine.phase(), RoundPhase::Idle);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.live_target_count(), 0);
        assert_eq!(engine.remaining(), 15.0);
    }

    #[test]
    fn select_outside_active_round_is_ignored() {
        let mut engine = RoundEngine::with_seed(test_config(9, 15.0, 3, Some(1.0)), 13);
        assert!(engine.select(0).is_empty());

        engine.start().unwrap();
        engine.tick(15.0);
        assert!(engine.select(0).is_empty());
    }

    #[test]
    fn decoy_selection_scores_by_role() {
        let config = RoundConfig {
            reward_probability: 0.5,
            ..test_config(9, 15.0, 3, Some(5.0))
        };
        let mut engine = active_engine(config, 14);

        let mut expected = 0;
        for _ in 0..20 {
            let slot = engine.live_slots()[0];
            let role = engine.target_role(slot).unwrap();
            expected += match role {
                TargetRole::Reward => 1,
                TargetRole::Penalty => -1,
            };
            engine.select(slot);
            assert_eq!(engine.score(), expected);
        }
    }

    #[test]
    fn decoy_timeouts_are_neutral_for_both_roles() {
        let config = RoundConfig {
            reward_probability: 0.5,
            ..test_config(9, 60.0, 3, Some(1.0))
        };
        let mut engine = active_engine(config, 15);
        let mut saw_reward = false;
        let mut saw_penalty = false;
        for _ in 0..20 {
            for (_, role) in activated_roles(&engine.tick(1.0)) {
                match role {
                    TargetRole::Reward => saw_reward = true,
                    TargetRole::Penalty => saw_penalty = true,
                }
            }
        }
        assert!(saw_reward && saw_penalty, "Both roles should have spawned");
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn refill_reuses_slots_without_duplicates() {
        let mut engine = active_engine(test_config(3, 60.0, 3, Some(1.0)), 16);
        for _ in 0..10 {
            engine.tick(1.0);
            let slots = engine.live_slots();
            assert_eq!(slots.len(), 3);
            let mut dedup = slots.clone();
            dedup.dedup();
            assert_eq!(dedup, slots, "Live slots must be unique");
        }
    }

    #[test]
    fn display_values_track_the_round() {
        let mut engine = active_engine(test_config(9, 90.0, 1, None), 17);
        assert_eq!(engine.formatted_remaining(), "01:30");
        engine.tick(30.5);
        assert_eq!(engine.formatted_remaining(), "00:59");
        let slot = engine.live_slots()[0];
        engine.select(slot);
        assert_eq!(engine.score(), 1);
    }

    #[test]
    fn scenario_hard_mode_walkthrough() {
        // roundTime=15, maxSimultaneousTargets=3, targetLifetime=1,
        // rewardProbability=1.0
        let mut engine = active_engine(test_config(9, 15.0, 3, Some(1.0)), 18);
        assert_eq!(engine.live_target_count(), 3);

        // Selecting one immediately scores the round to 1 with a replacement
        let slot = engine.live_slots()[0];
        let events = engine.select(slot);
        assert_eq!(engine.score(), 1);
        assert_eq!(activated_slots(&events).len(), 1);
        assert_eq!(engine.live_target_count(), 3);

        // Full-second ticks expire every target and refill each time
        for _ in 0..14 {
            engine.tick(1.0);
            assert_eq!(engine.live_target_count(), 3);
            assert_eq!(engine.score(), 1);
        }

        let events = engine.tick(1.0);
        assert_eq!(final_score(&events), Some(1));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Tick(u8),
            Select(SlotId),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1u8..50).prop_map(Op::Tick),
                (0u32..12).prop_map(Op::Select),
            ]
        }

        proptest! {
            #[test]
            fn score_is_always_the_sum_of_deltas(
                seed in 0u64..1000,
                ops in proptest::collection::vec(op_strategy(), 1..60),
            ) {
                let config = RoundConfig {
                    reward_probability: 0.5,
                    ..reflex_core::test_helpers::test_config(9, 15.0, 3, Some(1.0))
                };
                let mut engine = RoundEngine::with_seed(config, seed);
                let mut delta_sum = reflex_core::test_helpers::score_delta_sum(
                    &engine.start().unwrap(),
                );

                for op in ops {
                    let events = match op {
                        Op::Tick(centis) => engine.tick(f32::from(centis) / 100.0),
                        Op::Select(slot) => engine.select(slot),
                    };
                    for event in &events {
                        if let RoundEvent::ScoreChanged { score, delta } = event {
                            delta_sum += delta;
                            prop_assert_eq!(*score, delta_sum);
                        }
                    }
                    prop_assert!(engine.live_target_count() <= 3);
                }
                prop_assert_eq!(engine.score(), delta_sum);
            }

            #[test]
            fn non_decoy_score_never_decreases(
                seed in 0u64..1000,
                ops in proptest::collection::vec(op_strategy(), 1..60),
            ) {
                let config = reflex_core::test_helpers::test_config(9, 15.0, 3, Some(1.0));
                let mut engine = RoundEngine::with_seed(config, seed);
                engine.start().unwrap();

                let mut last_score = 0;
                for op in ops {
                    match op {
                        Op::Tick(centis) => engine.tick(f32::from(centis) / 100.0),
                        Op::Select(slot) => engine.select(slot),
                    };
                    prop_assert!(engine.score() >= last_score);
                    last_score = engine.score();
                }
            }

            #[test]
            fn live_count_matches_pool_bookkeeping(
                seed in 0u64..1000,
                ops in proptest::collection::vec(op_strategy(), 1..60),
            ) {
                let config = reflex_core::test_helpers::test_config(4, 15.0, 3, Some(1.0));
                let mut engine = RoundEngine::with_seed(config, seed);
                engine.start().unwrap();

                for op in ops {
                    match op {
                        Op::Tick(centis) => engine.tick(f32::from(centis) / 100.0),
                        Op::Select(slot) => engine.select(slot),
                    };
                    if engine.phase() == RoundPhase::Active {
                        prop_assert_eq!(engine.live_target_count(), 3);
                    } else {
                        prop_assert_eq!(engine.live_target_count(), 0);
                    }
                }
            }
        }
    }
}
