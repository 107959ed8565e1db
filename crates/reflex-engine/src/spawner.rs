use rand::Rng;

use reflex_core::config::RoundConfig;
use reflex_core::events::TargetRole;
use reflex_core::slots::{SlotId, SlotPool};
use reflex_core::timers::{TimerHandle, TimerQueue};

/// A target currently occupying a slot.
///
/// The timeout handle is the target's single-use cancellation token;
/// resolution always cancels it before acting. Targets in single-target
/// mode have no lifetime and carry no handle.
#[derive(Debug, Clone, Copy)]
pub struct LiveTarget {
    pub slot: SlotId,
    pub role: TargetRole,
    pub timeout: Option<TimerHandle>,
}

/// Activate a free slot as a new live target.
///
/// Returns `None` when the pool has no free slot; the caller retries on a
/// later tick rather than spinning. The role is decided by one weighted
/// coin flip with `reward_probability`. A non-positive lifetime still
/// spawns normally and times out on the next tick, so observers always see
/// the activation before the resolution.
pub fn spawn_target(
    pool: &mut SlotPool,
    timers: &mut TimerQueue<SlotId>,
    config: &RoundConfig,
    rng: &mut impl Rng,
) -> Option<LiveTarget> {
    let slot = pool.acquire_free(rng)?;
    let role = if rng.random_bool(config.reward_probability) {
        TargetRole::Reward
    } else {
        TargetRole::Penalty
    };
    let timeout = config
        .target_lifetime
        .map(|lifetime| timers.schedule(lifetime, slot));
    Some(LiveTarget {
        slot,
        role,
        timeout,
    })
}
