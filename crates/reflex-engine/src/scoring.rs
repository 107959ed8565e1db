use reflex_core::events::TargetRole;

/// Points for selecting a reward target.
pub const REWARD_POINTS: i32 = 1;
/// Points for selecting a penalizing decoy.
pub const PENALTY_POINTS: i32 = -1;

/// Score delta for a player selection. Only acting on a target scores;
/// a target that times out unselected is neutral in every mode.
pub fn selection_delta(role: TargetRole) -> i32 {
    match role {
        TargetRole::Reward => REWARD_POINTS,
        TargetRole::Penalty => PENALTY_POINTS,
    }
}
