use serde::{Deserialize, Serialize};

/// Configuration for one round mode.
///
/// The three shipped modes are specializations of the same engine:
/// single-target is simply `max_simultaneous_targets = 1`, decoy mode is a
/// `reward_probability` below 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Number of addressable target slots.
    pub slot_count: usize,
    /// Round duration in seconds.
    pub round_time: f32,
    /// How many targets are kept live at once.
    pub max_simultaneous_targets: usize,
    /// Per-target lifetime in seconds. `None` means targets wait
    /// indefinitely for a selection.
    pub target_lifetime: Option<f32>,
    /// Probability that a spawned target is a reward rather than a decoy.
    pub reward_probability: f64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::single_target()
    }
}

impl RoundConfig {
    /// Classic mode: one long-lived target at a time, 30 second round.
    pub fn single_target() -> Self {
        Self {
            slot_count: 9,
            round_time: 30.0,
            max_simultaneous_targets: 1,
            target_lifetime: None,
            reward_probability: 1.0,
        }
    }

    /// Two concurrent targets that expire after 1.5 seconds.
    pub fn multi_target() -> Self {
        Self {
            slot_count: 9,
            round_time: 20.0,
            max_simultaneous_targets: 2,
            target_lifetime: Some(1.5),
            reward_probability: 1.0,
        }
    }

    /// Three concurrent fast targets, half of which are penalizing decoys.
    pub fn with_decoys() -> Self {
        Self {
            slot_count: 9,
            round_time: 15.0,
            max_simultaneous_targets: 3,
            target_lifetime: Some(1.0),
            reward_probability: 0.5,
        }
    }

    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("REFLEX_CONFIG") {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Self>(&contents) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Failed to parse {path}: {e}, using defaults"),
                },
                Err(e) => tracing::warn!("Failed to read {path}: {e}, using defaults"),
            }
        }
        if let Ok(contents) = std::fs::read_to_string("config/reflex.toml")
            && let Ok(config) = toml::from_str::<Self>(&contents)
        {
            return config;
        }
        Self::default()
    }

    /// Check the parameters a round cannot start without. Capacity
    /// shortfalls (fewer slots than requested targets) are deliberately
    /// not an error; the round degrades to as many targets as fit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::NoSlots);
        }
        if self.round_time.is_nan() || self.round_time <= 0.0 {
            return Err(ConfigError::NonPositiveRoundTime(self.round_time));
        }
        if self.max_simultaneous_targets == 0 {
            return Err(ConfigError::NoTargets);
        }
        if !(0.0..=1.0).contains(&self.reward_probability) {
            return Err(ConfigError::ProbabilityOutOfRange(self.reward_probability));
        }
        Ok(())
    }
}

/// Invalid round parameters, surfaced at round-start.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoSlots,
    NoTargets,
    NonPositiveRoundTime(f32),
    ProbabilityOutOfRange(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSlots => write!(f, "slot_count must be at least 1"),
            Self::NoTargets => write!(f, "max_simultaneous_targets must be at least 1"),
            Self::NonPositiveRoundTime(t) => {
                write!(f, "round_time must be positive, got {t}")
            },
            Self::ProbabilityOutOfRange(p) => {
                write!(f, "reward_probability must be in [0, 1], got {p}")
            },
        }
    }
}

impl std::error::Error for ConfigError {}
