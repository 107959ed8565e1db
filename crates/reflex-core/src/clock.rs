/// Format a countdown as `mm:ss`, flooring to whole seconds.
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Round countdown. `tick` reports expiry exactly once; further ticks
/// are no-ops.
#[derive(Debug, Clone)]
pub struct RoundTimer {
    remaining: f32,
}

impl RoundTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration.max(0.0),
        }
    }

    /// Advance by `dt` seconds. Returns true on the tick where the
    /// countdown crosses zero; the remaining time is clamped to 0.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            return true;
        }
        false
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Remaining time as `mm:ss` for the timer display.
    pub fn formatted(&self) -> String {
        format_clock(self.remaining)
    }
}
