//! Idle/dim policy for the display backlight.
//!
//! Level-triggered: every evaluation compares the idle time against the
//! timeout, there is no memory of the previous answer. Callers compare
//! the result with what the display currently shows and only write on a
//! change.

/// Backlight level chosen by the idle timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayPower {
    Bright,
    Dim,
}

impl DisplayPower {
    /// Fractional brightness to hand to the display sink.
    pub fn level(self, dim_level: f32) -> f32 {
        match self {
            DisplayPower::Bright => 1.0,
            DisplayPower::Dim => dim_level,
        }
    }
}

/// Decide the backlight level from idle time. Dims only once the idle
/// time strictly exceeds the timeout.
pub fn display_power(idle_ms: u64, dim_timeout_ms: u64) -> DisplayPower {
    if idle_ms > dim_timeout_ms {
        DisplayPower::Dim
    } else {
        DisplayPower::Bright
    }
}

/// Tracks the last qualifying activity (button press, new icon shown,
/// connection change).
#[derive(Clone, Copy, Debug)]
pub struct IdleTimer {
    last_activity: u64,
    timeout_ms: u64,
}

impl IdleTimer {
    pub const fn new(now: u64, timeout_ms: u64) -> Self {
        Self {
            last_activity: now,
            timeout_ms,
        }
    }

    /// Record activity at `now`.
    pub fn record_activity(&mut self, now: u64) {
        self.last_activity = now;
    }

    pub fn last_activity(&self) -> u64 {
        self.last_activity
    }

    pub fn evaluate(&self, now: u64) -> DisplayPower {
        display_power(now.saturating_sub(self.last_activity), self.timeout_ms)
    }
}
