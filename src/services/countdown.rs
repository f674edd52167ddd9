use std::time::Duration;

/// Interval between countdown ticks.
pub const TICK: Duration = Duration::from_secs(1);

/// Remaining time of one attempt, decremented once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration_seconds: i32,
    remaining_seconds: i32,
}

impl Countdown {
    pub fn new(duration_seconds: i32) -> Self {
        let duration_seconds = duration_seconds.max(0);
        Self {
            duration_seconds,
            remaining_seconds: duration_seconds,
        }
    }

    /// Returns `true` only on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        self.remaining_seconds == 0
    }

    pub fn duration_seconds(&self) -> i32 {
        self.duration_seconds
    }

    pub fn remaining_seconds(&self) -> i32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> i32 {
        self.duration_seconds - self.remaining_seconds
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }
}
