//! Per-side countdown clocks.
//!
//! At most one clock runs at a time: starting a clock stops the other one.
//! Expiry is reported exactly once and an expired clock never restarts.

use std::time::Duration;

use tracing::{debug, info};

use crate::game_state::chess_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    pub remaining: Duration,
    pub running: bool,
    pub expired: bool,
}

impl ClockState {
    fn new(remaining: Duration) -> Self {
        Self {
            remaining,
            running: false,
            expired: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clocks {
    states: [ClockState; 2],
    tick: Duration,
}

impl Clocks {
    pub fn new(initial: Duration, tick: Duration) -> Self {
        Self {
            states: [ClockState::new(initial); 2],
            tick,
        }
    }

    #[inline]
    pub fn state(&self, color: Color) -> &ClockState {
        &self.states[color.index()]
    }

    #[inline]
    pub fn remaining(&self, color: Color) -> Duration {
        self.states[color.index()].remaining
    }

    /// Color of the running clock, if any.
    pub fn running(&self) -> Option<Color> {
        Color::BOTH
            .into_iter()
            .find(|c| self.states[c.index()].running)
    }

    /// Idempotent. Starting one side stops the other.
    pub fn set_running(&mut self, color: Color, running: bool) {
        if running {
            if self.states[color.index()].expired {
                return;
            }
            self.states[color.opposite().index()].running = false;
        }
        self.states[color.index()].running = running;
    }

    pub fn stop_all(&mut self) {
        for state in &mut self.states {
            state.running = false;
        }
    }

    /// Stops both clocks and sets both to `duration`.
    pub fn reset_both(&mut self, duration: Duration) {
        self.states = [ClockState::new(duration); 2];
    }

    /// Fischer increment for `color`. Expired clocks are left alone.
    pub fn add_increment(&mut self, color: Color, increment: Duration) {
        let state = &mut self.states[color.index()];
        if !state.expired && !increment.is_zero() {
            state.remaining += increment;
        }
    }

    /// Advance the running clock by one tick. Returns the color whose clock
    /// ran out on this tick.
    pub fn tick(&mut self) -> Option<Color> {
        let color = self.running()?;
        let state = &mut self.states[color.index()];
        state.remaining = state.remaining.saturating_sub(self.tick);

        if state.remaining.is_zero() && !state.expired {
            state.expired = true;
            state.running = false;
            info!(color = %color, "clock expired");
            return Some(color);
        }
        debug!(color = %color, remaining_ms = state.remaining.as_millis() as u64, "clock tick");
        None
    }
}

/// `mm:ss`, rounding partial seconds down.
pub fn format_clock(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
