//! Tap counting with a decaying time window
//!
//! The first tap opens a window of `tap_time_delta` seconds. Taps landing
//! while the window is open accumulate; once it runs out the count is cleared.
//! Later taps never extend the window.

/// Default tap window in seconds
pub const DEFAULT_TAP_TIME_DELTA: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct TapCounter {
    delta: f32,
    remaining: f32,
    count: u32,
}

impl TapCounter {
    pub fn new(delta: f32) -> Self {
        Self {
            delta,
            remaining: 0.0,
            count: 0,
        }
    }

    /// Advance the window by `dt` seconds, clearing the count once it closes
    pub fn tick(&mut self, dt: f32) {
        if self.is_window_open() {
            self.remaining = (self.remaining - dt).max(0.0);
        }
        if !self.is_window_open() {
            self.count = 0;
        }
    }

    /// Record a touch-down
    pub fn register_tap(&mut self) {
        if self.is_window_open() {
            self.count += 1;
        } else {
            self.count = 1;
            self.remaining = self.delta;
        }
    }

    /// Raise the count to a platform-reported value if that is larger
    pub fn adopt_native(&mut self, native: u32) {
        if native > self.count {
            self.count = native;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_window_open(&self) -> bool {
        self.remaining > 0.0
    }
}

impl Default for TapCounter {
    fn default() -> Self {
        Self::new(DEFAULT_TAP_TIME_DELTA)
    }
}
