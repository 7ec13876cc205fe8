//! Blink rate tracking
//!
//! Two-state machine over the mean eye aspect ratio:
//! `Open` → `Blinking` when the ratio drops below the threshold, and back to
//! `Open` once it reaches the threshold again. Only the closing edge records a
//! blink, so one physical blink spanning several closed-eye frames counts once.

use crate::events::{WindowedEventCounter, DEFAULT_EVENT_WINDOW_SECONDS};
use log::debug;
use serde::{Deserialize, Serialize};

/// Eye aspect ratio below which the eyes are considered closed
pub const DEFAULT_BLINK_THRESHOLD: f64 = 0.23;

/// Eye state between frames
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlinkState {
    pub is_blinking: bool,
    /// Last observed mean eye aspect ratio
    pub last_eye_ratio: Option<f64>,
}

/// Edge-detecting blink counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlinkRateTracker {
    threshold: f64,
    state: BlinkState,
    events: WindowedEventCounter,
}

impl Default for BlinkRateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_THRESHOLD, DEFAULT_EVENT_WINDOW_SECONDS)
    }
}

impl BlinkRateTracker {
    pub fn new(threshold: f64, window_seconds: f64) -> Self {
        Self {
            threshold,
            state: BlinkState::default(),
            events: WindowedEventCounter::new(window_seconds),
        }
    }

    /// Feed one frame's mean eye aspect ratio and return blinks per minute
    pub fn update(&mut self, eye_ratio: f64, timestamp: f64) -> f64 {
        let is_blinking = eye_ratio < self.threshold;
        if is_blinking && !self.state.is_blinking {
            self.events.add(timestamp);
            debug!(
                "blink at t={timestamp:.3}s (ratio {eye_ratio:.3}), {} in window",
                self.events.count()
            );
        }
        self.state = BlinkState {
            is_blinking,
            last_eye_ratio: Some(eye_ratio),
        };
        self.events.rate_per_minute()
    }

    pub fn blink_rate(&self) -> f64 {
        self.events.rate_per_minute()
    }

    pub fn blink_count(&self) -> usize {
        self.events.count()
    }

    pub fn state(&self) -> BlinkState {
        self.state
    }

    pub fn events(&self) -> &WindowedEventCounter {
        &self.events
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.state = BlinkState::default();
        self.events.clear();
    }
}
