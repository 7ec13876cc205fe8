//! Sliding-time-window event counting

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default trailing window for blink counting, in seconds
pub const DEFAULT_EVENT_WINDOW_SECONDS: f64 = 60.0;

/// Counts events whose age relative to the latest insertion is at most the
/// window duration.
///
/// Timestamps must be added in non-decreasing order. Eviction is relative to
/// the timestamp just added, so an out-of-order insertion does not evict
/// anything newer than itself and may leave entries older than the window;
/// the count under such input is unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedEventCounter {
    window_seconds: f64,
    timestamps: VecDeque<f64>,
}

impl Default for WindowedEventCounter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_WINDOW_SECONDS)
    }
}

impl WindowedEventCounter {
    pub fn new(window_seconds: f64) -> Self {
        Self {
            window_seconds,
            timestamps: VecDeque::new(),
        }
    }

    /// Record an event and evict entries older than the window
    pub fn add(&mut self, timestamp: f64) {
        self.timestamps.push_back(timestamp);
        while let Some(&oldest) = self.timestamps.front() {
            if timestamp - oldest > self.window_seconds {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of events retained after the latest insertion
    pub fn count(&self) -> usize {
        self.timestamps.len()
    }

    /// Events per minute, extrapolated from the window duration
    pub fn rate_per_minute(&self) -> f64 {
        let minutes = (self.window_seconds / 60.0).max(1e-3);
        self.count() as f64 / minutes
    }

    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }

    /// Timestamp of the most recently added event
    pub fn latest(&self) -> Option<f64> {
        self.timestamps.back().copied()
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }
}
