//! Rolling-average smoothing
//!
//! A bounded FIFO of the most recent raw values whose mean damps per-frame
//! detection jitter.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of frames averaged per metric
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Fixed-size trailing buffer of raw metric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    window_size: usize,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

impl RollingWindow {
    /// Create a window holding at most `window_size` values (minimum 1)
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Push a raw value, evicting the oldest on overflow, and return the new mean
    pub fn push(&mut self, value: f64) -> f64 {
        self.values.push_back(value);
        while self.values.len() > self.window_size {
            self.values.pop_front();
        }
        self.mean().unwrap_or(value)
    }

    /// Arithmetic mean of the stored values, `None` while empty.
    ///
    /// Accumulated as offsets from the oldest value so a window of identical
    /// values returns that value exactly.
    pub fn mean(&self) -> Option<f64> {
        let &pivot = self.values.front()?;
        let offset: f64 = self.values.iter().map(|v| v - pivot).sum();
        Some(pivot + offset / self.values.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean() {
        let mut window = RollingWindow::new(3);

        assert_eq!(window.push(10.0), 10.0);
        assert_eq!(window.push(20.0), 15.0);
        assert_eq!(window.push(30.0), 20.0);

        // Window is full, 10.0 drops out
        assert_eq!(window.push(40.0), 30.0);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_constant_input_converges_exactly() {
        let mut window = RollingWindow::new(DEFAULT_SMOOTHING_WINDOW);
        for v in [0.9, 0.1, 0.7, 0.3, 0.5] {
            window.push(v);
        }

        let mut last = 0.0;
        for _ in 0..DEFAULT_SMOOTHING_WINDOW {
            last = window.push(0.25);
        }
        assert_eq!(last, 0.25);
    }

    #[test]
    fn test_empty_window_has_no_mean() {
        let mut window = RollingWindow::default();
        assert_eq!(window.mean(), None);
        assert!(window.is_empty());

        window.push(1.0);
        window.clear();
        assert_eq!(window.mean(), None);
    }

    #[test]
    fn test_zero_window_size_holds_one_value() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.window_size(), 1);
        window.push(1.0);
        assert_eq!(window.push(3.0), 3.0);
    }
}
