//! Per-session extraction state
//!
//! A `SessionContext` bundles everything that persists between frames of one
//! subject: a rolling window per smoothed metric, the blink tracker and the
//! previous nose height. It is owned by the caller and passed to
//! [`FeatureExtractor::extract`](crate::features::FeatureExtractor::extract),
//! so one extractor can serve any number of sessions.

use crate::blink::{BlinkRateTracker, DEFAULT_BLINK_THRESHOLD};
use crate::error::AnalyzerError;
use crate::events::DEFAULT_EVENT_WINDOW_SECONDS;
use crate::smoothing::{RollingWindow, DEFAULT_SMOOTHING_WINDOW};
use crate::types::FeatureName;
use serde::{Deserialize, Serialize};

/// Mutable history for one tracked face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub(crate) eyebrow: RollingWindow,
    pub(crate) lip_tension: RollingWindow,
    pub(crate) head_nod: RollingWindow,
    pub(crate) symmetry: RollingWindow,
    pub(crate) blink: BlinkRateTracker,
    pub(crate) previous_nose_y: Option<f64>,
    pub(crate) last_timestamp: Option<f64>,
    pub(crate) frames_processed: u64,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(
            DEFAULT_SMOOTHING_WINDOW,
            DEFAULT_BLINK_THRESHOLD,
            DEFAULT_EVENT_WINDOW_SECONDS,
        )
    }
}

impl SessionContext {
    pub fn new(smoothing_window: usize, blink_threshold: f64, blink_window_seconds: f64) -> Self {
        Self {
            eyebrow: RollingWindow::new(smoothing_window),
            lip_tension: RollingWindow::new(smoothing_window),
            head_nod: RollingWindow::new(smoothing_window),
            symmetry: RollingWindow::new(smoothing_window),
            blink: BlinkRateTracker::new(blink_threshold, blink_window_seconds),
            previous_nose_y: None,
            last_timestamp: None,
            frames_processed: 0,
        }
    }

    /// Smoothing window of a metric; blink rate has none
    pub fn window(&self, feature: FeatureName) -> Option<&RollingWindow> {
        match feature {
            FeatureName::EyebrowRaise => Some(&self.eyebrow),
            FeatureName::LipTension => Some(&self.lip_tension),
            FeatureName::HeadNodIntensity => Some(&self.head_nod),
            FeatureName::SymmetryDelta => Some(&self.symmetry),
            FeatureName::BlinkRate => None,
        }
    }

    pub fn blink_tracker(&self) -> &BlinkRateTracker {
        &self.blink
    }

    pub fn previous_nose_y(&self) -> Option<f64> {
        self.previous_nose_y
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Drop all history, keeping window sizes and blink settings
    pub fn reset(&mut self) {
        self.eyebrow.clear();
        self.lip_tension.clear();
        self.head_nod.clear();
        self.symmetry.clear();
        self.blink.reset();
        self.previous_nose_y = None;
        self.last_timestamp = None;
        self.frames_processed = 0;
    }

    /// Smoothing window size shared by all metrics
    pub fn smoothing_window(&self) -> usize {
        self.eyebrow.window_size()
    }

    /// Check settings carried by a deserialized session
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        for feature in FeatureName::ALL {
            let Some(window) = self.window(feature) else {
                continue;
            };
            if window.window_size() == 0 || window.len() > window.window_size() {
                return Err(AnalyzerError::Configuration(format!(
                    "{feature} window holds {} values with size {}",
                    window.len(),
                    window.window_size()
                )));
            }
            if window.window_size() != self.smoothing_window() {
                return Err(AnalyzerError::Configuration(format!(
                    "{feature} window size {} differs from {}",
                    window.window_size(),
                    self.smoothing_window()
                )));
            }
        }

        let threshold = self.blink.threshold();
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(AnalyzerError::Configuration(format!(
                "blink threshold must be positive, got {threshold}"
            )));
        }

        let window_seconds = self.blink.events().window_seconds();
        if !(window_seconds.is_finite() && window_seconds > 0.0) {
            return Err(AnalyzerError::Configuration(format!(
                "blink window must be positive, got {window_seconds}"
            )));
        }

        Ok(())
    }

    /// Load and validate a session from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalyzerError> {
        let session: Self = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    /// Serialize the session to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
