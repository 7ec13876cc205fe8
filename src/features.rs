//! Feature extraction
//!
//! Turns one landmark frame into the five smoothed metrics, reading and
//! updating the caller's [`SessionContext`]:
//! - Eyebrow raise, lip tension, head nod and symmetry (rolling mean of the
//!   raw geometric value)
//! - Blink rate (edge-detected blinks per minute)

use crate::blink::DEFAULT_BLINK_THRESHOLD;
use crate::error::AnalyzerError;
use crate::events::DEFAULT_EVENT_WINDOW_SECONDS;
use crate::geometry::{self, LipCalibration};
use crate::session::SessionContext;
use crate::smoothing::DEFAULT_SMOOTHING_WINDOW;
use crate::topology::FaceTopology;
use crate::types::{FeatureVector, LandmarkFrame, Point};
use log::warn;
use serde::{Deserialize, Serialize};

/// Extractor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Landmark index scheme of incoming frames
    pub topology: FaceTopology,
    /// Frames averaged per smoothed metric
    pub smoothing_window: usize,
    /// Eye aspect ratio below which the eyes count as closed
    pub blink_threshold: f64,
    /// Trailing window for blink counting (seconds)
    pub blink_window_seconds: f64,
    /// Lip ratio to tension remap
    pub lip_calibration: LipCalibration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            topology: FaceTopology::mediapipe(),
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            blink_threshold: DEFAULT_BLINK_THRESHOLD,
            blink_window_seconds: DEFAULT_EVENT_WINDOW_SECONDS,
            lip_calibration: LipCalibration::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.smoothing_window == 0 {
            return Err(AnalyzerError::Configuration(
                "smoothing_window must be at least 1".to_string(),
            ));
        }
        if !(self.blink_threshold.is_finite() && self.blink_threshold > 0.0) {
            return Err(AnalyzerError::Configuration(format!(
                "blink_threshold must be positive, got {}",
                self.blink_threshold
            )));
        }
        if !(self.blink_window_seconds.is_finite() && self.blink_window_seconds > 0.0) {
            return Err(AnalyzerError::Configuration(format!(
                "blink_window_seconds must be positive, got {}",
                self.blink_window_seconds
            )));
        }
        let lip = &self.lip_calibration;
        if !(lip.offset.is_finite() && lip.span.is_finite() && lip.span > 0.0) {
            return Err(AnalyzerError::Configuration(format!(
                "lip calibration needs a finite offset and positive span, got {}/{}",
                lip.offset, lip.span
            )));
        }
        Ok(())
    }
}

/// Stateless per-frame feature extractor
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Extractor with default MediaPipe topology and calibration
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor with custom settings; rejects invalid configuration
    pub fn with_config(config: ExtractorConfig) -> Result<Self, AnalyzerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Fresh session sized by this extractor's settings
    pub fn new_session(&self) -> SessionContext {
        SessionContext::new(
            self.config.smoothing_window,
            self.config.blink_threshold,
            self.config.blink_window_seconds,
        )
    }

    /// Check that a session (typically a restored one) was built with this
    /// extractor's smoothing and blink settings
    pub fn check_session(&self, session: &SessionContext) -> Result<(), AnalyzerError> {
        session.validate()?;

        let config = &self.config;
        let blink = session.blink_tracker();
        if session.smoothing_window() != config.smoothing_window {
            return Err(AnalyzerError::Configuration(format!(
                "session smoothing window {} does not match configured {}",
                session.smoothing_window(),
                config.smoothing_window
            )));
        }
        if blink.threshold() != config.blink_threshold {
            return Err(AnalyzerError::Configuration(format!(
                "session blink threshold {} does not match configured {}",
                blink.threshold(),
                config.blink_threshold
            )));
        }
        if blink.events().window_seconds() != config.blink_window_seconds {
            return Err(AnalyzerError::Configuration(format!(
                "session blink window {}s does not match configured {}s",
                blink.events().window_seconds(),
                config.blink_window_seconds
            )));
        }
        Ok(())
    }

    /// Extract the feature vector for one frame.
    ///
    /// A frame that violates the landmark contract is rejected before any
    /// session state is touched.
    pub fn extract(
        &self,
        session: &mut SessionContext,
        frame: &LandmarkFrame,
    ) -> Result<FeatureVector, AnalyzerError> {
        let topology = &self.config.topology;
        topology.check_frame(frame)?;

        if let Some(previous) = session.last_timestamp {
            if frame.timestamp < previous {
                warn!(
                    "frame timestamp went backwards ({:.3}s -> {:.3}s); blink window may be inaccurate",
                    previous, frame.timestamp
                );
            }
        }

        let landmarks = frame.landmarks.as_slice();
        let eyebrow_raise = self.compute_eyebrow_raise(session, landmarks);
        let lip_tension = self.compute_lip_tension(session, landmarks);
        let head_nod_intensity = self.compute_head_nod(session, landmarks);
        let symmetry_delta = self.compute_symmetry(session, landmarks);
        let blink_rate = self.compute_blink_rate(session, landmarks, frame.timestamp);

        session.last_timestamp = Some(frame.timestamp);
        session.frames_processed += 1;

        Ok(FeatureVector {
            eyebrow_raise,
            lip_tension,
            head_nod_intensity,
            symmetry_delta,
            blink_rate,
        })
    }

    fn compute_eyebrow_raise(&self, session: &mut SessionContext, landmarks: &[Point]) -> f64 {
        let raw = geometry::eyebrow_raise(landmarks, &self.config.topology);
        session.eyebrow.push(raw)
    }

    fn compute_lip_tension(&self, session: &mut SessionContext, landmarks: &[Point]) -> f64 {
        let raw = geometry::lip_tension(
            landmarks,
            &self.config.topology,
            &self.config.lip_calibration,
        );
        session.lip_tension.push(raw)
    }

    /// First frame of a session only records the nose height and reports 0.0
    fn compute_head_nod(&self, session: &mut SessionContext, landmarks: &[Point]) -> f64 {
        let topology = &self.config.topology;
        let nose_y = landmarks[topology.nose_tip].y;

        let Some(previous_nose_y) = session.previous_nose_y.replace(nose_y) else {
            return 0.0;
        };

        let head_length = geometry::head_length(landmarks, topology);
        let delta = geometry::head_nod_delta(nose_y, previous_nose_y, head_length);
        session.head_nod.push(delta)
    }

    fn compute_symmetry(&self, session: &mut SessionContext, landmarks: &[Point]) -> f64 {
        let raw = geometry::symmetry_delta(landmarks, &self.config.topology);
        session.symmetry.push(raw)
    }

    fn compute_blink_rate(
        &self,
        session: &mut SessionContext,
        landmarks: &[Point],
        timestamp: f64,
    ) -> f64 {
        let eye_ratio = geometry::mean_eye_aspect_ratio(landmarks, &self.config.topology);
        session.blink.update(eye_ratio, timestamp)
    }
}
