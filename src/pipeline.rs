//! Pipeline orchestration
//!
//! This module provides the public API for microexpr.
//! It orchestrates the full pipeline from landmark frames to analysis records.

use crate::config::AnalyzerConfig;
use crate::encoder::RecordEncoder;
use crate::error::AnalyzerError;
use crate::estimator::StressEstimator;
use crate::features::FeatureExtractor;
use crate::schema::{FrameAdapter, FrameRecord};
use crate::session::SessionContext;
use crate::types::{AnalysisRecord, FrameAnalysis, LandmarkFrame};
use log::debug;

/// Convert a face.landmark_frame.v1 NDJSON document into analysis records.
///
/// All frames are treated as one session with default configuration.
///
/// # Returns
/// One JSON record per input frame
///
/// # Example
/// ```ignore
/// let records = analyze_ndjson(&frames_ndjson)?;
/// ```
pub fn analyze_ndjson(ndjson: &str) -> Result<Vec<String>, AnalyzerError> {
    let records = FrameAdapter::parse_ndjson(ndjson)?;
    let mut processor = StressProcessor::new();

    let mut output = Vec::with_capacity(records.len());
    for frame_record in records {
        let record = processor.process_record(frame_record)?;
        let json = serde_json::to_string(&record)
            .map_err(|e| AnalyzerError::EncodingError(e.to_string()))?;
        output.push(json);
    }
    Ok(output)
}

/// Stateful processor for one subject.
///
/// Pipeline stages per frame:
/// 1. FeatureExtractor - Geometric metrics and blink rate, smoothed over the session
/// 2. StressEstimator - Weighted score and level
/// 3. RecordEncoder - Flat analysis record
pub struct StressProcessor {
    extractor: FeatureExtractor,
    estimator: StressEstimator,
    session: SessionContext,
    encoder: RecordEncoder,
}

impl Default for StressProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StressProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        let extractor = FeatureExtractor::new();
        let session = extractor.new_session();
        Self {
            extractor,
            estimator: StressEstimator::new(),
            session,
            encoder: RecordEncoder::new(),
        }
    }

    /// Create a processor from a configuration; rejects invalid settings
    pub fn with_config(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let (extractor, estimator) = config.build()?;
        let session = extractor.new_session();
        Ok(Self {
            extractor,
            estimator,
            session,
            encoder: RecordEncoder::new(),
        })
    }

    /// Features and score for one frame
    pub fn analyze(&mut self, frame: &LandmarkFrame) -> Result<FrameAnalysis, AnalyzerError> {
        let features = self.extractor.extract(&mut self.session, frame)?;
        let stress = self.estimator.predict(&features);
        Ok(FrameAnalysis {
            frame_id: frame.frame_id,
            timestamp: frame.timestamp,
            features,
            stress,
        })
    }

    /// Analyze one frame and encode the flat record
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Result<AnalysisRecord, AnalyzerError> {
        let analysis = self.analyze(frame)?;
        Ok(self.encoder.encode(&analysis))
    }

    /// Validate a wire record and process it.
    ///
    /// Landmark contract violations surface as the same errors
    /// [`FeatureExtractor::extract`] returns; a wrong schema version is a
    /// parse error.
    pub fn process_record(&mut self, record: FrameRecord) -> Result<AnalysisRecord, AnalyzerError> {
        record.validate(&self.extractor.config().topology)?;
        self.process_frame(&record.into_frame())
    }

    /// Process every frame of an NDJSON document in order
    pub fn process_ndjson(&mut self, ndjson: &str) -> Result<Vec<AnalysisRecord>, AnalyzerError> {
        FrameAdapter::parse_ndjson(ndjson)?
            .into_iter()
            .map(|record| self.process_record(record))
            .collect()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_id(&self) -> &str {
        self.encoder.session_id()
    }

    pub fn estimator(&self) -> &StressEstimator {
        &self.estimator
    }

    /// Load session state from JSON.
    ///
    /// The session must carry valid settings matching this processor's
    /// extractor configuration; on error the current session is kept.
    pub fn load_session(&mut self, json: &str) -> Result<(), AnalyzerError> {
        let session = SessionContext::from_json(json)?;
        self.extractor.check_session(&session)?;
        self.session = session;
        Ok(())
    }

    /// Save session state to JSON
    pub fn save_session(&self) -> Result<String, AnalyzerError> {
        self.session
            .to_json()
            .map_err(|e| AnalyzerError::EncodingError(e.to_string()))
    }

    /// Clear all smoothing and blink history
    pub fn reset_session(&mut self) {
        debug!(
            "resetting session {} after {} frames",
            self.session_id(),
            self.session.frames_processed()
        );
        self.session.reset();
    }
}
