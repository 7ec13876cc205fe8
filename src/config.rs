//! Analyzer configuration
//!
//! One JSON document configures both stages. Every field is optional and
//! falls back to the calibrated default.
//!
//! ```json
//! {
//!   "extractor": { "smoothing_window": 5, "blink_threshold": 0.23 },
//!   "estimator": { "thresholds": { "calm": 0.35, "mild": 0.65 } }
//! }
//! ```

use crate::error::AnalyzerError;
use crate::estimator::{StressConfig, StressEstimator};
use crate::features::{ExtractorConfig, FeatureExtractor};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Combined extractor and estimator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub extractor: ExtractorConfig,
    pub estimator: StressConfig,
}

impl AnalyzerConfig {
    /// Check both stages; nothing is applied if either is invalid
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        self.extractor.validate()?;
        self.estimator.validate()
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, AnalyzerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        info!("loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, AnalyzerError> {
        serde_json::to_string_pretty(self).map_err(|e| AnalyzerError::EncodingError(e.to_string()))
    }

    /// Build both pipeline stages from this configuration
    pub fn build(&self) -> Result<(FeatureExtractor, StressEstimator), AnalyzerError> {
        let extractor = FeatureExtractor::with_config(self.extractor.clone())?;
        let estimator = StressEstimator::with_config(self.estimator.clone())?;
        Ok((extractor, estimator))
    }
}
