//! Error types for microexpr

use crate::schema::FrameValidationError;
use thiserror::Error;

/// Errors that can occur during feature extraction and scoring
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Frame has {actual} landmarks but the topology requires at least {required}")]
    MissingLandmarks { required: usize, actual: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    InvalidLandmark { index: usize },

    #[error("Invalid frame timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing expected feature: {0}")]
    MissingFeature(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FrameValidationError> for AnalyzerError {
    fn from(e: FrameValidationError) -> Self {
        match e {
            FrameValidationError::InvalidTimestamp(timestamp) => {
                AnalyzerError::InvalidTimestamp(timestamp)
            }
            FrameValidationError::TooFewLandmarks { required, actual } => {
                AnalyzerError::MissingLandmarks { required, actual }
            }
            FrameValidationError::NonFiniteLandmark { index } => {
                AnalyzerError::InvalidLandmark { index }
            }
            other @ (FrameValidationError::InvalidSchemaVersion { .. }
            | FrameValidationError::TimestampRegression { .. }) => {
                AnalyzerError::ParseError(format!("Invalid frame: {}", other))
            }
        }
    }
}

impl AnalyzerError {
    /// True for errors caused by a broken upstream landmark contract
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            AnalyzerError::MissingLandmarks { .. }
                | AnalyzerError::InvalidLandmark { .. }
                | AnalyzerError::InvalidTimestamp(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_validation_errors_keep_landmark_category() {
        let short: AnalyzerError = FrameValidationError::TooFewLandmarks {
            required: 455,
            actual: 10,
        }
        .into();
        assert!(matches!(
            short,
            AnalyzerError::MissingLandmarks {
                required: 455,
                actual: 10
            }
        ));
        assert!(short.is_precondition_violation());

        let nan: AnalyzerError = FrameValidationError::NonFiniteLandmark { index: 13 }.into();
        assert!(matches!(nan, AnalyzerError::InvalidLandmark { index: 13 }));

        let ts: AnalyzerError = FrameValidationError::InvalidTimestamp(f64::NAN).into();
        assert!(ts.is_precondition_violation());
    }

    #[test]
    fn test_schema_version_is_a_parse_error() {
        let err: AnalyzerError = FrameValidationError::InvalidSchemaVersion {
            expected: "face.landmark_frame.v1".to_string(),
            actual: "v0".to_string(),
        }
        .into();
        assert!(matches!(err, AnalyzerError::ParseError(_)));
        assert!(!err.is_precondition_violation());
    }
}
