//! face.landmark_frame.v1 schema definition
//!
//! One record per captured frame, as produced by the mesh-detection side:
//!
//! ```json
//! {"schema_version": "face.landmark_frame.v1", "frame_id": 7,
//!  "timestamp": 12.48, "landmarks": [[0.51, 0.42, -0.03], ...]}
//! ```

use crate::topology::FaceTopology;
use crate::types::{LandmarkFrame, Point};
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "face.landmark_frame.v1";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Wire form of a landmark frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Schema identifier; assumed current when omitted
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<u64>,
    /// Capture time in seconds
    pub timestamp: f64,
    /// Landmarks as `[x, y]`, `[x, y, z]` or `{x, y, z}`
    pub landmarks: Vec<Point>,
}

impl FrameRecord {
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            frame_id: frame.frame_id,
            timestamp: frame.timestamp,
            landmarks: frame.landmarks.clone(),
        }
    }

    pub fn into_frame(self) -> LandmarkFrame {
        LandmarkFrame {
            frame_id: self.frame_id,
            timestamp: self.timestamp,
            landmarks: self.landmarks,
        }
    }

    /// Validate the record on its own against a topology.
    ///
    /// Apart from the schema version this is the same landmark contract
    /// [`FaceTopology::check_frame`] enforces: a finite timestamp, enough
    /// landmarks, and finite coordinates at every index the topology reads.
    pub fn validate(&self, topology: &FaceTopology) -> Result<(), FrameValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(FrameValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if !self.timestamp.is_finite() {
            return Err(FrameValidationError::InvalidTimestamp(self.timestamp));
        }

        let required = topology.required_landmarks();
        if self.landmarks.len() < required {
            return Err(FrameValidationError::TooFewLandmarks {
                required,
                actual: self.landmarks.len(),
            });
        }

        if let Some(index) = topology
            .indices()
            .into_iter()
            .find(|&i| !self.landmarks[i].is_finite())
        {
            return Err(FrameValidationError::NonFiniteLandmark { index });
        }

        Ok(())
    }
}

/// Validation errors for frame records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("Too few landmarks: topology requires {required}, got {actual}")]
    TooFewLandmarks { required: usize, actual: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("Timestamp went backwards: {current} after {previous}")]
    TimestampRegression { previous: f64, current: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::neutral_face;

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"timestamp": 1.5, "landmarks": [[0.1, 0.2], [0.3, 0.4, 0.05]]}"#;
        let record: FrameRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.schema_version, SCHEMA_VERSION);
        assert_eq!(record.frame_id, None);
        assert_eq!(record.timestamp, 1.5);
        assert_eq!(record.landmarks[1], Point::new_3d(0.3, 0.4, 0.05));
    }

    #[test]
    fn test_frame_conversion() {
        let mut frame = LandmarkFrame::new(2.0, neutral_face());
        frame.frame_id = Some(3);
        let record = FrameRecord::from_frame(&frame);
        assert_eq!(record.clone().into_frame(), frame);

        let json = serde_json::to_string(&record).unwrap();
        let parsed: FrameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_validate() {
        let topology = FaceTopology::mediapipe();
        let mut record = FrameRecord::from_frame(&LandmarkFrame::new(0.0, neutral_face()));
        assert!(record.validate(&topology).is_ok());

        record.schema_version = "face.landmark_frame.v0".to_string();
        assert!(matches!(
            record.validate(&topology),
            Err(FrameValidationError::InvalidSchemaVersion { .. })
        ));
        record.schema_version = SCHEMA_VERSION.to_string();

        record.timestamp = f64::NAN;
        assert!(matches!(
            record.validate(&topology),
            Err(FrameValidationError::InvalidTimestamp(_))
        ));
        // Negative capture times are accepted, as by the extractor
        record.timestamp = -1.0;
        assert!(record.validate(&topology).is_ok());
        record.timestamp = 0.0;

        // Index 10 is never read by the topology
        record.landmarks[10] = Point::new(f64::NAN, 0.0);
        assert!(record.validate(&topology).is_ok());

        record.landmarks[topology.top_lip] = Point::new(0.5, f64::INFINITY);
        assert_eq!(
            record.validate(&topology),
            Err(FrameValidationError::NonFiniteLandmark {
                index: topology.top_lip
            })
        );

        record.landmarks.truncate(10);
        assert_eq!(
            record.validate(&topology),
            Err(FrameValidationError::TooFewLandmarks {
                required: 455,
                actual: 10
            })
        );
    }

    #[test]
    fn test_validate_agrees_with_extractor_contract() {
        let topology = FaceTopology::mediapipe();
        let mut frames = vec![LandmarkFrame::new(-2.0, neutral_face())];

        let mut unread_nan = LandmarkFrame::new(0.5, neutral_face());
        unread_nan.landmarks[0] = Point::new(f64::NAN, f64::NAN);
        frames.push(unread_nan);

        let mut read_nan = LandmarkFrame::new(0.5, neutral_face());
        read_nan.landmarks[topology.chin] = Point::new(f64::NAN, 0.8);
        frames.push(read_nan);

        let mut short = LandmarkFrame::new(0.5, neutral_face());
        short.landmarks.truncate(300);
        frames.push(short);

        for frame in &frames {
            let record = FrameRecord::from_frame(frame);
            assert_eq!(
                record.validate(&topology).is_ok(),
                topology.check_frame(frame).is_ok(),
                "disagreement at timestamp {} with {} landmarks",
                frame.timestamp,
                frame.landmarks.len()
            );
        }
    }
}
