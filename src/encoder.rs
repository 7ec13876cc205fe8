//! Analysis record encoding
//!
//! Flattens a per-frame analysis into the record handed to logging
//! collaborators: the five features, the score and its classification, tagged
//! with the session identifier and computation time.

use crate::error::AnalyzerError;
use crate::types::{AnalysisRecord, FrameAnalysis};
use chrono::Utc;
use uuid::Uuid;

/// Encoder for producing analysis records for one session
pub struct RecordEncoder {
    session_id: String,
}

impl Default for RecordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordEncoder {
    /// Create a new encoder with a unique session ID
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific session ID
    pub fn with_session_id(session_id: String) -> Self {
        Self { session_id }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn encode(&self, analysis: &FrameAnalysis) -> AnalysisRecord {
        let features = &analysis.features;
        let stress = &analysis.stress;

        AnalysisRecord {
            session_id: self.session_id.clone(),
            frame_id: analysis.frame_id,
            timestamp: analysis.timestamp,
            eyebrow_raise: features.eyebrow_raise,
            lip_tension: features.lip_tension,
            head_nod_intensity: features.head_nod_intensity,
            symmetry_delta: features.symmetry_delta,
            blink_rate: features.blink_rate,
            stress_score: stress.score,
            stress_level: stress.level,
            label: stress.label().to_string(),
            icon: stress.icon().to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
        }
    }

    /// Encode to a single-line JSON string
    pub fn encode_to_json(&self, analysis: &FrameAnalysis) -> Result<String, AnalyzerError> {
        let record = self.encode(analysis);
        serde_json::to_string(&record).map_err(|e| AnalyzerError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureVector, StressLevel, StressScore};
    use chrono::DateTime;

    fn sample_analysis() -> FrameAnalysis {
        FrameAnalysis {
            frame_id: Some(42),
            timestamp: 3.5,
            features: FeatureVector {
                eyebrow_raise: 0.03,
                lip_tension: 0.2,
                head_nod_intensity: 0.1,
                symmetry_delta: 0.01,
                blink_rate: 14.0,
            },
            stress: StressScore {
                score: 0.4,
                level: StressLevel::Mild,
            },
        }
    }

    #[test]
    fn test_encode_flattens_analysis() {
        let encoder = RecordEncoder::with_session_id("session-1".to_string());
        let record = encoder.encode(&sample_analysis());

        assert_eq!(record.session_id, "session-1");
        assert_eq!(record.frame_id, Some(42));
        assert_eq!(record.timestamp, 3.5);
        assert_eq!(record.blink_rate, 14.0);
        assert_eq!(record.stress_score, 0.4);
        assert_eq!(record.stress_level, StressLevel::Mild);
        assert_eq!(record.label, "Slight Stress");
        assert_eq!(record.icon, "🟡");
        assert!(DateTime::parse_from_rfc3339(&record.computed_at_utc).is_ok());
    }

    #[test]
    fn test_encode_to_json_has_flat_fields() {
        let encoder = RecordEncoder::new();
        let json = encoder.encode_to_json(&sample_analysis()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        for field in [
            "timestamp",
            "eyebrow_raise",
            "lip_tension",
            "head_nod_intensity",
            "symmetry_delta",
            "blink_rate",
            "stress_score",
            "stress_level",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["stress_level"], "mild");
        assert!(Uuid::parse_str(value["session_id"].as_str().unwrap()).is_ok());
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_unique_session_ids() {
        assert_ne!(
            RecordEncoder::new().session_id(),
            RecordEncoder::new().session_id()
        );
    }
}
