//! Adapter for reading face.landmark_frame.v1 documents
//!
//! Parses NDJSON streams or JSON arrays of frame records and validates them
//! against a face topology before they reach the extractor.

use crate::error::AnalyzerError;
use crate::schema::frame_record::{FrameRecord, FrameValidationError};
use crate::topology::FaceTopology;

/// Adapter for converting frame records to landmark frames
pub struct FrameAdapter;

impl FrameAdapter {
    /// Parse a JSON string containing an array of frame records
    pub fn parse_array(json: &str) -> Result<Vec<FrameRecord>, AnalyzerError> {
        let records: Vec<FrameRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (one frame record per line); blank lines are skipped
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<FrameRecord>, AnalyzerError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<FrameRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(AnalyzerError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate a sequence of records, including timestamp ordering.
    ///
    /// Only failing records are reported.
    pub fn validate_frames(
        records: &[FrameRecord],
        topology: &FaceTopology,
    ) -> Vec<FrameValidationResult> {
        let mut previous: Option<f64> = None;
        let mut results = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let mut error = record.validate(topology).err();

            if error.is_none() {
                if let Some(prev) = previous {
                    if record.timestamp < prev {
                        error = Some(FrameValidationError::TimestampRegression {
                            previous: prev,
                            current: record.timestamp,
                        });
                    }
                }
            }

            if record.timestamp.is_finite() {
                previous = Some(previous.map_or(record.timestamp, |p| p.max(record.timestamp)));
            }

            if let Some(error) = error {
                results.push(FrameValidationResult {
                    index,
                    frame_id: record.frame_id,
                    error,
                });
            }
        }

        results
    }
}

/// A record that failed validation
#[derive(Debug)]
pub struct FrameValidationResult {
    pub index: usize,
    pub frame_id: Option<u64>,
    pub error: FrameValidationError,
}
