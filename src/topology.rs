//! Face mesh topology
//!
//! Maps the semantic positions the feature extractor reads (eyelids, eye
//! corners, brows, lips, nose, chin, cheeks) to landmark indices. The default
//! follows the MediaPipe Face Mesh numbering.

use crate::error::AnalyzerError;
use crate::types::LandmarkFrame;
use serde::{Deserialize, Serialize};

/// Number of landmarks emitted by MediaPipe Face Mesh (without iris refinement)
pub const MEDIAPIPE_LANDMARK_COUNT: usize = 468;

/// Landmark indices for one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeIndices {
    /// Upper eyelid
    pub upper_lid: usize,
    /// Lower eyelid
    pub lower_lid: usize,
    /// Horizontal corners (outer, inner)
    pub corners: (usize, usize),
}

/// Named landmark indices used by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceTopology {
    pub name: String,
    pub left_eye: EyeIndices,
    pub right_eye: EyeIndices,
    pub left_eyebrow: [usize; 3],
    pub right_eyebrow: [usize; 3],
    pub left_lip_corner: usize,
    pub right_lip_corner: usize,
    pub top_lip: usize,
    pub bottom_lip: usize,
    pub nose_tip: usize,
    pub chin: usize,
    pub left_cheek: usize,
    pub right_cheek: usize,
}

impl Default for FaceTopology {
    fn default() -> Self {
        Self::mediapipe()
    }
}

impl FaceTopology {
    /// MediaPipe Face Mesh indices
    pub fn mediapipe() -> Self {
        Self {
            name: "mediapipe_face_mesh".to_string(),
            left_eye: EyeIndices {
                upper_lid: 159,
                lower_lid: 145,
                corners: (33, 133),
            },
            right_eye: EyeIndices {
                upper_lid: 386,
                lower_lid: 374,
                corners: (362, 263),
            },
            left_eyebrow: [55, 107, 46],
            right_eyebrow: [285, 336, 276],
            left_lip_corner: 61,
            right_lip_corner: 291,
            top_lip: 13,
            bottom_lip: 14,
            nose_tip: 1,
            chin: 152,
            left_cheek: 234,
            right_cheek: 454,
        }
    }

    /// Every index the extractor reads
    pub fn indices(&self) -> Vec<usize> {
        let mut indices = vec![
            self.left_eye.upper_lid,
            self.left_eye.lower_lid,
            self.left_eye.corners.0,
            self.left_eye.corners.1,
            self.right_eye.upper_lid,
            self.right_eye.lower_lid,
            self.right_eye.corners.0,
            self.right_eye.corners.1,
        ];
        indices.extend_from_slice(&self.left_eyebrow);
        indices.extend_from_slice(&self.right_eyebrow);
        indices.extend_from_slice(&[
            self.left_lip_corner,
            self.right_lip_corner,
            self.top_lip,
            self.bottom_lip,
            self.nose_tip,
            self.chin,
            self.left_cheek,
            self.right_cheek,
        ]);
        indices
    }

    /// Minimum landmark count a frame must carry for this topology
    pub fn required_landmarks(&self) -> usize {
        self.indices().into_iter().max().map_or(0, |max| max + 1)
    }

    /// Check a frame against the landmark contract.
    ///
    /// Only the indices this topology reads are checked for finiteness.
    pub fn check_frame(&self, frame: &LandmarkFrame) -> Result<(), AnalyzerError> {
        if !frame.timestamp.is_finite() {
            return Err(AnalyzerError::InvalidTimestamp(frame.timestamp));
        }

        let required = self.required_landmarks();
        if frame.landmarks.len() < required {
            return Err(AnalyzerError::MissingLandmarks {
                required,
                actual: frame.landmarks.len(),
            });
        }

        for index in self.indices() {
            if !frame.landmarks[index].is_finite() {
                return Err(AnalyzerError::InvalidLandmark { index });
            }
        }

        Ok(())
    }
}
