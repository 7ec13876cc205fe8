//! Geometric facial metrics
//!
//! Pure formulas over a single landmark set. Each returns one raw scalar which
//! the feature extractor then smooths. Denominators are floored at [`EPSILON`]
//! so degenerate detections (coincident reference points) yield large-but-finite
//! or zero values rather than NaN/Inf.

use crate::topology::{EyeIndices, FaceTopology};
use crate::types::Point;
use serde::{Deserialize, Serialize};

/// Floor for every denominator
pub const EPSILON: f64 = 1e-5;

/// Width/height ratio mapped to zero lip tension (relaxed, open mouth)
pub const DEFAULT_LIP_RATIO_OFFSET: f64 = 5.0;

/// Ratio span between zero and full lip tension (ratio 60 = pressed lips)
pub const DEFAULT_LIP_RATIO_SPAN: f64 = 55.0;

/// Linear remap of the mouth width/height ratio into [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LipCalibration {
    pub offset: f64,
    pub span: f64,
}

impl Default for LipCalibration {
    fn default() -> Self {
        Self {
            offset: DEFAULT_LIP_RATIO_OFFSET,
            span: DEFAULT_LIP_RATIO_SPAN,
        }
    }
}

impl LipCalibration {
    pub fn apply(&self, raw_ratio: f64) -> f64 {
        ((raw_ratio - self.offset) / self.span).clamp(0.0, 1.0)
    }
}

/// Mean of the given landmarks
pub fn average_points(landmarks: &[Point], indices: &[usize]) -> Point {
    if indices.is_empty() {
        return Point::default();
    }
    let n = indices.len() as f64;
    let (x, y, z) = indices.iter().fold((0.0, 0.0, 0.0), |(x, y, z), &i| {
        let p = landmarks[i];
        (x + p.x, y + p.y, z + p.z)
    });
    Point::new_3d(x / n, y / n, z / n)
}

/// Vertical eyelid gap over horizontal eye width
pub fn eye_aspect_ratio(landmarks: &[Point], eye: &EyeIndices) -> f64 {
    let vertical = landmarks[eye.upper_lid].distance(&landmarks[eye.lower_lid]);
    let horizontal = landmarks[eye.corners.0].distance(&landmarks[eye.corners.1]);
    vertical / horizontal.max(EPSILON)
}

/// Mean of the left and right eye aspect ratios
pub fn mean_eye_aspect_ratio(landmarks: &[Point], topology: &FaceTopology) -> f64 {
    let left = eye_aspect_ratio(landmarks, &topology.left_eye);
    let right = eye_aspect_ratio(landmarks, &topology.right_eye);
    (left + right) * 0.5
}

/// Vertical distance of each brow centroid from the mid-eye anchor, averaged
/// over both sides.
///
/// The anchor is the midpoint of the two upper eyelids and is shared by both
/// brows.
pub fn eyebrow_raise(landmarks: &[Point], topology: &FaceTopology) -> f64 {
    let left_brow = average_points(landmarks, &topology.left_eyebrow);
    let right_brow = average_points(landmarks, &topology.right_eyebrow);
    let anchor = landmarks[topology.left_eye.upper_lid]
        .midpoint(&landmarks[topology.right_eye.upper_lid]);

    let left_raise = (left_brow.y - anchor.y).abs();
    let right_raise = (right_brow.y - anchor.y).abs();
    (left_raise + right_raise) * 0.5
}

/// Mouth width over mouth height
pub fn lip_ratio(landmarks: &[Point], topology: &FaceTopology) -> f64 {
    let width = landmarks[topology.left_lip_corner].distance(&landmarks[topology.right_lip_corner]);
    let height = landmarks[topology.top_lip].distance(&landmarks[topology.bottom_lip]);
    width / height.max(EPSILON)
}

/// Lip tension in [0, 1]
pub fn lip_tension(
    landmarks: &[Point],
    topology: &FaceTopology,
    calibration: &LipCalibration,
) -> f64 {
    calibration.apply(lip_ratio(landmarks, topology))
}

/// Vertical nose-to-chin distance, used to normalize nods by head size
pub fn head_length(landmarks: &[Point], topology: &FaceTopology) -> f64 {
    (landmarks[topology.chin].y - landmarks[topology.nose_tip].y).abs()
}

/// Nose displacement between frames, normalized by head length
pub fn head_nod_delta(nose_y: f64, previous_nose_y: f64, head_length: f64) -> f64 {
    (nose_y - previous_nose_y).abs() / head_length.max(EPSILON)
}

/// Relative difference between the cheek-to-nose distances; 0 when symmetric
pub fn symmetry_delta(landmarks: &[Point], topology: &FaceTopology) -> f64 {
    let nose = &landmarks[topology.nose_tip];
    let left = landmarks[topology.left_cheek].distance(nose);
    let right = landmarks[topology.right_cheek].distance(nose);
    (left - right).abs() / ((left + right) * 0.5).max(EPSILON)
}
