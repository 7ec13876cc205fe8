//! Synthetic MediaPipe-shaped faces for unit tests

use crate::topology::{FaceTopology, MEDIAPIPE_LANDMARK_COUNT};
use crate::types::{LandmarkFrame, Point};

pub fn set_point(face: &mut [Point], index: usize, x: f64, y: f64) {
    face[index] = Point::new(x, y);
}

/// Relaxed, symmetric face with open eyes (EAR 0.3), brows 0.02 above the
/// eyes and a lip width/height ratio of 10.
pub fn neutral_face() -> Vec<Point> {
    let t = FaceTopology::mediapipe();
    let mut face = vec![Point::new(0.5, 0.5); MEDIAPIPE_LANDMARK_COUNT];

    set_point(&mut face, t.left_eye.upper_lid, 0.35, 0.395);
    set_point(&mut face, t.left_eye.lower_lid, 0.35, 0.425);
    set_point(&mut face, t.left_eye.corners.0, 0.30, 0.41);
    set_point(&mut face, t.left_eye.corners.1, 0.40, 0.41);

    set_point(&mut face, t.right_eye.upper_lid, 0.65, 0.395);
    set_point(&mut face, t.right_eye.lower_lid, 0.65, 0.425);
    set_point(&mut face, t.right_eye.corners.0, 0.60, 0.41);
    set_point(&mut face, t.right_eye.corners.1, 0.70, 0.41);

    for (&i, x) in t.left_eyebrow.iter().zip([0.32, 0.35, 0.38]) {
        set_point(&mut face, i, x, 0.375);
    }
    for (&i, x) in t.right_eyebrow.iter().zip([0.62, 0.65, 0.68]) {
        set_point(&mut face, i, x, 0.375);
    }

    set_point(&mut face, t.left_lip_corner, 0.40, 0.65);
    set_point(&mut face, t.right_lip_corner, 0.60, 0.65);
    set_point(&mut face, t.top_lip, 0.50, 0.64);
    set_point(&mut face, t.bottom_lip, 0.50, 0.66);

    set_point(&mut face, t.nose_tip, 0.50, 0.55);
    set_point(&mut face, t.chin, 0.50, 0.80);
    set_point(&mut face, t.left_cheek, 0.25, 0.55);
    set_point(&mut face, t.right_cheek, 0.75, 0.55);

    face
}

/// Every landmark at the same position
pub fn degenerate_face() -> Vec<Point> {
    vec![Point::new(0.5, 0.5); MEDIAPIPE_LANDMARK_COUNT]
}

/// Neutral face with both eyes set to the given aspect ratio
pub fn face_with_eye_ratio(ratio: f64) -> Vec<Point> {
    let t = FaceTopology::mediapipe();
    let mut face = neutral_face();
    // Eye width is 0.1, so the lid gap is ratio * 0.1
    set_point(&mut face, t.left_eye.lower_lid, 0.35, 0.395 + ratio * 0.1);
    set_point(&mut face, t.right_eye.lower_lid, 0.65, 0.395 + ratio * 0.1);
    face
}

/// Raised brows (0.145 above the eyes) and pressed lips (ratio 100)
pub fn stressed_face() -> Vec<Point> {
    let t = FaceTopology::mediapipe();
    let mut face = neutral_face();
    for &i in t.left_eyebrow.iter().chain(t.right_eyebrow.iter()) {
        let x = face[i].x;
        set_point(&mut face, i, x, 0.25);
    }
    set_point(&mut face, t.top_lip, 0.50, 0.649);
    set_point(&mut face, t.bottom_lip, 0.50, 0.651);
    face
}

/// Move the nose tip vertically, leaving the cheeks symmetric about it
pub fn with_nose_y(mut face: Vec<Point>, y: f64) -> Vec<Point> {
    let t = FaceTopology::mediapipe();
    set_point(&mut face, t.nose_tip, 0.50, y);
    face
}

pub fn frame(timestamp: f64, landmarks: Vec<Point>) -> LandmarkFrame {
    LandmarkFrame::new(timestamp, landmarks)
}
