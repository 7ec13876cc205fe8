//! Analyze a synthetic landmark stream and print dashboard lines

use microexpr::topology::{FaceTopology, MEDIAPIPE_LANDMARK_COUNT};
use microexpr::{LandmarkFrame, Point, StressProcessor};

fn synthetic_face(t: f64, topology: &FaceTopology) -> Vec<Point> {
    let mut points = vec![Point::new(0.5, 0.5); MEDIAPIPE_LANDMARK_COUNT];

    // Blink every two seconds, tense up after the third second
    let blinking = (t % 2.0) < 0.1;
    let tense = t > 3.0;
    let lid_gap = if blinking { 0.005 } else { 0.03 };
    let lip_gap = if tense { 0.001 } else { 0.02 };
    let nose_y = 0.55 + if tense { 0.02 * (t * 6.0).sin() } else { 0.0 };

    for (eye, cx) in [(&topology.left_eye, 0.35), (&topology.right_eye, 0.65)] {
        points[eye.corners.0] = Point::new(cx - 0.05, 0.41);
        points[eye.corners.1] = Point::new(cx + 0.05, 0.41);
        points[eye.upper_lid] = Point::new(cx, 0.41 - lid_gap / 2.0);
        points[eye.lower_lid] = Point::new(cx, 0.41 + lid_gap / 2.0);
    }
    let brow_y = if tense { 0.33 } else { 0.375 };
    for &i in topology.left_eyebrow.iter().chain(topology.right_eyebrow.iter()) {
        points[i] = Point::new(0.5, brow_y);
    }

    points[topology.left_lip_corner] = Point::new(0.4, 0.65);
    points[topology.right_lip_corner] = Point::new(0.6, 0.65);
    points[topology.top_lip] = Point::new(0.5, 0.65 - lip_gap / 2.0);
    points[topology.bottom_lip] = Point::new(0.5, 0.65 + lip_gap / 2.0);
    points[topology.nose_tip] = Point::new(0.5, nose_y);
    points[topology.chin] = Point::new(0.5, 0.8);
    points[topology.left_cheek] = Point::new(0.25, 0.55);
    points[topology.right_cheek] = Point::new(0.75, 0.55);
    points
}

fn main() {
    let topology = FaceTopology::default();
    let mut processor = StressProcessor::new();

    for i in 0..180u64 {
        let t = i as f64 / 30.0;
        let mut frame = LandmarkFrame::new(t, synthetic_face(t, &topology));
        frame.frame_id = Some(i);

        match processor.analyze(&frame) {
            Ok(analysis) if i % 15 == 0 => {
                println!("[{:>6.2}s] {}", t, analysis.stress.formatted());
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {e:?}");
                return;
            }
        }
    }
}
