//! Core types for the microexpr pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: landmark frames, feature vectors, stress scores and the flat
//! analysis record handed to logging collaborators.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A normalized face landmark. `z` is 0.0 for 2D meshes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PointRepr", into = "[f64; 3]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance over all three axes
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new_3d(
            (self.x + other.x) * 0.5,
            (self.y + other.y) * 0.5,
            (self.z + other.z) * 0.5,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Point> for [f64; 3] {
    fn from(p: Point) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Accepted wire shapes for a landmark: `[x, y]`, `[x, y, z]` or `{x, y, z?}`
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Xyz([f64; 3]),
    Xy([f64; 2]),
    Named {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Xyz([x, y, z]) => Point::new_3d(x, y, z),
            PointRepr::Xy([x, y]) => Point::new(x, y),
            PointRepr::Named { x, y, z } => Point::new_3d(x, y, z),
        }
    }
}

/// One observation of a face mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Optional sequence number assigned by the acquisition side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<u64>,
    /// Capture time in seconds, non-decreasing within a session
    pub timestamp: f64,
    /// Landmarks indexed by the session's face topology
    pub landmarks: Vec<Point>,
}

impl LandmarkFrame {
    pub fn new(timestamp: f64, landmarks: Vec<Point>) -> Self {
        Self {
            frame_id: None,
            timestamp,
            landmarks,
        }
    }
}

/// Names of the five extracted metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    EyebrowRaise,
    LipTension,
    HeadNodIntensity,
    SymmetryDelta,
    BlinkRate,
}

impl FeatureName {
    pub const ALL: [FeatureName; 5] = [
        FeatureName::EyebrowRaise,
        FeatureName::LipTension,
        FeatureName::HeadNodIntensity,
        FeatureName::SymmetryDelta,
        FeatureName::BlinkRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::EyebrowRaise => "eyebrow_raise",
            FeatureName::LipTension => "lip_tension",
            FeatureName::HeadNodIntensity => "head_nod_intensity",
            FeatureName::SymmetryDelta => "symmetry_delta",
            FeatureName::BlinkRate => "blink_rate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smoothed per-frame metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Brow-to-eye vertical distance (normalized image units)
    pub eyebrow_raise: f64,
    /// Mouth width/height ratio remapped to 0-1
    pub lip_tension: f64,
    /// Head-length normalized nose displacement between frames
    pub head_nod_intensity: f64,
    /// Relative cheek-to-nose distance difference
    pub symmetry_delta: f64,
    /// Blinks per minute over the trailing event window
    pub blink_rate: f64,
}

impl FeatureVector {
    pub fn get(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::EyebrowRaise => self.eyebrow_raise,
            FeatureName::LipTension => self.lip_tension,
            FeatureName::HeadNodIntensity => self.head_nod_intensity,
            FeatureName::SymmetryDelta => self.symmetry_delta,
            FeatureName::BlinkRate => self.blink_rate,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        FeatureName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    /// Name-keyed view, as consumed by `StressEstimator::predict_map`
    pub fn to_map(&self) -> HashMap<String, f64> {
        self.iter()
            .map(|(name, value)| (name.as_str().to_string(), value))
            .collect()
    }
}

/// Discrete stress severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Calm,
    Mild,
    High,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Calm => "calm",
            StressLevel::Mild => "mild",
            StressLevel::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StressLevel::Calm => "Calm",
            StressLevel::Mild => "Slight Stress",
            StressLevel::High => "High Stress / Possible Deception Indicators",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StressLevel::Calm => "🟢",
            StressLevel::Mild => "🟡",
            StressLevel::High => "🔴",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded stress score and its classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressScore {
    /// Weighted score in [0, 1.5]
    pub score: f64,
    pub level: StressLevel,
}

impl StressScore {
    pub fn label(&self) -> &'static str {
        self.level.label()
    }

    pub fn icon(&self) -> &'static str {
        self.level.icon()
    }

    /// Dashboard line, e.g. `🟢 Calm (0.12)`
    pub fn formatted(&self) -> String {
        format!("{} {} ({:.2})", self.icon(), self.label(), self.score)
    }
}

/// Features and score for a single frame, as handed to display collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<u64>,
    pub timestamp: f64,
    pub features: FeatureVector,
    pub stress: StressScore,
}

/// Flat per-frame record for logging collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<u64>,
    pub timestamp: f64,
    pub eyebrow_raise: f64,
    pub lip_tension: f64,
    pub head_nod_intensity: f64,
    pub symmetry_delta: f64,
    pub blink_rate: f64,
    pub stress_score: f64,
    pub stress_level: StressLevel,
    pub label: String,
    pub icon: String,
    pub computed_at_utc: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_point_wire_shapes() {
        let points: Vec<Point> =
            serde_json::from_str(r#"[[0.1, 0.2], [0.3, 0.4, 0.5], {"x": 0.6, "y": 0.7}]"#)
                .unwrap();

        assert_eq!(
            points,
            vec![
                Point::new(0.1, 0.2),
                Point::new_3d(0.3, 0.4, 0.5),
                Point::new(0.6, 0.7),
            ]
        );
    }

    #[test]
    fn test_point_serializes_as_triple() {
        let json = serde_json::to_string(&Point::new(0.25, 0.5)).unwrap();
        assert_eq!(json, "[0.25,0.5,0.0]");
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new_3d(0.0, 0.0, 0.0);
        let b = Point::new_3d(3.0, 4.0, 12.0);
        assert!((a.distance(&b) - 13.0).abs() < 1e-12);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_feature_names_round_trip() {
        for name in FeatureName::ALL {
            assert_eq!(FeatureName::from_name(name.as_str()), Some(name));
        }
        assert_eq!(FeatureName::from_name("pupil_dilation"), None);
    }

    #[test]
    fn test_feature_vector_map_has_five_entries() {
        let features = FeatureVector {
            eyebrow_raise: 0.02,
            lip_tension: 0.1,
            head_nod_intensity: 0.0,
            symmetry_delta: 0.01,
            blink_rate: 12.0,
        };
        let map = features.to_map();
        assert_eq!(map.len(), 5);
        assert_eq!(map["blink_rate"], 12.0);
        assert_eq!(map["lip_tension"], 0.1);
    }

    #[test]
    fn test_stress_score_formatting() {
        let score = StressScore {
            score: 0.123,
            level: StressLevel::Calm,
        };
        assert_eq!(score.formatted(), "🟢 Calm (0.12)");

        let high = StressScore {
            score: 0.9,
            level: StressLevel::High,
        };
        assert_eq!(
            high.formatted(),
            "🔴 High Stress / Possible Deception Indicators (0.90)"
        );
    }
}
