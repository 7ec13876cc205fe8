//! Stress estimation
//!
//! Maps a feature vector to a bounded score by weighted linear combination of
//! scale-normalized features, then classifies the score against two
//! thresholds. The model is a fixed, explainable heuristic; all weights, scales
//! and thresholds are configuration with calibrated defaults.

use crate::error::AnalyzerError;
use crate::types::{FeatureName, FeatureVector, StressLevel, StressScore};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cap on a single normalized feature (1.5x its typical maximum)
pub const MAX_NORMALIZED_CONTRIBUTION: f64 = 1.5;

/// Upper bound of the stress score
pub const MAX_SCORE: f64 = 1.5;

/// Allowed deviation of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// One coefficient per feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureCoefficients {
    pub eyebrow_raise: f64,
    pub lip_tension: f64,
    pub head_nod_intensity: f64,
    pub symmetry_delta: f64,
    pub blink_rate: f64,
}

impl FeatureCoefficients {
    /// Heuristic importance of each feature
    pub fn default_weights() -> Self {
        Self {
            eyebrow_raise: 0.30,
            lip_tension: 0.25,
            head_nod_intensity: 0.20,
            symmetry_delta: 0.15,
            blink_rate: 0.10,
        }
    }

    /// Typical maximum of each feature
    pub fn default_scales() -> Self {
        Self {
            eyebrow_raise: 0.08,     // typical range 0.02-0.08
            lip_tension: 1.0,        // already 0-1
            head_nod_intensity: 1.5, // calm is roughly 0-0.3
            symmetry_delta: 0.05,    // typical range 0-0.05
            blink_rate: 30.0,        // blinks per minute, >20 is elevated
        }
    }

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

    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }
}

/// Upper bounds of the calm and mild bands; scores at a bound fall in the
/// band above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressThresholds {
    pub calm: f64,
    pub mild: f64,
}

impl Default for StressThresholds {
    fn default() -> Self {
        Self {
            calm: 0.35,
            mild: 0.65,
        }
    }
}

impl StressThresholds {
    pub fn classify(&self, score: f64) -> StressLevel {
        if score < self.calm {
            StressLevel::Calm
        } else if score < self.mild {
            StressLevel::Mild
        } else {
            StressLevel::High
        }
    }
}

/// What `predict_map` does when an expected feature is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFeaturePolicy {
    /// Absent features contribute 0
    #[default]
    Zero,
    /// Absent features are an error
    Reject,
}

/// Estimator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub weights: FeatureCoefficients,
    pub scales: FeatureCoefficients,
    pub thresholds: StressThresholds,
    pub missing_features: MissingFeaturePolicy,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            weights: FeatureCoefficients::default_weights(),
            scales: FeatureCoefficients::default_scales(),
            thresholds: StressThresholds::default(),
            missing_features: MissingFeaturePolicy::default(),
        }
    }
}

impl StressConfig {
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        for (name, weight) in self.weights.iter() {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(AnalyzerError::Configuration(format!(
                    "weight for {name} must be finite and non-negative, got {weight}"
                )));
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AnalyzerError::Configuration(format!(
                "weights must sum to 1.0, got {sum:.4}"
            )));
        }

        for (name, scale) in self.scales.iter() {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(AnalyzerError::Configuration(format!(
                    "scale for {name} must be positive, got {scale}"
                )));
            }
        }

        let StressThresholds { calm, mild } = self.thresholds;
        if !(calm > 0.0 && calm < mild && mild <= MAX_SCORE) {
            return Err(AnalyzerError::Configuration(format!(
                "thresholds must satisfy 0 < calm < mild <= {MAX_SCORE}, got calm={calm} mild={mild}"
            )));
        }

        Ok(())
    }
}

/// Linear heuristic stress scorer. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct StressEstimator {
    config: StressConfig,
}

impl StressEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimator with custom settings; rejects invalid configuration
    pub fn with_config(config: StressConfig) -> Result<Self, AnalyzerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Weighted, capped contribution of one feature value
    pub fn contribution(&self, name: FeatureName, value: f64) -> f64 {
        let normalized = (value / self.config.scales.get(name)).min(MAX_NORMALIZED_CONTRIBUTION);
        self.config.weights.get(name) * normalized
    }

    /// Score a full feature vector
    pub fn predict(&self, features: &FeatureVector) -> StressScore {
        let weighted_sum: f64 = features
            .iter()
            .map(|(name, value)| self.contribution(name, value))
            .sum();
        self.score(weighted_sum)
    }

    /// Score a name-keyed feature map.
    ///
    /// Unknown names carry no weight and are ignored. Absent expected features
    /// follow the configured [`MissingFeaturePolicy`].
    pub fn predict_map(&self, features: &HashMap<String, f64>) -> Result<StressScore, AnalyzerError> {
        for key in features.keys() {
            if FeatureName::from_name(key).is_none() {
                trace!("ignoring unknown feature {key}");
            }
        }

        let mut weighted_sum = 0.0;
        for name in FeatureName::ALL {
            match features.get(name.as_str()) {
                Some(&value) => weighted_sum += self.contribution(name, value),
                None => match self.config.missing_features {
                    MissingFeaturePolicy::Zero => {}
                    MissingFeaturePolicy::Reject => {
                        return Err(AnalyzerError::MissingFeature(name.as_str().to_string()))
                    }
                },
            }
        }
        Ok(self.score(weighted_sum))
    }

    fn score(&self, weighted_sum: f64) -> StressScore {
        let score = weighted_sum.clamp(0.0, MAX_SCORE);
        StressScore {
            score,
            level: self.config.thresholds.classify(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(
        eyebrow_raise: f64,
        lip_tension: f64,
        head_nod_intensity: f64,
        symmetry_delta: f64,
        blink_rate: f64,
    ) -> FeatureVector {
        FeatureVector {
            eyebrow_raise,
            lip_tension,
            head_nod_intensity,
            symmetry_delta,
            blink_rate,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = StressConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_features_are_calm() {
        let score = StressEstimator::new().predict(&FeatureVector::default());
        assert_eq!(score.score, 0.0);
        assert_eq!(score.level, StressLevel::Calm);
    }

    #[test]
    fn test_weighted_sum() {
        let estimator = StressEstimator::new();
        // 0.3*0.5 + 0.25*0.2 + 0.2*0.2 + 0.15*0.4 + 0.1*0.5
        let score = estimator.predict(&features(0.04, 0.2, 0.3, 0.02, 15.0));
        assert!((score.score - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_contribution_is_capped() {
        let estimator = StressEstimator::new();
        let capped = estimator.contribution(FeatureName::EyebrowRaise, 10.0);
        assert!((capped - 0.3 * 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_score_is_clamped() {
        let estimator = StressEstimator::new();

        let extreme = estimator.predict(&features(1e6, 1e6, 1e6, 1e6, 1e6));
        assert!((extreme.score - 1.5).abs() < 1e-9);
        assert!(extreme.score <= MAX_SCORE);
        assert_eq!(extreme.level, StressLevel::High);

        let negative = estimator.predict(&features(-1.0, -1.0, -1.0, -1.0, -1.0));
        assert_eq!(negative.score, 0.0);
    }

    #[test]
    fn test_score_bounds_over_grid() {
        let estimator = StressEstimator::new();
        let values = [-5.0, 0.0, 0.01, 0.05, 0.5, 1.0, 10.0, 100.0, f64::INFINITY];
        for &a in &values {
            for &b in &values {
                let score = estimator.predict(&features(a, b, a, b, a * 30.0));
                assert!((0.0..=MAX_SCORE).contains(&score.score));
            }
        }
    }

    #[test]
    fn test_score_is_monotone_in_each_feature() {
        let estimator = StressEstimator::new();
        let base = features(0.03, 0.3, 0.2, 0.01, 12.0);
        let steps: Vec<f64> = (0..60).map(|i| i as f64 * 0.05).collect();

        for name in FeatureName::ALL {
            let scale = estimator.config().scales.get(name);
            let mut previous = f64::NEG_INFINITY;
            for step in &steps {
                let mut f = base;
                let value = step * scale;
                match name {
                    FeatureName::EyebrowRaise => f.eyebrow_raise = value,
                    FeatureName::LipTension => f.lip_tension = value,
                    FeatureName::HeadNodIntensity => f.head_nod_intensity = value,
                    FeatureName::SymmetryDelta => f.symmetry_delta = value,
                    FeatureName::BlinkRate => f.blink_rate = value,
                }
                let score = estimator.predict(&f).score;
                assert!(score >= previous, "{name} not monotone at {value}");
                previous = score;
            }
        }
    }

    #[test]
    fn test_classification_boundaries() {
        let thresholds = StressThresholds::default();
        assert_eq!(thresholds.classify(0.0), StressLevel::Calm);
        assert_eq!(thresholds.classify(0.349), StressLevel::Calm);
        assert_eq!(thresholds.classify(0.35), StressLevel::Mild);
        assert_eq!(thresholds.classify(0.649), StressLevel::Mild);
        assert_eq!(thresholds.classify(0.65), StressLevel::High);
        assert_eq!(thresholds.classify(1.5), StressLevel::High);
    }

    #[test]
    fn test_boundary_scores_through_predict() {
        let config = StressConfig {
            weights: FeatureCoefficients {
                eyebrow_raise: 0.0,
                lip_tension: 0.5,
                head_nod_intensity: 0.0,
                symmetry_delta: 0.0,
                blink_rate: 0.5,
            },
            scales: FeatureCoefficients {
                eyebrow_raise: 1.0,
                lip_tension: 1.0,
                head_nod_intensity: 1.0,
                symmetry_delta: 1.0,
                blink_rate: 1.0,
            },
            thresholds: StressThresholds {
                calm: 0.25,
                mild: 0.5,
            },
            ..Default::default()
        };
        let estimator = StressEstimator::with_config(config).unwrap();

        let at_calm = estimator.predict(&features(0.0, 0.5, 0.0, 0.0, 0.0));
        assert_eq!(at_calm.score, 0.25);
        assert_eq!(at_calm.level, StressLevel::Mild);

        let at_mild = estimator.predict(&features(0.0, 0.5, 0.0, 0.0, 0.5));
        assert_eq!(at_mild.score, 0.5);
        assert_eq!(at_mild.level, StressLevel::High);
    }

    #[test]
    fn test_predict_map_matches_predict() {
        let estimator = StressEstimator::new();
        let f = features(0.05, 0.4, 0.1, 0.02, 18.0);
        let from_map = estimator.predict_map(&f.to_map()).unwrap();
        assert_eq!(from_map, estimator.predict(&f));
    }

    #[test]
    fn test_predict_map_ignores_unknown_names() {
        let estimator = StressEstimator::new();
        let mut map = FeatureVector::default().to_map();
        map.insert("pupil_dilation".to_string(), 100.0);

        let score = estimator.predict_map(&map).unwrap();
        assert_eq!(score.score, 0.0);
    }

    #[test]
    fn test_missing_feature_policy() {
        let mut map = HashMap::new();
        map.insert("lip_tension".to_string(), 1.0);

        let lenient = StressEstimator::new();
        let score = lenient.predict_map(&map).unwrap();
        assert!((score.score - 0.25).abs() < 1e-12);

        let strict = StressEstimator::with_config(StressConfig {
            missing_features: MissingFeaturePolicy::Reject,
            ..Default::default()
        })
        .unwrap();
        match strict.predict_map(&map) {
            Err(AnalyzerError::MissingFeature(name)) => assert_eq!(name, "eyebrow_raise"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let mut config = StressConfig::default();
        config.scales.symmetry_delta = 0.0;
        assert!(StressEstimator::with_config(config).is_err());

        let mut config = StressConfig::default();
        config.weights.blink_rate = -0.1;
        assert!(StressEstimator::with_config(config).is_err());

        let mut config = StressConfig::default();
        config.weights.eyebrow_raise = 0.9;
        assert!(StressEstimator::with_config(config).is_err());

        let mut config = StressConfig::default();
        config.thresholds = StressThresholds {
            calm: 0.7,
            mild: 0.6,
        };
        assert!(StressEstimator::with_config(config).is_err());

        let mut config = StressConfig::default();
        config.thresholds.mild = 2.0;
        assert!(StressEstimator::with_config(config).is_err());
    }
}
