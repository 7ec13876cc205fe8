//! microexpr - Streaming facial micro-expression analysis
//!
//! microexpr turns a stream of per-frame face landmarks into a continuously
//! updated stress indicator through a deterministic pipeline: landmark frame →
//! geometric features (smoothed per session) + blink rate → weighted stress
//! score → calm / mild / high classification.
//!
//! ## Modules
//!
//! - **Features**: eyebrow raise, lip tension, head nod, facial symmetry and
//!   blink rate, with per-session history held in a [`SessionContext`]
//! - **Estimator**: fixed, explainable linear scoring with calibrated defaults
//! - **Schema**: face.landmark_frame.v1 input records and analysis record output

pub mod blink;
pub mod config;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod events;
pub mod features;
pub mod geometry;
pub mod pipeline;
pub mod schema;
pub mod session;
pub mod smoothing;
pub mod topology;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use estimator::{StressConfig, StressEstimator};
pub use features::{ExtractorConfig, FeatureExtractor};
pub use pipeline::{analyze_ndjson, StressProcessor};
pub use session::SessionContext;
pub use types::{FeatureVector, LandmarkFrame, Point, StressLevel, StressScore};

// Schema exports
pub use schema::{FrameAdapter, FrameRecord, SCHEMA_VERSION};

/// Crate version embedded in CLI reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "microexpr";
