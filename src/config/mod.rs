//! Immutable configuration for detection and rubric scoring.
//!
//! Both configs are loaded once (embedded defaults or explicit files),
//! validated eagerly, and passed into the classifier/evaluator at
//! construction time — never read as ambient global state. A malformed
//! config is a `ConfigError` at load time, never a per-request failure.

pub mod detection;
pub mod rubric;

pub use detection::{
    ConflictRule, DetectionConfig, DominanceRule, FilenamePolicy, SignalWeights, TypeDetection,
};
pub use rubric::{CriterioConfig, Penalizacion, RubricConfig};
