// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod classify;
pub mod collab;
pub mod config;
pub mod criteria;
pub mod doc_type;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod outline;
pub mod patterns;
pub mod report;
pub mod scoring;

// ---- Re-exports for stable public API ----
pub use crate::classify::{Classifier, DetectionResult, TopCandidate};
pub use crate::collab::{build_collaborator, CollabConfig, SharedCollaborator};
pub use crate::doc_type::DocType;
pub use crate::error::{CollaboratorError, ConfigError, ParseError};
pub use crate::evaluator::DocumentEvaluator;
pub use crate::outline::{DocumentOutline, DocumentSection};
pub use crate::report::{Decision, EvaluationResult};
