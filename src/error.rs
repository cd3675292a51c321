//! Error taxonomy for the review core.
//!
//! Three families, with very different blast radii:
//! - [`ParseError`] — upstream document ingestion failed; the run cannot start.
//! - [`CollaboratorError`] — a tiebreak or judge call failed; the caller always
//!   degrades to a deterministic fallback, never aborts the run.
//! - [`ConfigError`] — detection/rubric configuration is malformed; fatal at
//!   load time, never raised per-request.

use thiserror::Error;

/// The upstream parser could not turn raw bytes into a `DocumentOutline`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not a well-formed document: {0}")]
    Malformed(String),
    #[error("i/o error reading document: {0}")]
    Io(#[from] std::io::Error),
}

/// An external collaborator (tiebreak or judge) was unavailable or answered
/// outside its contract. Callers degrade; they never propagate this upward.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator request failed: {0}")]
    Transport(String),
    #[error("collaborator returned a malformed answer: {0}")]
    Malformed(String),
    #[error("collaborator is disabled")]
    Disabled,
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(e: reqwest::Error) -> Self {
        CollaboratorError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(e: serde_json::Error) -> Self {
        CollaboratorError::Malformed(e.to_string())
    }
}

/// Detection or rubric configuration failed to load or validate.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("unknown document type `{0}` referenced in config")]
    UnknownType(String),
    #[error("unknown structural pattern `{pattern}` for type {doc_type}")]
    UnknownPattern { doc_type: String, pattern: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}
