//! Errors surfaced by the coaching pipeline

use thiserror::Error;

/// Failures a caller of the pipeline can observe.
///
/// Evidence and parse failures never appear here: they are absorbed where
/// they happen (empty evidence list, fallback record).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoachError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}
