//! Merge engine error types.
//!
//! The engine is pure computation plus at most one blocking question per
//! conflict, so failures are never transient and nothing here is retried.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised while merging manifest sections.
///
/// Shape mismatches between the three trees are not errors: the tree merger
/// falls back to scalar classification instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    /// Interactive conflict resolution was requested but the execution
    /// context cannot ask questions.
    ///
    /// This is fatal and aborts the whole merge. Callers are responsible for
    /// rolling back any external state they changed before the merge.
    #[error("Interactive conflict resolution requested for '{field}' but the console is not interactive")]
    InteractiveUnavailable { field: String },

    /// An entity collection was built with the same name twice.
    #[error("Duplicate entity '{name}' in section '{section}'")]
    DuplicateEntity { section: String, name: String },

    /// An entity section does not hold a name → constraint mapping.
    #[error("Invalid entity section '{section}': {reason}")]
    InvalidSection { section: String, reason: String },

    /// The operator could not be asked a question.
    #[error("Failed to read the answer to a conflict question: {reason}")]
    Prompt { reason: String },
}

/// Result type alias for merge engine operations.
pub type EngineResult<T> = Result<T, MergeError>;
