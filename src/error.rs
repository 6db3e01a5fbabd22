//! Error taxonomy for the labelling pipeline.
//!
//! Three failure classes, surfaced eagerly and never retried:
//! - [`Error::InvalidInput`]: malformed data or configuration, caught before
//!   any computation starts.
//! - [`Error::SingularSystem`]: the unlabelled Laplacian block is not
//!   solvable, a structural property of the graph (some unlabelled
//!   observation has no path to any labelled one).
//! - [`Error::Internal`]: a post-condition of our own graph construction was
//!   violated; the call aborts instead of returning corrupted predictions.
//!
//! Iterative-solver values drifting slightly outside [0, 1] are not errors;
//! they are clamped in the solver (see `solver::clamp_unit`).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input data or configuration. Surfaced before any
    /// computation proceeds.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The labelled/unlabelled partition of the Laplacian is not invertible.
    /// Typically an unlabelled observation cannot reach any labelled
    /// observation through the graph.
    #[error(
        "singular system: {detail}; an unlabelled observation cannot reach any \
         labelled observation through the graph; increase k or adjust graph \
         construction"
    )]
    SingularSystem { detail: String },

    /// An invariant of the graph-building algorithm itself was violated.
    /// This is a defect, not a user error.
    #[error("internal invariant violated: {reason}")]
    Internal { reason: String },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidInput { reason: reason.into() }
    }

    pub(crate) fn internal(reason: impl Into<String>) -> Self {
        Error::Internal { reason: reason.into() }
    }
}
