//! Error types for the content engine.

use scuttle_env::StoreError;
use thiserror::Error;

/// Failures that abort a generation run.
///
/// Sampling and targeting errors are precondition violations: the
/// message-type selector guards against them, so seeing one means a guard
/// is wrong. Store errors come from the collaborator and are never retried.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Cannot sample from an empty {0}")]
    EmptySample(&'static str),

    #[error("Sampled index {index} outside a sequence of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("Invalid weight table: {0}")]
    InvalidWeights(String),

    #[error("No prior post to {0}")]
    NoPriorPost(&'static str),

    #[error("A run needs at least one participant")]
    NoParticipants,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
