//! Error type for fixture runs and output writers.

use scuttle_core::GenError;
use scuttle_env::StoreError;
use thiserror::Error;

/// Anything that ends a run early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Generation failed at message {index}: {source}")]
    Generation {
        index: usize,
        #[source]
        source: GenError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cannot read frequencies from {path}: {reason}")]
    Frequencies { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RunError {
    pub fn at(index: usize, source: GenError) -> Self {
        Self::Generation { index, source }
    }
}
