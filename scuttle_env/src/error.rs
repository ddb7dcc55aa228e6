//! Error types for the collaborator contracts.

use thiserror::Error;

/// Errors a feed store can report back to the engine.
///
/// None of these are retried by the engine: a failed append aborts the run.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The author has no signing identity in this store
    #[error("Unknown author: {0}")]
    UnknownAuthor(String),

    /// The group was never created in this store
    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    /// The participant tried to act on a group it does not belong to
    #[error("{member} is not a member of {group}")]
    NotAMember { member: String, group: String },

    /// Content could not be encoded for signing/hashing
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The store refused the append (injected fault, quota, shutdown)
    #[error("Append rejected: {0}")]
    AppendRejected(String),

    /// Backend storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Creates an unknown-author error.
    pub fn unknown_author(author: impl std::fmt::Display) -> Self {
        Self::UnknownAuthor(author.to_string())
    }

    /// Creates an unknown-group error.
    pub fn unknown_group(group: impl std::fmt::Display) -> Self {
        Self::UnknownGroup(group.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
