//! Identifiers and record types shared by the engine and its collaborators.

use serde::{Deserialize, Serialize};

/// Identifier of a participant's feed, e.g. `@<base64 public key>.ed25519`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    /// Wraps an already formatted feed identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content-addressed key of a record, e.g. `%<base64 sha256>.sha256`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgKey(String);

impl MsgKey {
    /// Wraps an already formatted message key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MsgKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Suffix every group identifier ends with.
pub const GROUP_ID_SUFFIX: &str = ".cloaked";

/// Identifier of a private group, e.g. `%<base64>.cloaked`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wraps an already formatted group identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The signed, sequenced body of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordValue<C> {
    /// Key of the author's previous record (`None` for sequence 1)
    pub previous: Option<MsgKey>,

    /// Resolved author
    pub author: FeedId,

    /// Per-author sequence number, starting at 1
    pub sequence: u64,

    /// Claimed creation time in milliseconds
    pub timestamp: u64,

    /// Hash function used for the key
    pub hash: String,

    /// The content payload
    pub content: C,

    /// Author signature over every field above
    pub signature: String,
}

/// An immutable, author-attributed record as returned by a feed store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<C> {
    /// Content-addressed key
    pub key: MsgKey,

    /// Signed body
    pub value: RecordValue<C>,

    /// Time the store received the record
    pub timestamp: u64,
}

impl<C> Record<C> {
    /// Returns the record's author.
    pub fn author(&self) -> &FeedId {
        &self.value.author
    }

    /// Returns the record's content payload.
    pub fn content(&self) -> &C {
        &self.value.content
    }

    /// Returns the per-author sequence number.
    pub fn sequence(&self) -> u64 {
        self.value.sequence
    }
}
