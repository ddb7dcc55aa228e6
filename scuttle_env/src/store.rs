//! Feed store abstraction: the append, replicate and group services the
//! engine consumes.

use async_trait::async_trait;
use crate::error::StoreError;
use crate::types::{FeedId, GroupId, Record};

/// Builds the initial control payload of a new group once its id is known.
pub type GroupInitBuilder<'a, C> = &'a (dyn Fn(&GroupId) -> C + Send + Sync);

/// Abstraction for persisting records authored by participants.
///
/// # Implementations
///
/// - **Simulation**: `MemoryFeedStore` (in `scuttle_sim`) - in-memory feeds,
///   deterministic keys, optional fault injection
///
/// # Record Flow
///
/// ```text
/// Engine                      Store
///   |-- append(author, C) ---->|-- sequence = last + 1
///   |                          |-- sign(previous, author, sequence, ts, C)
///   |<----- Record<C> ---------|-- key = hash(signed value)
/// ```
///
/// # Failure
///
/// Every method may fail. The engine never retries: a skipped or reordered
/// record would break reproducibility, so errors abort the run.
#[async_trait]
pub trait FeedStore<C>: Send + Sync
where
    C: Clone + Send + Sync + 'static,
{
    /// Persists `content` as the next record of `author`'s feed.
    ///
    /// # Returns
    /// * `Ok(record)` - signed, sequenced record with a unique key
    /// * `Err(StoreError::UnknownAuthor)` - no identity for `author`
    async fn append(&self, author: &FeedId, content: C) -> Result<Record<C>, StoreError>;

    /// Makes records authored by `from` visible to `to`'s future reads.
    ///
    /// # Returns
    /// Number of records that became newly visible.
    async fn replicate(&self, from: &FeedId, to: &FeedId) -> Result<usize, StoreError>;

    /// Creates a private group owned by `author`.
    ///
    /// The store mints the group id, asks `init` for the control payload and
    /// appends it to `author`'s feed. The author is the first member.
    async fn create_group(
        &self,
        author: &FeedId,
        init: GroupInitBuilder<'_, C>,
    ) -> Result<(GroupId, Record<C>), StoreError>;

    /// Adds `invitees` to `group` on behalf of `inviter`, appending `content`
    /// (the invitation control payload) to the inviter's feed.
    ///
    /// # Returns
    /// * `Err(StoreError::UnknownGroup)` - `group` was never created here
    /// * `Err(StoreError::NotAMember)` - `inviter` does not belong to `group`
    async fn invite_to_group(
        &self,
        group: &GroupId,
        inviter: &FeedId,
        invitees: &[FeedId],
        content: C,
    ) -> Result<Record<C>, StoreError>;
}
