//! Scuttle Collaborator Contracts
//!
//! This crate defines the boundary between the deterministic content engine
//! (`scuttle_core`) and the services it consumes but does not implement:
//! signing and sequencing records, storing them, replicating them between
//! participants, and minting private groups.
//!
//! # Core Concept: Append and Fold
//!
//! The engine never writes a log itself. It hands a content payload to a
//! [`FeedStore`] and receives back a signed, sequenced [`Record`]:
//!
//! ```text
//! Engine                         FeedStore
//!   |-- append(author, C) -------->|
//!   |                              |-- sign, sequence, hash
//!   |<------------- Record<C> -----|
//!   |-- fold(record) into state    |
//! ```
//!
//! Timestamps come from a [`LogClock`], so a run driven by a virtual clock
//! is reproducible byte for byte.
//!
//! # Example
//!
//! ```ignore
//! use scuttle_env::{FeedStore, FeedId};
//!
//! async fn publish<S: FeedStore<String>>(store: &S, author: &FeedId) {
//!     let record = store.append(author, "hello".to_string()).await?;
//!     assert_eq!(record.value.sequence, 1);
//! }
//! ```

mod context;
mod store;
mod types;
mod error;
mod system_clock;

pub use context::LogClock;
pub use store::{FeedStore, GroupInitBuilder};
pub use types::{FeedId, GroupId, MsgKey, Record, RecordValue, GROUP_ID_SUFFIX};
pub use error::StoreError;
pub use system_clock::SystemClock;
