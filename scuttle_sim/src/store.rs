//! In-memory signed feed store.
//!
//! Every participant has an append-only feed. Appends assign the next
//! sequence number, link the previous record, take a timestamp from the
//! store's clock, sign the canonical JSON of the value with the author's key
//! and derive the content-addressed key from the signed value.

use crate::keys::Identity;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use scuttle_env::{
    FeedId, FeedStore, GroupId, GroupInitBuilder, LogClock, MsgKey, Record, RecordValue,
    StoreError, GROUP_ID_SUFFIX,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const NO_FAULT: u64 = u64::MAX;

/// Value fields covered by the signature.
#[derive(Serialize)]
struct Unsigned<'a, C> {
    previous: &'a Option<MsgKey>,
    author: &'a FeedId,
    sequence: u64,
    timestamp: u64,
    hash: &'a str,
    content: &'a C,
}

struct Group {
    owner: FeedId,
    members: BTreeSet<FeedId>,
}

struct Inner<C> {
    /// Records per author, in sequence order
    feeds: HashMap<FeedId, Vec<Record<C>>>,

    /// Every record in append order
    log: Vec<Record<C>>,

    groups: HashMap<GroupId, Group>,

    /// reader -> author -> number of the author's records the reader has
    replicated: HashMap<FeedId, HashMap<FeedId, usize>>,
}

/// Feed store backed by memory, signing with deterministic identities.
pub struct MemoryFeedStore<C> {
    identities: HashMap<FeedId, Identity>,
    clock: Arc<dyn LogClock>,
    inner: Mutex<Inner<C>>,

    /// Successful appends so far
    appended: AtomicU64,

    /// Appends allowed before every further one is rejected
    fail_after: AtomicU64,
}

impl<C> MemoryFeedStore<C>
where
    C: Clone + Serialize + Send + Sync + 'static,
{
    /// Creates a store with one empty feed per identity.
    pub fn new(identities: &[Identity], clock: Arc<dyn LogClock>) -> Self {
        let identities: HashMap<FeedId, Identity> = identities
            .iter()
            .map(|identity| (identity.id.clone(), identity.clone()))
            .collect();
        let feeds = identities.keys().map(|id| (id.clone(), Vec::new())).collect();

        Self {
            identities,
            clock,
            inner: Mutex::new(Inner {
                feeds,
                log: Vec::new(),
                groups: HashMap::new(),
                replicated: HashMap::new(),
            }),
            appended: AtomicU64::new(0),
            fail_after: AtomicU64::new(NO_FAULT),
        }
    }

    /// Rejects every append once `n` appends have succeeded.
    pub fn fail_appends_after(&self, n: u64) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    /// Lifts an injected fault.
    pub fn clear_faults(&self) {
        self.fail_after.store(NO_FAULT, Ordering::SeqCst);
    }

    /// Every record in append order.
    pub async fn log(&self) -> Vec<Record<C>> {
        self.inner.lock().await.log.clone()
    }

    /// Number of records appended.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.log.len()
    }

    /// Records of one author's feed.
    pub async fn feed(&self, author: &FeedId) -> Vec<Record<C>> {
        self.inner
            .lock()
            .await
            .feeds
            .get(author)
            .cloned()
            .unwrap_or_default()
    }

    /// Records `reader` can see: its own feed plus whatever was replicated
    /// into it, in append order.
    pub async fn visible_to(&self, reader: &FeedId) -> Vec<Record<C>> {
        let inner = self.inner.lock().await;
        let replicated = inner.replicated.get(reader);
        let mut seen: HashMap<&FeedId, usize> = HashMap::new();

        inner
            .log
            .iter()
            .filter(|record| {
                let author = record.author();
                if author == reader {
                    return true;
                }
                let limit = replicated.and_then(|r| r.get(author)).copied().unwrap_or(0);
                let count = seen.entry(author).or_insert(0);
                *count += 1;
                *count <= limit
            })
            .cloned()
            .collect()
    }

    /// Members of `group`, if it exists.
    pub async fn group_members(&self, group: &GroupId) -> Option<BTreeSet<FeedId>> {
        self.inner
            .lock()
            .await
            .groups
            .get(group)
            .map(|g| g.members.clone())
    }

    /// Owner of `group`, if it exists.
    pub async fn group_owner(&self, group: &GroupId) -> Option<FeedId> {
        self.inner
            .lock()
            .await
            .groups
            .get(group)
            .map(|g| g.owner.clone())
    }

    fn check_fault(&self) -> Result<(), StoreError> {
        let limit = self.fail_after.load(Ordering::SeqCst);
        let done = self.appended.load(Ordering::SeqCst);
        if limit != NO_FAULT && done >= limit {
            warn!("Rejecting append #{} (fault injected after {})", done + 1, limit);
            return Err(StoreError::AppendRejected(format!(
                "fault injected after {} appends",
                limit
            )));
        }
        Ok(())
    }

    fn next_sequence(inner: &Inner<C>, author: &FeedId) -> Result<u64, StoreError> {
        inner
            .feeds
            .get(author)
            .map(|feed| feed.len() as u64 + 1)
            .ok_or_else(|| StoreError::unknown_author(author))
    }

    /// Signs and appends under an already held lock.
    fn append_locked(
        &self,
        inner: &mut Inner<C>,
        author: &FeedId,
        content: C,
    ) -> Result<Record<C>, StoreError> {
        self.check_fault()?;
        let identity = self
            .identities
            .get(author)
            .ok_or_else(|| StoreError::unknown_author(author))?;

        let sequence = Self::next_sequence(inner, author)?;
        let previous = inner
            .feeds
            .get(author)
            .and_then(|feed| feed.last())
            .map(|record| record.key.clone());
        let timestamp = self.clock.timestamp();

        let unsigned = Unsigned {
            previous: &previous,
            author,
            sequence,
            timestamp,
            hash: "sha256",
            content: &content,
        };
        let signature = identity.sign(serde_json::to_string(&unsigned)?.as_bytes());

        let value = RecordValue {
            previous,
            author: author.clone(),
            sequence,
            timestamp,
            hash: "sha256".to_string(),
            content,
            signature,
        };
        let digest = Sha256::digest(serde_json::to_string(&value)?.as_bytes());
        let key = MsgKey::new(format!("%{}.sha256", STANDARD.encode(digest)));

        let record = Record {
            key,
            value,
            timestamp,
        };
        inner
            .feeds
            .get_mut(author)
            .ok_or_else(|| StoreError::unknown_author(author))?
            .push(record.clone());
        inner.log.push(record.clone());
        self.appended.fetch_add(1, Ordering::SeqCst);

        debug!("Appended {} #{} by {}", record.key, sequence, author);
        Ok(record)
    }
}

#[async_trait]
impl<C> FeedStore<C> for MemoryFeedStore<C>
where
    C: Clone + Serialize + Send + Sync + 'static,
{
    async fn append(&self, author: &FeedId, content: C) -> Result<Record<C>, StoreError> {
        let mut inner = self.inner.lock().await;
        self.append_locked(&mut inner, author, content)
    }

    async fn replicate(&self, from: &FeedId, to: &FeedId) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.feeds.contains_key(to) {
            return Err(StoreError::unknown_author(to));
        }
        let available = inner
            .feeds
            .get(from)
            .map(|feed| feed.len())
            .ok_or_else(|| StoreError::unknown_author(from))?;

        let seen = inner
            .replicated
            .entry(to.clone())
            .or_default()
            .entry(from.clone())
            .or_insert(0);
        let fresh = available.saturating_sub(*seen);
        *seen = available;

        debug!("Replicated {} records {} -> {}", fresh, from, to);
        Ok(fresh)
    }

    async fn create_group(
        &self,
        author: &FeedId,
        init: GroupInitBuilder<'_, C>,
    ) -> Result<(GroupId, Record<C>), StoreError> {
        let mut inner = self.inner.lock().await;
        let sequence = Self::next_sequence(&inner, author)?;

        let digest = Sha256::digest(format!("{}{}", author, sequence).as_bytes());
        let group = GroupId::new(format!("%{}{}", STANDARD.encode(digest), GROUP_ID_SUFFIX));

        let record = self.append_locked(&mut inner, author, init(&group))?;
        inner.groups.insert(
            group.clone(),
            Group {
                owner: author.clone(),
                members: BTreeSet::from([author.clone()]),
            },
        );
        Ok((group, record))
    }

    async fn invite_to_group(
        &self,
        group: &GroupId,
        inviter: &FeedId,
        invitees: &[FeedId],
        content: C,
    ) -> Result<Record<C>, StoreError> {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .groups
            .get(group)
            .ok_or_else(|| StoreError::unknown_group(group))?;
        if !entry.members.contains(inviter) {
            return Err(StoreError::NotAMember {
                member: inviter.to_string(),
                group: group.to_string(),
            });
        }
        if let Some(stranger) = invitees.iter().find(|id| !self.identities.contains_key(*id)) {
            return Err(StoreError::unknown_author(stranger));
        }

        let record = self.append_locked(&mut inner, inviter, content)?;
        if let Some(entry) = inner.groups.get_mut(group) {
            entry.members.extend(invitees.iter().cloned());
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::VirtualClock;
    use crate::keys::DeterministicKeyProvider;
    use serde_json::{json, Value};

    fn store(n: usize) -> (MemoryFeedStore<Value>, Vec<FeedId>) {
        let identities = DeterministicKeyProvider::new("store").generate(n);
        let ids = identities.iter().map(|i| i.id.clone()).collect();
        (MemoryFeedStore::new(&identities, Arc::new(VirtualClock::new())), ids)
    }

    #[tokio::test]
    async fn test_append_sequences_and_links() {
        let (store, ids) = store(2);

        let first = store.append(&ids[0], json!({"type": "post"})).await.unwrap();
        let second = store.append(&ids[0], json!({"type": "vote"})).await.unwrap();
        let other = store.append(&ids[1], json!({"type": "post"})).await.unwrap();

        assert_eq!(first.sequence(), 1);
        assert_eq!(first.value.previous, None);
        assert_eq!(second.sequence(), 2);
        assert_eq!(second.value.previous, Some(first.key.clone()));
        assert_eq!(other.sequence(), 1);
        assert!(second.timestamp > first.timestamp);
        assert!(first.key.as_str().starts_with('%'));
        assert!(first.key.as_str().ends_with(".sha256"));
        assert!(first.value.signature.ends_with(".sig.ed25519"));
        assert_ne!(first.key, other.key);
        assert_eq!(store.len().await, 3);
        assert_eq!(store.feed(&ids[0]).await.len(), 2);
    }

    #[tokio::test]
    async fn test_same_inputs_same_keys() {
        let (a, ids) = store(1);
        let (b, _) = store(1);

        let ra = a.append(&ids[0], json!({"text": "hi"})).await.unwrap();
        let rb = b.append(&ids[0], json!({"text": "hi"})).await.unwrap();
        assert_eq!(ra.key, rb.key);
        assert_eq!(ra.value.signature, rb.value.signature);
    }

    #[tokio::test]
    async fn test_unknown_author_rejected() {
        let (store, _) = store(1);
        let err = store
            .append(&FeedId::new("@nobody.ed25519"), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownAuthor(_)));
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let (store, ids) = store(1);
        store.fail_appends_after(2);

        store.append(&ids[0], json!(1)).await.unwrap();
        store.append(&ids[0], json!(2)).await.unwrap();
        let err = store.append(&ids[0], json!(3)).await.unwrap_err();
        assert!(matches!(err, StoreError::AppendRejected(_)));
        assert_eq!(store.len().await, 2);

        store.clear_faults();
        assert!(store.append(&ids[0], json!(3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_replicate_counts_new_records() {
        let (store, ids) = store(2);
        store.append(&ids[0], json!(1)).await.unwrap();
        store.append(&ids[0], json!(2)).await.unwrap();

        assert!(store.visible_to(&ids[1]).await.is_empty());
        assert_eq!(store.replicate(&ids[0], &ids[1]).await.unwrap(), 2);
        assert_eq!(store.replicate(&ids[0], &ids[1]).await.unwrap(), 0);
        assert_eq!(store.visible_to(&ids[1]).await.len(), 2);

        // Records appended after replication stay invisible until the next one
        store.append(&ids[0], json!(3)).await.unwrap();
        assert_eq!(store.visible_to(&ids[1]).await.len(), 2);
        assert_eq!(store.replicate(&ids[0], &ids[1]).await.unwrap(), 1);
        assert_eq!(store.visible_to(&ids[1]).await.len(), 3);
    }

    #[tokio::test]
    async fn test_groups() {
        let (store, ids) = store(3);
        let init = |g: &GroupId| json!({"type": "group/init", "groupId": g});

        let (group, record) = store.create_group(&ids[0], &init).await.unwrap();
        assert!(group.as_str().ends_with(GROUP_ID_SUFFIX));
        assert_eq!(record.content()["groupId"], group.as_str());
        assert_eq!(store.group_owner(&group).await, Some(ids[0].clone()));

        store
            .invite_to_group(&group, &ids[0], &[ids[1].clone()], json!({"type": "group/add-member"}))
            .await
            .unwrap();
        let members = store.group_members(&group).await.unwrap();
        assert!(members.contains(&ids[0]) && members.contains(&ids[1]));
        assert!(!members.contains(&ids[2]));

        let err = store
            .invite_to_group(&group, &ids[2], &[ids[2].clone()], json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAMember { .. }));

        let err = store
            .invite_to_group(&GroupId::new("%missing.cloaked"), &ids[0], &[], json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownGroup(_)));
    }
}
