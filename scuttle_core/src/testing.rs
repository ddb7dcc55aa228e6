//! Fixtures shared by the in-crate tests.

use crate::content::{Content, PostContent};
use async_trait::async_trait;
use scuttle_env::{
    FeedId, FeedStore, GroupId, GroupInitBuilder, MsgKey, Record, RecordValue, StoreError,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

pub fn participants(n: usize) -> Vec<FeedId> {
    (0..n).map(|i| FeedId::new(format!("@author{}.ed25519", i))).collect()
}

pub fn record(author: &FeedId, sequence: u64, content: Content) -> Record<Content> {
    Record {
        key: MsgKey::new(format!("%{}:{}.sha256", author, sequence)),
        value: RecordValue {
            previous: None,
            author: author.clone(),
            sequence,
            timestamp: sequence,
            hash: "sha256".to_string(),
            content,
            signature: String::new(),
        },
        timestamp: sequence,
    }
}

pub fn post_record(author: &FeedId, sequence: u64, post: PostContent) -> Record<Content> {
    record(author, sequence, Content::Post(post))
}

#[derive(Default)]
struct Inner {
    sequences: BTreeMap<FeedId, u64>,
    log: Vec<Record<Content>>,
    members: BTreeMap<GroupId, BTreeSet<FeedId>>,
    replications: Vec<(FeedId, FeedId)>,
}

/// Bare store: sequences per author, keeps the log, no signing.
#[derive(Default)]
pub struct TestStore {
    inner: Mutex<Inner>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<Record<Content>> {
        self.inner.lock().unwrap().log.clone()
    }

    pub fn replications(&self) -> Vec<(FeedId, FeedId)> {
        self.inner.lock().unwrap().replications.clone()
    }

    fn push(inner: &mut Inner, author: &FeedId, content: Content) -> Record<Content> {
        let seq = inner.sequences.entry(author.clone()).or_insert(0);
        *seq += 1;
        let rec = record(author, *seq, content);
        inner.log.push(rec.clone());
        rec
    }
}

#[async_trait]
impl FeedStore<Content> for TestStore {
    async fn append(&self, author: &FeedId, content: Content) -> Result<Record<Content>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(Self::push(&mut inner, author, content))
    }

    async fn replicate(&self, from: &FeedId, to: &FeedId) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.replications.push((from.clone(), to.clone()));
        Ok(inner.log.iter().filter(|r| r.author() == from).count())
    }

    async fn create_group(
        &self,
        author: &FeedId,
        init: GroupInitBuilder<'_, Content>,
    ) -> Result<(GroupId, Record<Content>), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let group = GroupId::new(format!("%group{}.cloaked", inner.members.len()));
        inner
            .members
            .entry(group.clone())
            .or_default()
            .insert(author.clone());
        let rec = Self::push(&mut inner, author, init(&group));
        Ok((group, rec))
    }

    async fn invite_to_group(
        &self,
        group: &GroupId,
        inviter: &FeedId,
        invitees: &[FeedId],
        content: Content,
    ) -> Result<Record<Content>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let members = inner
            .members
            .get_mut(group)
            .ok_or_else(|| StoreError::unknown_group(group.as_str()))?;
        if !members.contains(inviter) {
            return Err(StoreError::NotAMember {
                member: inviter.to_string(),
                group: group.to_string(),
            });
        }
        members.extend(invitees.iter().cloned());
        Ok(Self::push(&mut inner, inviter, content))
    }
}
