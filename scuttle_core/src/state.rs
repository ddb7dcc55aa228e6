//! Social state: the running summary every synthesis step reads.
//!
//! The state is owned by a single run and mutated only through
//! [`SocialState::fold`], once per appended record, in generation order.

use crate::content::{Content, ContentKind, Relation};
use scuttle_env::{FeedId, GroupId, Record};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

static NO_FEEDS: BTreeSet<FeedId> = BTreeSet::new();
static NO_GROUPS: BTreeSet<GroupId> = BTreeSet::new();

/// Follow graph, block graph, group membership and the per-kind record index.
#[derive(Debug, Clone, Default)]
pub struct SocialState {
    /// Who each participant follows
    follows: BTreeMap<FeedId, BTreeSet<FeedId>>,

    /// Who each participant blocks
    blocks: BTreeMap<FeedId, BTreeSet<FeedId>>,

    /// Groups each participant belongs to
    groups: BTreeMap<FeedId, BTreeSet<GroupId>>,

    /// Records by kind, in generation order
    msgs_by_kind: BTreeMap<ContentKind, Vec<Record<Content>>>,

    /// Number of records folded so far
    folded: usize,
}

impl SocialState {
    /// Creates empty state with an entry for every participant.
    pub fn new(participants: &[FeedId]) -> Self {
        let mut state = Self::default();
        for id in participants {
            state.follows.insert(id.clone(), BTreeSet::new());
            state.blocks.insert(id.clone(), BTreeSet::new());
            state.groups.insert(id.clone(), BTreeSet::new());
        }
        state
    }

    /// Participants `who` currently follows.
    pub fn follows(&self, who: &FeedId) -> &BTreeSet<FeedId> {
        self.follows.get(who).unwrap_or(&NO_FEEDS)
    }

    /// Participants `who` currently blocks.
    pub fn blocks(&self, who: &FeedId) -> &BTreeSet<FeedId> {
        self.blocks.get(who).unwrap_or(&NO_FEEDS)
    }

    /// Groups `who` belongs to.
    pub fn groups(&self, who: &FeedId) -> &BTreeSet<GroupId> {
        self.groups.get(who).unwrap_or(&NO_GROUPS)
    }

    /// Participants known to belong to `group`, in id order.
    pub fn members_of(&self, group: &GroupId) -> Vec<FeedId> {
        self.groups
            .iter()
            .filter(|(_, groups)| groups.contains(group))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Records of `kind`, oldest first.
    pub fn messages_of(&self, kind: ContentKind) -> &[Record<Content>] {
        self.msgs_by_kind
            .get(&kind)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Per-kind record counts, only for kinds seen.
    pub fn counts(&self) -> BTreeMap<ContentKind, usize> {
        self.msgs_by_kind
            .iter()
            .map(|(kind, msgs)| (*kind, msgs.len()))
            .collect()
    }

    /// Follow graph as a whole.
    pub fn follow_graph(&self) -> &BTreeMap<FeedId, BTreeSet<FeedId>> {
        &self.follows
    }

    /// Block graph as a whole.
    pub fn block_graph(&self) -> &BTreeMap<FeedId, BTreeSet<FeedId>> {
        &self.blocks
    }

    /// Number of records folded.
    pub fn len(&self) -> usize {
        self.folded
    }

    pub fn is_empty(&self) -> bool {
        self.folded == 0
    }

    /// Folds one appended record into the state.
    ///
    /// Indexes the record under its kind, applies contact changes to the
    /// author's follow/block sets and group control records to membership.
    pub fn fold(&mut self, record: &Record<Content>) {
        let author = record.author().clone();

        match record.content() {
            Content::Contact(contact) => {
                let target = contact.contact.clone();
                match contact.relation {
                    Relation::Following(true) => {
                        self.follows.entry(author.clone()).or_default().insert(target);
                    }
                    Relation::Following(false) => {
                        self.follows.entry(author.clone()).or_default().remove(&target);
                    }
                    Relation::Blocking(true) => {
                        self.blocks.entry(author.clone()).or_default().insert(target);
                    }
                    Relation::Blocking(false) => {
                        self.blocks.entry(author.clone()).or_default().remove(&target);
                    }
                }
                debug!("fold contact {} -> {} ({:?})", author, contact.contact, contact.relation);
            }
            Content::GroupInit(init) => {
                self.groups.entry(author.clone()).or_default().insert(init.group_id.clone());
                debug!("fold group/init {} by {}", init.group_id, author);
            }
            Content::GroupAddMember(add) => {
                self.groups.entry(author.clone()).or_default().insert(add.group_id.clone());
                for invitee in add.invitees() {
                    self.groups
                        .entry(invitee.clone())
                        .or_default()
                        .insert(add.group_id.clone());
                }
                debug!("fold group/add-member {} by {}", add.group_id, author);
            }
            _ => {}
        }

        self.msgs_by_kind
            .entry(record.content().kind())
            .or_default()
            .push(record.clone());
        self.folded += 1;
    }
}
