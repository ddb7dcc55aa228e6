//! Log oracle for fixture runs.
//!
//! The oracle replays a finished log from the start and checks the
//! properties every corpus must hold:
//! - Anchors: first and forced-last records are public posts by the primary
//!   participant, carrying their markers
//! - Referential integrity: votes and replies only point backwards, at posts
//! - Contact consistency: unfollow/unblock only undo an active relationship
//! - Groups: invitations and group messages come from members
//! - Feeds: per-author sequences are gapless and linked

use scuttle_core::content::{Content, Relation, LATEST_MARKER, OLDEST_MARKER};
use scuttle_core::Recipient;
use scuttle_env::{FeedId, GroupId, MsgKey, Record};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Property a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Anchor,
    VoteTarget,
    ReplyTarget,
    ContactConsistency,
    GroupMembership,
    Recipients,
    FeedChain,
}

/// One broken property at one position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Position in the log
    pub index: usize,

    pub property: Property,

    pub detail: String,
}

/// Result of checking a log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Verdict {
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one property.
    pub fn of(&self, property: Property) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.property == property)
    }
}

/// Replays a log and collects violations.
pub struct LogOracle {
    /// Primary participant
    primary: FeedId,

    /// 0-based forced-last index
    last_index: usize,
}

#[derive(Default)]
struct Replay {
    posts: HashMap<MsgKey, usize>,
    follows: BTreeMap<FeedId, BTreeSet<FeedId>>,
    blocks: BTreeMap<FeedId, BTreeSet<FeedId>>,
    members: HashMap<GroupId, HashSet<FeedId>>,
    heads: HashMap<FeedId, (u64, MsgKey)>,
    violations: Vec<Violation>,
}

impl Replay {
    fn flag(&mut self, index: usize, property: Property, detail: impl Into<String>) {
        self.violations.push(Violation {
            index,
            property,
            detail: detail.into(),
        });
    }

    fn is_member(&self, group: &GroupId, who: &FeedId) -> bool {
        self.members
            .get(group)
            .map(|m| m.contains(who))
            .unwrap_or(false)
    }
}

impl LogOracle {
    pub fn new(primary: FeedId, last_index: usize) -> Self {
        Self {
            primary,
            last_index,
        }
    }

    /// Checks `log` in order.
    pub fn check(&self, log: &[Record<Content>]) -> Verdict {
        let mut replay = Replay::default();

        for (index, record) in log.iter().enumerate() {
            self.check_chain(&mut replay, index, record);
            self.check_anchor(&mut replay, index, record);

            let author = record.author();
            match record.content() {
                Content::Post(post) => {
                    let targets = post.root.iter().chain(post.branch.iter()).chain(post.fork.iter());
                    for target in targets {
                        if !replay.posts.contains_key(target) {
                            replay.flag(index, Property::ReplyTarget, format!("{} is not an earlier post", target));
                        }
                    }
                    if post.is_reply() && index == self.last_index {
                        replay.flag(index, Property::ReplyTarget, "forced-last post is a reply");
                    }
                    replay.posts.insert(record.key.clone(), index);
                }
                Content::Vote(vote) => {
                    if !replay.posts.contains_key(&vote.vote.link) {
                        replay.flag(index, Property::VoteTarget, format!("{} is not an earlier post", vote.vote.link));
                    }
                }
                Content::Contact(contact) => {
                    let target = contact.contact.clone();
                    let follows = replay.follows.entry(author.clone()).or_default();
                    match contact.relation {
                        Relation::Following(true) => {
                            follows.insert(target);
                        }
                        Relation::Following(false) => {
                            if !follows.remove(&target) {
                                replay.flag(index, Property::ContactConsistency, format!("unfollow of {} without a follow", contact.contact));
                            }
                        }
                        Relation::Blocking(true) => {
                            replay.blocks.entry(author.clone()).or_default().insert(target);
                        }
                        Relation::Blocking(false) => {
                            let removed = replay.blocks.entry(author.clone()).or_default().remove(&target);
                            if !removed {
                                replay.flag(index, Property::ContactConsistency, format!("unblock of {} without a block", contact.contact));
                            }
                        }
                    }
                }
                Content::About(_) => {}
                Content::Private(msg) => match msg.group() {
                    Some(group) => {
                        if !replay.is_member(group, author) {
                            replay.flag(index, Property::GroupMembership, format!("{} wrote to {} without membership", author, group));
                        }
                    }
                    None => {
                        if msg.recps.first() != Some(&Recipient::Feed(author.clone())) {
                            replay.flag(index, Property::Recipients, "direct message does not start with its author");
                        }
                    }
                },
                Content::GroupInit(init) => {
                    replay
                        .members
                        .entry(init.group_id.clone())
                        .or_default()
                        .insert(author.clone());
                }
                Content::GroupAddMember(add) => {
                    if !replay.is_member(&add.group_id, author) {
                        replay.flag(index, Property::GroupMembership, format!("{} invited to {} without membership", author, add.group_id));
                    }
                    let members = replay.members.entry(add.group_id.clone()).or_default();
                    members.extend(add.invitees().cloned());
                }
            }
        }

        Verdict {
            checked: log.len(),
            violations: replay.violations,
        }
    }

    fn check_anchor(&self, replay: &mut Replay, index: usize, record: &Record<Content>) {
        let marker = if index == self.last_index {
            LATEST_MARKER
        } else if index == 0 {
            OLDEST_MARKER
        } else {
            return;
        };

        if record.author() != &self.primary {
            replay.flag(index, Property::Anchor, format!("authored by {}", record.author()));
        }
        match record.content().as_post() {
            Some(post) if post.text.starts_with(marker) => {}
            Some(_) => replay.flag(index, Property::Anchor, format!("text lacks {:?}", marker.trim_end())),
            None => replay.flag(index, Property::Anchor, format!("{} is not a public post", record.content().kind())),
        }
        if index == 0 && index == self.last_index {
            let carries_oldest = record
                .content()
                .as_post()
                .map(|post| post.text.contains(OLDEST_MARKER))
                .unwrap_or(false);
            if !carries_oldest {
                replay.flag(index, Property::Anchor, "single message lacks OLDESTMSG");
            }
        }
    }

    fn check_chain(&self, replay: &mut Replay, index: usize, record: &Record<Content>) {
        let author = record.author().clone();
        let expected = replay.heads.get(&author).map(|(seq, key)| (seq + 1, Some(key.clone())));
        let (want_seq, want_prev) = expected.unwrap_or((1, None));

        if record.sequence() != want_seq || record.value.previous != want_prev {
            replay.flag(
                index,
                Property::FeedChain,
                format!("{} sequence {} (expected {})", author, record.sequence(), want_seq),
            );
        }
        replay.heads.insert(author, (record.sequence(), record.key.clone()));
    }
}
