//! Private messages and group operations.
//!
//! Group creation and invitation are delegated to the store, which mints
//! the protocol control records. Membership is not touched here: the
//! returned record carries it, and the caller folds it like any other.

use crate::content::{Content, GroupAddMember, GroupInit, PrivatePost, Recipient};
use crate::error::GenError;
use crate::frequencies::PrivateSubtype;
use crate::select::Draft;
use crate::state::SocialState;
use crate::synth::{Generator, Position, Visibility};
use scuttle_env::{FeedId, FeedStore, GroupId};
use tracing::debug;

impl Generator {
    /// Draws a private-activity subtype and produces it.
    ///
    /// Group messages without membership, and invitations without a group or
    /// anyone left to invite, fall back to a direct message.
    pub async fn private<S>(
        &mut self,
        pos: Position,
        author: &FeedId,
        participants: &[FeedId],
        state: &SocialState,
        store: &S,
    ) -> Result<Draft, GenError>
    where
        S: FeedStore<Content> + ?Sized,
    {
        match self.sampler.sample_weighted(&self.freq.private_types)? {
            PrivateSubtype::Direct => self.direct(pos, author, participants, state),
            PrivateSubtype::GroupCreation => self.create_group(author, store).await,
            PrivateSubtype::GroupInvitation => {
                self.invite(pos, author, participants, state, store).await
            }
            PrivateSubtype::GroupMessage => {
                self.group_message(pos, author, participants, state)
            }
        }
    }

    /// A post-shaped message to the author and a handful of others.
    pub fn direct(
        &mut self,
        pos: Position,
        author: &FeedId,
        participants: &[FeedId],
        state: &SocialState,
    ) -> Result<Draft, GenError> {
        let post = self.post(pos, state, participants, Visibility::Private)?;
        let recps = self
            .recipients(author, participants)?
            .into_iter()
            .map(Recipient::Feed)
            .collect::<Vec<_>>();

        debug!("direct message from {} to {} recipients", author, recps.len());
        Ok(Draft::Content(Content::Private(PrivatePost { post, recps })))
    }

    async fn create_group<S>(&mut self, author: &FeedId, store: &S) -> Result<Draft, GenError>
    where
        S: FeedStore<Content> + ?Sized,
    {
        let init = |group: &GroupId| {
            Content::GroupInit(GroupInit {
                group_id: group.clone(),
            })
        };
        let (group, record) = store.create_group(author, &init).await?;

        debug!("{} created group {}", author, group);
        Ok(Draft::Appended(record))
    }

    async fn invite<S>(
        &mut self,
        pos: Position,
        author: &FeedId,
        participants: &[FeedId],
        state: &SocialState,
        store: &S,
    ) -> Result<Draft, GenError>
    where
        S: FeedStore<Content> + ?Sized,
    {
        let groups: Vec<GroupId> = state.groups(author).iter().cloned().collect();
        if groups.is_empty() {
            return self.direct(pos, author, participants, state);
        }
        let group = self.sampler.uniform_sample(&groups)?.clone();

        let members = state.members_of(&group);
        let outsiders = participants
            .iter()
            .filter(|p| !members.contains(p))
            .count();
        if outsiders == 0 {
            return self.direct(pos, author, participants, state);
        }

        let count = self
            .sampler
            .random_int(1, outsiders.min(self.freq.max_invitees));
        let picked = self.sampler.pareto_sample_many(
            participants,
            members.len() + count,
            members.clone(),
            self.freq.recipient_shape,
            0,
        )?;
        let invitees = picked[members.len()..].to_vec();
        let text = Some(self.lorem.sentence(&mut self.sampler));

        let content = Content::GroupAddMember(GroupAddMember::new(group.clone(), &invitees, text));
        let record = store.invite_to_group(&group, author, &invitees, content).await?;
        for invitee in &invitees {
            store.replicate(author, invitee).await?;
        }

        debug!("{} invited {} to {}", author, invitees.len(), group);
        Ok(Draft::Appended(record))
    }

    fn group_message(
        &mut self,
        pos: Position,
        author: &FeedId,
        participants: &[FeedId],
        state: &SocialState,
    ) -> Result<Draft, GenError> {
        let groups: Vec<GroupId> = state.groups(author).iter().cloned().collect();
        if groups.is_empty() {
            return self.direct(pos, author, participants, state);
        }
        let group = self.sampler.uniform_sample(&groups)?.clone();
        let post = self.post(pos, state, participants, Visibility::Private)?;

        debug!("group message from {} to {}", author, group);
        Ok(Draft::Content(Content::Private(PrivatePost {
            post,
            recps: vec![Recipient::Group(group)],
        })))
    }
}
