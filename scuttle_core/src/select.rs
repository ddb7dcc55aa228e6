//! Participant selection and the per-position message-type decision.

use crate::content::{Content, ContentKind};
use crate::error::GenError;
use crate::state::SocialState;
use crate::synth::{Generator, Position, Visibility};
use scuttle_env::{FeedId, FeedStore, Record};
use tracing::debug;

/// Outcome of one synthesis step.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    /// Payload still to be appended by the caller
    Content(Content),

    /// Control record the store already appended (group operations)
    Appended(Record<Content>),
}

impl Draft {
    pub fn kind(&self) -> ContentKind {
        match self {
            Draft::Content(content) => content.kind(),
            Draft::Appended(record) => record.content().kind(),
        }
    }
}

impl Generator {
    /// Author of the message at `pos`.
    ///
    /// The biased draw always happens so the sampler stream does not depend
    /// on the position; anchors then override it with the primary
    /// participant.
    pub fn pick_author<'a>(
        &mut self,
        pos: Position,
        participants: &'a [FeedId],
    ) -> Result<&'a FeedId, GenError> {
        if participants.is_empty() {
            return Err(GenError::NoParticipants);
        }
        let drawn = self
            .sampler
            .pareto_sample(participants, self.freq.author_shape, 0)?;
        if pos.is_anchor() {
            Ok(&participants[0])
        } else {
            Ok(drawn)
        }
    }

    /// Chooses and synthesizes the content for `pos`.
    ///
    /// The kind is drawn before the anchor check, so every position consumes
    /// the same draw. Anchors are public posts; a vote with nothing to vote
    /// on becomes a post.
    pub async fn next_content<S>(
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
        let kind = self.sampler.sample_weighted(&self.freq.msg_types)?;

        if pos.is_anchor() {
            return self.public_post(pos, state, participants);
        }

        let draft = match kind {
            ContentKind::Vote if !state.messages_of(ContentKind::Post).is_empty() => {
                Draft::Content(Content::Vote(self.vote(state)?))
            }
            ContentKind::Contact => {
                Draft::Content(Content::Contact(self.contact(author, participants, state)?))
            }
            ContentKind::About => Draft::Content(Content::About(self.about(author, participants)?)),
            ContentKind::Private => {
                self.private(pos, author, participants, state, store).await?
            }
            ContentKind::Post | ContentKind::Vote => {
                return self.public_post(pos, state, participants);
            }
        };

        debug!("#{} drew {} -> {}", pos.index, kind, draft.kind());
        Ok(draft)
    }

    fn public_post(
        &mut self,
        pos: Position,
        state: &SocialState,
        participants: &[FeedId],
    ) -> Result<Draft, GenError> {
        let post = self.post(pos, state, participants, Visibility::Public)?;
        Ok(Draft::Content(Content::Post(post)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{LATEST_MARKER, OLDEST_MARKER};
    use crate::frequencies::Frequencies;
    use crate::testing::{participants, TestStore};

    /// Drives `messages` positions with the forced-last index at `last`.
    async fn run(
        seed: &str,
        messages: usize,
        last: usize,
        authors: &[FeedId],
        freq: Frequencies,
    ) -> Vec<Record<Content>> {
        let store = TestStore::new();
        let mut state = SocialState::new(authors);
        let mut gen = Generator::new(seed, freq);
        let mut log = Vec::new();

        for index in 0..messages {
            let pos = Position::new(index, last);
            let author = gen.pick_author(pos, authors).unwrap().clone();
            let draft = gen
                .next_content(pos, &author, authors, &state, &store)
                .await
                .unwrap();
            let record = match draft {
                Draft::Content(content) => store.append(&author, content).await.unwrap(),
                Draft::Appended(record) => record,
            };
            state.fold(&record);
            log.push(record);
        }
        log
    }

    fn contents(log: &[Record<Content>]) -> Vec<(FeedId, Content)> {
        log.iter()
            .map(|r| (r.author().clone(), r.content().clone()))
            .collect()
    }

    #[test]
    fn test_pick_author_pins_anchors() {
        let authors = participants(10);
        let mut gen = Generator::new("authors", Frequencies::default());

        assert_eq!(gen.pick_author(Position::new(0, 5), &authors).unwrap(), &authors[0]);
        assert_eq!(gen.pick_author(Position::new(5, 5), &authors).unwrap(), &authors[0]);
        assert_eq!(gen.sampler().calls(), 2);
    }

    #[test]
    fn test_pick_author_requires_participants() {
        let mut gen = Generator::new("none", Frequencies::default());
        assert!(matches!(
            gen.pick_author(Position::new(1, 5), &[]),
            Err(GenError::NoParticipants)
        ));
    }

    #[tokio::test]
    async fn test_anchors_are_public_posts() {
        let authors = participants(4);
        let log = run("anchors", 30, 29, &authors, Frequencies::default()).await;

        let first = log[0].content().as_post().unwrap();
        let last = log[29].content().as_post().unwrap();
        assert!(first.text.starts_with(OLDEST_MARKER));
        assert!(last.text.starts_with(LATEST_MARKER));
        assert_eq!(log[0].author(), &authors[0]);
        assert_eq!(log[29].author(), &authors[0]);
    }

    #[tokio::test]
    async fn test_same_seed_same_contents() {
        let authors = participants(5);
        let a = run("deterministic", 60, 59, &authors, Frequencies::default()).await;
        let b = run("deterministic", 60, 59, &authors, Frequencies::default()).await;
        assert_eq!(contents(&a), contents(&b));

        let c = run("other", 60, 59, &authors, Frequencies::default()).await;
        assert_ne!(contents(&a), contents(&c));
    }

    #[tokio::test]
    async fn test_three_messages_two_participants() {
        let authors = participants(2);
        let log = run("deterministic", 3, 2, &authors, Frequencies::default()).await;

        assert_eq!(log.len(), 3);
        assert_eq!(log[0].author(), &authors[0]);
        assert!(log[0].content().as_post().is_some());
        assert_eq!(log[2].author(), &authors[0]);
        assert!(log[2].content().as_post().unwrap().text.starts_with("LATESTMSG"));
    }

    #[tokio::test]
    async fn test_vote_without_posts_becomes_post() {
        let authors = participants(3);
        let state = SocialState::new(&authors);
        let store = TestStore::new();
        let freq = Frequencies::default().only_kinds(&[ContentKind::Vote]);

        for seed in ["food", "empty", "no-target"] {
            let mut gen = Generator::new(seed, freq.clone());
            let draft = gen
                .next_content(Position::new(1, 5), &authors[1], &authors, &state, &store)
                .await
                .unwrap();
            match draft {
                Draft::Content(Content::Post(post)) => assert!(!post.is_reply()),
                other => panic!("expected a post, got {:?}", other.kind()),
            }
        }
        assert!(store.log().is_empty());
    }

    #[tokio::test]
    async fn test_vote_only_table_votes_after_the_first_post() {
        let authors = participants(1);
        let freq = Frequencies::default().only_kinds(&[ContentKind::Vote]);
        let log = run("food", 8, 7, &authors, freq).await;

        assert!(log[0].content().as_post().is_some());
        assert!(log[1..7]
            .iter()
            .all(|r| matches!(r.content(), Content::Vote(_))));
    }

    #[tokio::test]
    async fn test_votes_reference_earlier_posts() {
        let authors = participants(6);
        let log = run("integrity", 200, 199, &authors, Frequencies::default()).await;

        for (i, record) in log.iter().enumerate() {
            if let Content::Vote(vote) = record.content() {
                assert!(log[..i]
                    .iter()
                    .any(|r| r.key == vote.vote.link && r.content().as_post().is_some()));
            }
            if let Some(post) = record.content().as_post() {
                for target in post.root.iter().chain(post.branch.iter()) {
                    assert!(log[..i].iter().any(|r| &r.key == target));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_extension_reproduces_prefix() {
        let authors = participants(2);
        let fresh = run("deterministic", 3, 2, &authors, Frequencies::default()).await;
        let extended = run("deterministic", 5, 2, &authors, Frequencies::default()).await;

        assert_eq!(contents(&fresh), contents(&extended[..3]));
        assert_eq!(extended.len(), 5);
    }
}
