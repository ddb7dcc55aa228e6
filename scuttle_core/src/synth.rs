//! Content synthesizers.
//!
//! Each synthesizer reads the social state and draws from the run's sampler.
//! None of them mutates state: the caller appends the payload and folds the
//! resulting record back in.

use crate::content::{
    AboutContent, AboutImage, ContactContent, ContentKind, ImageBlob, Mention, PostContent,
    Relation, Vote, VoteContent, LATEST_MARKER, OLDEST_MARKER,
};
use crate::error::GenError;
use crate::frequencies::{AboutImageShape, ContactSubtype, Frequencies, MentionKind, PostSize};
use crate::lorem::Lorem;
use crate::sample::Sampler;
use crate::state::SocialState;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use scuttle_env::FeedId;
use tracing::debug;

/// Expression tag every vote carries.
pub const VOTE_EXPRESSION: &str = "y";

/// Where a message sits in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 0-based index of the message
    pub index: usize,

    /// Forced-last index
    pub last: usize,
}

impl Position {
    pub fn new(index: usize, last: usize) -> Self {
        Self { index, last }
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index == self.last
    }

    /// First or forced-last: always a public post by the primary participant.
    pub fn is_anchor(&self) -> bool {
        self.is_first() || self.is_last()
    }
}

/// Whether a post goes to the public log or inside a private envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// The content engine of one run: its sampler, its tuned constants and
/// its text source.
#[derive(Debug, Clone)]
pub struct Generator {
    pub(crate) sampler: Sampler,
    pub(crate) freq: Frequencies,
    pub(crate) lorem: Lorem,
}

impl Generator {
    /// Creates a generator at sampler call zero.
    pub fn new(seed: impl Into<String>, freq: Frequencies) -> Self {
        Self {
            sampler: Sampler::new(seed),
            freq,
            lorem: Lorem::default(),
        }
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn frequencies(&self) -> &Frequencies {
        &self.freq
    }

    /// Synthetic content-addressed blob id.
    ///
    /// Nine generated words, non-word characters stripped, copied into a
    /// zeroed 32-byte buffer.
    pub fn blob_id(&mut self) -> String {
        let words = self.lorem.words(&mut self.sampler, 9);
        let stripped: String = words
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        let mut buf = [0u8; 32];
        let bytes = stripped.as_bytes();
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);

        format!("&{}.sha256", STANDARD.encode(buf))
    }

    /// One to three mentions of authors, blobs or channels.
    pub fn mentions(&mut self, participants: &[FeedId]) -> Result<Vec<Mention>, GenError> {
        let count = self.sampler.random_int(1, 3);
        let mut mentions = Vec::with_capacity(count);

        for _ in 0..count {
            let mention = match self.sampler.sample_weighted(&self.freq.mention_kinds)? {
                MentionKind::Author => {
                    let link = self
                        .sampler
                        .pareto_sample(participants, self.freq.author_shape, 0)?
                        .clone();
                    let n = self.sampler.random_int(1, 3);
                    Mention::Author {
                        link,
                        name: self.lorem.words(&mut self.sampler, n),
                    }
                }
                MentionKind::Blob => {
                    let link = self.blob_id();
                    let mime = self.sampler.sample_weighted(&self.freq.blob_types)?;
                    let size = (self.sampler.somewhat_gaussian() * 2e6).round() as u64;
                    let name = if self.sampler.chance(self.freq.mention_blob_name) {
                        let n = self.sampler.random_int(1, 3);
                        Some(self.lorem.words(&mut self.sampler, n))
                    } else {
                        None
                    };
                    Mention::Blob { link, mime, size, name }
                }
                MentionKind::Channel => Mention::Channel {
                    link: format!("#{}", self.lorem.word(&mut self.sampler)),
                },
            };
            mentions.push(mention);
        }
        Ok(mentions)
    }

    /// A post: sized text, anchor markers, optional channel, reply pointers
    /// (public only) and mentions.
    pub fn post(
        &mut self,
        pos: Position,
        state: &SocialState,
        participants: &[FeedId],
        visibility: Visibility,
    ) -> Result<PostContent, GenError> {
        let size = self.sampler.sample_weighted(&self.freq.post_sizes)?;
        let n = self.sampler.random_int(1, 5);
        let mut text = match size {
            PostSize::Short => self.lorem.words(&mut self.sampler, n),
            PostSize::Medium => self.lorem.sentences(&mut self.sampler, n),
            PostSize::Long => self.lorem.paragraphs(&mut self.sampler, n),
        };

        if pos.is_first() {
            text = format!("{}{}", OLDEST_MARKER, text);
        }
        if pos.is_last() {
            text = format!("{}{}", LATEST_MARKER, text);
        }

        let mut post = PostContent {
            text,
            ..Default::default()
        };

        if self.sampler.chance(self.freq.post_channel) {
            post.channel = Some(self.lorem.word(&mut self.sampler).to_string());
        }

        let posts = state.messages_of(ContentKind::Post);
        if visibility == Visibility::Public
            && !pos.is_last()
            && posts.len() >= 2
            && posts.len() > self.freq.reply_min_index
            && self.sampler.chance(self.freq.post_reply)
        {
            let other = self.sampler.pareto_sample(
                posts,
                self.freq.reply_shape,
                self.freq.reply_min_index,
            )?;
            let parent = other
                .content()
                .as_post()
                .ok_or(GenError::NoPriorPost("reply to"))?;

            match &parent.root {
                Some(root) => {
                    if self.sampler.chance(self.freq.post_reply_fork) {
                        post.root = Some(other.key.clone());
                        post.branch = Some(other.key.clone());
                        post.fork = Some(root.clone());
                    } else {
                        post.root = Some(root.clone());
                        post.branch = Some(other.key.clone());
                    }
                }
                None => {
                    post.root = Some(other.key.clone());
                    post.branch = Some(other.key.clone());
                }
            }
        }

        if self.sampler.chance(self.freq.post_mentions) {
            post.mentions = Some(self.mentions(participants)?);
        }

        debug!(
            "post #{} ({:?}, reply: {}, fork: {})",
            pos.index,
            size,
            post.is_reply(),
            post.fork.is_some()
        );
        Ok(post)
    }

    /// A vote on a prior post.
    pub fn vote(&mut self, state: &SocialState) -> Result<VoteContent, GenError> {
        let posts = state.messages_of(ContentKind::Post);
        if posts.is_empty() {
            return Err(GenError::NoPriorPost("vote on"));
        }
        let target = self.sampler.pareto_sample(posts, self.freq.vote_shape, 0)?;
        let value = if self.sampler.chance(self.freq.vote_negative) {
            -1
        } else {
            1
        };

        debug!("vote {} on {}", value, target.key);
        Ok(VoteContent {
            vote: Vote {
                link: target.key.clone(),
                value,
                expression: VOTE_EXPRESSION.to_string(),
            },
        })
    }

    /// A follow, unfollow, block or unblock.
    ///
    /// Unfollow and unblock always target an existing relationship; with
    /// none to undo they become follow and block.
    pub fn contact(
        &mut self,
        author: &FeedId,
        participants: &[FeedId],
        state: &SocialState,
    ) -> Result<ContactContent, GenError> {
        let mut target = loop {
            let candidate = self
                .sampler
                .pareto_sample(participants, self.freq.contact_shape, 0)?;
            if candidate != author || participants.len() <= 1 {
                break candidate.clone();
            }
        };

        let mut subtype = self.sampler.sample_weighted(&self.freq.contact_types)?;
        match subtype {
            ContactSubtype::Unfollow => {
                let follows: Vec<FeedId> = state.follows(author).iter().cloned().collect();
                if follows.is_empty() {
                    subtype = ContactSubtype::Follow;
                } else {
                    target = self.sampler.uniform_sample(&follows)?.clone();
                }
            }
            ContactSubtype::Unblock => {
                let blocks: Vec<FeedId> = state.blocks(author).iter().cloned().collect();
                if blocks.is_empty() {
                    subtype = ContactSubtype::Block;
                } else {
                    target = self.sampler.uniform_sample(&blocks)?.clone();
                }
            }
            ContactSubtype::Follow | ContactSubtype::Block => {}
        }

        let relation = match subtype {
            ContactSubtype::Follow => Relation::Following(true),
            ContactSubtype::Unfollow => Relation::Following(false),
            ContactSubtype::Block => Relation::Blocking(true),
            ContactSubtype::Unblock => Relation::Blocking(false),
        };

        debug!("contact {} -> {} ({:?})", author, target, relation);
        Ok(ContactContent::new(target, relation))
    }

    /// A profile update about the author, or occasionally someone else.
    pub fn about(
        &mut self,
        author: &FeedId,
        participants: &[FeedId],
    ) -> Result<AboutContent, GenError> {
        let subject = if self.sampler.chance(self.freq.about_other) {
            let others: Vec<FeedId> = participants
                .iter()
                .filter(|p| *p != author)
                .cloned()
                .collect();
            if others.is_empty() {
                author.clone()
            } else {
                self.sampler.uniform_sample(&others)?.clone()
            }
        } else {
            author.clone()
        };

        let subtype = self.sampler.sample_weighted(&self.freq.about_types)?;
        let mut about = AboutContent {
            about: subject,
            name: None,
            image: None,
            description: None,
        };

        if subtype.has_name() {
            let n = self.sampler.random_int(1, 3);
            about.name = Some(self.lorem.words(&mut self.sampler, n));
        }
        if subtype.has_image() {
            about.image = Some(self.about_image()?);
        }
        if subtype.has_description() {
            let n = self.sampler.random_int(1, 5);
            about.description = Some(self.lorem.sentences(&mut self.sampler, n));
        }

        debug!("about {} ({:?})", about.about, subtype);
        Ok(about)
    }

    fn about_image(&mut self) -> Result<AboutImage, GenError> {
        let shape = self.sampler.sample_weighted(&self.freq.about_image_shapes)?;
        let image = match shape {
            AboutImageShape::String => AboutImage::Link(self.blob_id()),
            AboutImageShape::SmallObject => AboutImage::Blob(ImageBlob {
                link: self.blob_id(),
                mime: None,
                size: None,
                width: None,
                height: None,
            }),
            AboutImageShape::BigObject => {
                let link = self.blob_id();
                let mime = self.sampler.sample_weighted(&self.freq.blob_image_types)?;
                AboutImage::Blob(ImageBlob {
                    link,
                    mime: Some(mime),
                    size: Some((self.sampler.somewhat_gaussian() * 2e6).round() as u64),
                    width: Some((self.sampler.somewhat_gaussian() * 1600.0).round() as u64),
                    height: Some((self.sampler.somewhat_gaussian() * 1600.0).round() as u64),
                })
            }
        };
        Ok(image)
    }

    /// Recipients of a direct message: the author first, then distinct
    /// recency-biased picks up to a drawn size.
    pub fn recipients(
        &mut self,
        author: &FeedId,
        participants: &[FeedId],
    ) -> Result<Vec<FeedId>, GenError> {
        if participants.len() <= 1 {
            return Ok(vec![author.clone()]);
        }
        let cap = (participants.len() - 1).min(self.freq.max_recipients);
        let quantity = self.sampler.random_int(1, cap);
        self.sampler.pareto_sample_many(
            participants,
            quantity,
            vec![author.clone()],
            self.freq.recipient_shape,
            0,
        )
    }
}
