//! Tuned frequencies and shape constants for content synthesis.
//!
//! These are hand-picked approximations, not fitted to real networks. They
//! are configuration: a JSON document deserialized into [`Frequencies`]
//! overrides any subset of them.

use crate::content::ContentKind;
use serde::{Deserialize, Serialize};

/// Weighted categorical table: `(label, weight)` pairs in draw order.
///
/// Weights are non-negative and need not sum to one.
pub type WeightTable<K> = Vec<(K, f64)>;

/// Approximate size of a post's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSize {
    Short,
    Medium,
    Long,
}

/// What a post mention points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Author,
    Blob,
    Channel,
}

/// Relationship change carried by a contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSubtype {
    Follow,
    Unfollow,
    Block,
    Unblock,
}

/// Which profile fields an about record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AboutSubtype {
    Name,
    Image,
    Description,
    NameAndImage,
    NameAndDescription,
    ImageAndDescription,
    NameAndImageAndDescription,
}

impl AboutSubtype {
    pub fn has_name(self) -> bool {
        matches!(
            self,
            Self::Name | Self::NameAndImage | Self::NameAndDescription | Self::NameAndImageAndDescription
        )
    }

    pub fn has_image(self) -> bool {
        matches!(
            self,
            Self::Image | Self::NameAndImage | Self::ImageAndDescription | Self::NameAndImageAndDescription
        )
    }

    pub fn has_description(self) -> bool {
        matches!(
            self,
            Self::Description
                | Self::NameAndDescription
                | Self::ImageAndDescription
                | Self::NameAndImageAndDescription
        )
    }
}

/// Shape of an about record's image field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AboutImageShape {
    /// Bare blob id string
    String,
    /// `{ link }`
    SmallObject,
    /// `{ link, type, size, width, height }`
    BigObject,
}

/// Kind of private activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateSubtype {
    Direct,
    GroupCreation,
    GroupInvitation,
    GroupMessage,
}

/// Every tuned constant of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frequencies {
    /// Message types. Raw counts from a survey of a real network.
    pub msg_types: WeightTable<ContentKind>,

    pub post_sizes: WeightTable<PostSize>,

    /// Probability of a post carrying a `channel`
    pub post_channel: f64,

    /// Probability of a post carrying `mentions`
    pub post_mentions: f64,

    pub mention_kinds: WeightTable<MentionKind>,

    /// Probability of a blob mention carrying a `name`
    pub mention_blob_name: f64,

    /// Probability of a post replying to an earlier post
    pub post_reply: f64,

    /// Probability of a reply to a reply forking the thread
    pub post_reply_fork: f64,

    /// Probability of a vote being negative
    pub vote_negative: f64,

    pub contact_types: WeightTable<ContactSubtype>,

    pub blob_types: WeightTable<String>,

    /// Probability of an about record describing someone else
    pub about_other: f64,

    pub about_types: WeightTable<AboutSubtype>,

    pub about_image_shapes: WeightTable<AboutImageShape>,

    pub blob_image_types: WeightTable<String>,

    pub private_types: WeightTable<PrivateSubtype>,

    /// Recency-bias shape for author selection and mentioned authors
    pub author_shape: f64,

    /// Recency-bias shape and floor for reply targets
    pub reply_shape: f64,
    pub reply_min_index: usize,

    /// Recency-bias shape for vote targets
    pub vote_shape: f64,

    /// Recency-bias shape for contact targets
    pub contact_shape: f64,

    /// Recency-bias shape for private recipients and group invitees
    pub recipient_shape: f64,

    /// Largest direct-message recipient list, author included
    pub max_recipients: usize,

    /// Largest number of participants invited at once
    pub max_invitees: usize,
}

impl Default for Frequencies {
    fn default() -> Self {
        Self {
            msg_types: vec![
                (ContentKind::Vote, 269447.0),
                (ContentKind::Post, 173264.0),
                (ContentKind::Contact, 167326.0),
                (ContentKind::Private, 93208.0),
                (ContentKind::About, 33476.0),
            ],
            post_sizes: vec![
                (PostSize::Short, 0.25),
                (PostSize::Medium, 0.4),
                (PostSize::Long, 0.35),
            ],
            post_channel: 0.3,
            post_mentions: 0.6,
            mention_kinds: vec![
                (MentionKind::Author, 0.6),
                (MentionKind::Blob, 0.3),
                (MentionKind::Channel, 0.1),
            ],
            mention_blob_name: 0.2,
            post_reply: 0.7,
            post_reply_fork: 0.7,
            vote_negative: 0.05,
            contact_types: vec![
                (ContactSubtype::Follow, 0.7),
                (ContactSubtype::Unfollow, 0.1),
                (ContactSubtype::Block, 0.15),
                (ContactSubtype::Unblock, 0.05),
            ],
            blob_types: vec![
                ("image/jpeg".to_string(), 0.5),
                ("image/png".to_string(), 0.5),
            ],
            about_other: 0.1,
            about_types: vec![
                (AboutSubtype::Name, 0.3),
                (AboutSubtype::Image, 0.2),
                (AboutSubtype::Description, 0.1),
                (AboutSubtype::NameAndImage, 0.2),
                (AboutSubtype::NameAndDescription, 0.05),
                (AboutSubtype::ImageAndDescription, 0.05),
                (AboutSubtype::NameAndImageAndDescription, 0.1),
            ],
            about_image_shapes: vec![
                (AboutImageShape::String, 0.3),
                (AboutImageShape::SmallObject, 0.3),
                (AboutImageShape::BigObject, 0.4),
            ],
            blob_image_types: vec![
                ("image/jpeg".to_string(), 0.5),
                ("image/png".to_string(), 0.4),
                ("image/gif".to_string(), 0.1),
            ],
            private_types: vec![
                (PrivateSubtype::Direct, 0.6),
                (PrivateSubtype::GroupCreation, 0.1),
                (PrivateSubtype::GroupInvitation, 0.15),
                (PrivateSubtype::GroupMessage, 0.15),
            ],
            author_shape: 2.0,
            reply_shape: 1.6,
            reply_min_index: 1,
            vote_shape: 2.0,
            contact_shape: 2.0,
            recipient_shape: 2.0,
            max_recipients: 7,
            max_invitees: 3,
        }
    }
}

impl Frequencies {
    /// Parses overrides from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Table with only the given kinds kept, weights unchanged.
    ///
    /// Handy for forcing a content kind in tests.
    pub fn only_kinds(mut self, kinds: &[ContentKind]) -> Self {
        self.msg_types.retain(|(kind, _)| kinds.contains(kind));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_subtypes_cover_all_combinations() {
        let all = [
            AboutSubtype::Name,
            AboutSubtype::Image,
            AboutSubtype::Description,
            AboutSubtype::NameAndImage,
            AboutSubtype::NameAndDescription,
            AboutSubtype::ImageAndDescription,
            AboutSubtype::NameAndImageAndDescription,
        ];
        let mut seen: Vec<(bool, bool, bool)> = all
            .iter()
            .map(|s| (s.has_name(), s.has_image(), s.has_description()))
            .collect();
        seen.sort();
        seen.dedup();

        assert_eq!(seen.len(), 7);
        assert!(!seen.contains(&(false, false, false)));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let freq = Frequencies::from_json(r#"{ "post_reply": 0.0, "max_recipients": 3 }"#).unwrap();

        assert_eq!(freq.post_reply, 0.0);
        assert_eq!(freq.max_recipients, 3);
        assert_eq!(freq.post_channel, Frequencies::default().post_channel);
        assert_eq!(freq.msg_types.len(), 5);
    }

    #[test]
    fn test_table_override() {
        let freq = Frequencies::from_json(r#"{ "msg_types": [["about", 1], ["post", 2]] }"#).unwrap();
        assert_eq!(
            freq.msg_types,
            vec![(ContentKind::About, 1.0), (ContentKind::Post, 2.0)]
        );
    }
}
