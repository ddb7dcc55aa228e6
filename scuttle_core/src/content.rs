//! Content payloads: the unsigned data a record will carry.
//!
//! One variant per content kind, each with its own field set. The wire
//! shape follows the familiar `{ "type": ..., ...fields }` layout.

use scuttle_env::{FeedId, GroupId, MsgKey, GROUP_ID_SUFFIX};
use serde::{Deserialize, Serialize};

/// Literal prefix of the first generated post.
pub const OLDEST_MARKER: &str = "OLDESTMSG ";

/// Literal prefix of the forced-last generated post.
pub const LATEST_MARKER: &str = "LATESTMSG ";

/// Bucket a record is indexed under for targeting and reporting.
///
/// Every private payload (direct, group message, group control) shares the
/// `Private` bucket regardless of its inner shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Vote,
    Contact,
    About,
    Private,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Vote => "vote",
            ContentKind::Contact => "contact",
            ContentKind::About => "about",
            ContentKind::Private => "private",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A content payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "post")]
    Post(PostContent),

    #[serde(rename = "vote")]
    Vote(VoteContent),

    #[serde(rename = "contact")]
    Contact(ContactContent),

    #[serde(rename = "about")]
    About(AboutContent),

    /// Direct or group message; opaque to anyone outside `recps`
    #[serde(rename = "private")]
    Private(PrivatePost),

    #[serde(rename = "group/init")]
    GroupInit(GroupInit),

    #[serde(rename = "group/add-member")]
    GroupAddMember(GroupAddMember),
}

impl Content {
    /// Bucket this payload is indexed under.
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Post(_) => ContentKind::Post,
            Content::Vote(_) => ContentKind::Vote,
            Content::Contact(_) => ContentKind::Contact,
            Content::About(_) => ContentKind::About,
            Content::Private(_) | Content::GroupInit(_) | Content::GroupAddMember(_) => {
                ContentKind::Private
            }
        }
    }

    /// True for payloads that are encrypted at the boundary.
    pub fn is_private(&self) -> bool {
        self.kind() == ContentKind::Private
    }

    /// The public post, if this is one.
    pub fn as_post(&self) -> Option<&PostContent> {
        match self {
            Content::Post(post) => Some(post),
            _ => None,
        }
    }
}

/// A public post, also the body of private messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostContent {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channel: Option<String>,

    /// Original post of the thread
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub root: Option<MsgKey>,

    /// Immediate parent
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub branch: Option<MsgKey>,

    /// Root of the thread this reply forked away from
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fork: Option<MsgKey>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mentions: Option<Vec<Mention>>,
}

impl PostContent {
    /// True if this post replies to another.
    pub fn is_reply(&self) -> bool {
        self.root.is_some()
    }
}

/// A link embedded in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Mention {
    Blob {
        link: String,
        #[serde(rename = "type")]
        mime: String,
        size: u64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        name: Option<String>,
    },
    Author {
        link: FeedId,
        name: String,
    },
    Channel {
        link: String,
    },
}

/// A vote on an earlier post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteContent {
    pub vote: Vote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub link: MsgKey,
    /// `+1` or `-1`
    pub value: i8,
    pub expression: String,
}

/// Follow/block state change towards another participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactContent {
    pub contact: FeedId,

    #[serde(flatten)]
    pub relation: Relation,
}

/// Exactly one of `following` / `blocking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Following(bool),
    Blocking(bool),
}

impl ContactContent {
    pub fn new(contact: FeedId, relation: Relation) -> Self {
        Self { contact, relation }
    }
}

/// Profile update about a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutContent {
    pub about: FeedId,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<AboutImage>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// Profile image: a bare blob id or a blob object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AboutImage {
    Link(String),
    Blob(ImageBlob),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageBlob {
    pub link: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub mime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<u64>,
}

/// Recipient of a private payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Recipient {
    Group(GroupId),
    Feed(FeedId),
}

impl<'de> Deserialize<'de> for Recipient {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        if id.ends_with(GROUP_ID_SUFFIX) {
            Ok(Recipient::Group(GroupId::new(id)))
        } else {
            Ok(Recipient::Feed(FeedId::new(id)))
        }
    }
}

/// Post-shaped private payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivatePost {
    #[serde(flatten)]
    pub post: PostContent,

    pub recps: Vec<Recipient>,
}

impl PrivatePost {
    /// Group this message is addressed to, if any.
    pub fn group(&self) -> Option<&GroupId> {
        self.recps.iter().find_map(|r| match r {
            Recipient::Group(group) => Some(group),
            Recipient::Feed(_) => None,
        })
    }
}

/// Control record that opens a private group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInit {
    #[serde(rename = "groupId")]
    pub group_id: GroupId,
}

/// Control record that adds participants to a private group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAddMember {
    #[serde(rename = "groupId")]
    pub group_id: GroupId,

    /// The group followed by every invitee
    pub recps: Vec<Recipient>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

impl GroupAddMember {
    pub fn new(group_id: GroupId, invitees: &[FeedId], text: Option<String>) -> Self {
        let mut recps = vec![Recipient::Group(group_id.clone())];
        recps.extend(invitees.iter().cloned().map(Recipient::Feed));
        Self { group_id, recps, text }
    }

    /// Participants added by this record.
    pub fn invitees(&self) -> impl Iterator<Item = &FeedId> {
        self.recps.iter().filter_map(|r| match r {
            Recipient::Feed(feed) => Some(feed),
            Recipient::Group(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_wire_shape() {
        let content = Content::Post(PostContent {
            text: "hello".to_string(),
            channel: Some("dolor".to_string()),
            ..Default::default()
        });

        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({ "type": "post", "text": "hello", "channel": "dolor" })
        );
    }

    #[test]
    fn test_contact_carries_exactly_one_flag() {
        let content = Content::Contact(ContactContent::new(
            FeedId::new("@b.ed25519"),
            Relation::Blocking(false),
        ));

        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({ "type": "contact", "contact": "@b.ed25519", "blocking": false })
        );
    }

    #[test]
    fn test_contact_round_trip() {
        let json = r#"{"type":"contact","contact":"@b.ed25519","following":true}"#;
        let content: Content = serde_json::from_str(json).unwrap();

        match content {
            Content::Contact(c) => assert_eq!(c.relation, Relation::Following(true)),
            other => panic!("expected contact, got {:?}", other),
        }
    }

    #[test]
    fn test_private_kinds_share_bucket() {
        let group = GroupId::new("%g.cloaked");
        let direct = Content::Private(PrivatePost {
            post: PostContent::default(),
            recps: vec![Recipient::Feed(FeedId::new("@a.ed25519"))],
        });
        let init = Content::GroupInit(GroupInit { group_id: group.clone() });
        let add = Content::GroupAddMember(GroupAddMember::new(group, &[], None));

        for content in [direct, init, add] {
            assert_eq!(content.kind(), ContentKind::Private);
            assert!(content.is_private());
        }
    }

    #[test]
    fn test_group_add_member_recipients() {
        let group = GroupId::new("%g.cloaked");
        let invitees = [FeedId::new("@a.ed25519"), FeedId::new("@b.ed25519")];
        let add = GroupAddMember::new(group.clone(), &invitees, None);

        assert_eq!(add.recps[0], Recipient::Group(group));
        assert_eq!(add.invitees().cloned().collect::<Vec<_>>(), invitees.to_vec());
    }

    #[test]
    fn test_recipients_distinguish_groups_from_feeds() {
        let recps: Vec<Recipient> =
            serde_json::from_str(r#"["%g.cloaked", "@a.ed25519"]"#).unwrap();

        assert_eq!(recps[0], Recipient::Group(GroupId::new("%g.cloaked")));
        assert_eq!(recps[1], Recipient::Feed(FeedId::new("@a.ed25519")));
    }

    #[test]
    fn test_image_shapes() {
        let link = AboutImage::Link("&x.sha256".to_string());
        assert_eq!(serde_json::to_value(&link).unwrap(), json!("&x.sha256"));

        let small = AboutImage::Blob(ImageBlob {
            link: "&x.sha256".to_string(),
            ..Default::default()
        });
        assert_eq!(serde_json::to_value(&small).unwrap(), json!({ "link": "&x.sha256" }));
    }
}
