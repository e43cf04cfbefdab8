//! Core types for the chat stream.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// Identifier of a chat message, unique within one stream.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        MessageId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        MessageId(s)
    }
}

/// Milliseconds on a stream's clock.
///
/// The clock origin is chosen by whoever drives the stream: the threaded
/// runner counts from its own start, tests start at zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn from_duration(d: Duration) -> Self {
        Millis(d.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Time left until `deadline`, zero if it already passed.
    pub fn until(self, deadline: Millis) -> Duration {
        Duration::from_millis(deadline.0.saturating_sub(self.0))
    }
}

impl Add<Duration> for Millis {
    type Output = Millis;

    fn add(self, rhs: Duration) -> Millis {
        Millis(self.0.saturating_add(Millis::from_duration(rhs).0))
    }
}

impl fmt::Debug for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Chat platform a message came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Discord,
    Youtube,
    Twitch,
    Test,
    /// A platform this client does not know about yet.
    Unknown(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Discord => "discord",
            Source::Youtube => "youtube",
            Source::Twitch => "twitch",
            Source::Test => "test_source",
            Source::Unknown(name) => name,
        }
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        match s.as_str() {
            "discord" => Source::Discord,
            "youtube" => Source::Youtube,
            "twitch" => Source::Twitch,
            "test_source" | "test" => Source::Test,
            _ => Source::Unknown(s),
        }
    }
}

impl From<Source> for String {
    fn from(s: Source) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message author as shown next to the message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub color: String,
}

/// One piece of a message body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WirePart", into = "WirePart")]
pub enum MessagePart {
    Text(String),
    Styled { content: String, color: String },
    /// An emoji image. `content` is whatever text the backend sent
    /// alongside it, kept so frames re-encode unchanged.
    Emoji {
        content: String,
        alt: String,
        resource_id: String,
    },
}

impl MessagePart {
    pub fn text(content: impl Into<String>) -> Self {
        MessagePart::Text(content.into())
    }

    pub fn styled(content: impl Into<String>, color: impl Into<String>) -> Self {
        MessagePart::Styled {
            content: content.into(),
            color: color.into(),
        }
    }

    pub fn emoji(alt: impl Into<String>, resource_id: impl Into<String>) -> Self {
        MessagePart::Emoji {
            content: String::new(),
            alt: alt.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// Part layout as sent by the chat backend: a content string with optional
/// `format` or `emoji` objects. An emoji wins over formatting.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct WirePart {
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<WireFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    emoji: Option<WireEmoji>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct WireFormat {
    #[serde(default)]
    color: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct WireEmoji {
    #[serde(default)]
    id: String,
    #[serde(default)]
    alt: String,
}

impl From<WirePart> for MessagePart {
    fn from(part: WirePart) -> Self {
        match (part.emoji, part.format) {
            (Some(emoji), _) => MessagePart::Emoji {
                content: part.content,
                alt: emoji.alt,
                resource_id: emoji.id,
            },
            (None, Some(format)) => MessagePart::Styled {
                content: part.content,
                color: format.color,
            },
            (None, None) => MessagePart::Text(part.content),
        }
    }
}

impl From<MessagePart> for WirePart {
    fn from(part: MessagePart) -> Self {
        match part {
            MessagePart::Text(content) => WirePart {
                content,
                ..Default::default()
            },
            MessagePart::Styled { content, color } => WirePart {
                content,
                format: Some(WireFormat { color }),
                emoji: None,
            },
            MessagePart::Emoji {
                content,
                alt,
                resource_id,
            } => WirePart {
                content,
                format: None,
                emoji: Some(WireEmoji { id: resource_id, alt }),
            },
        }
    }
}

/// A chat message. Immutable once received; an edit replaces it wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub source: Source,
    pub id: MessageId,
    pub author: Author,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub message_parts: Vec<MessagePart>,
}

impl Message {
    /// Create a plain-text message.
    pub fn text(
        source: Source,
        id: impl Into<MessageId>,
        username: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source,
            id: id.into(),
            author: Author {
                username: username.into(),
                ..Default::default()
            },
            attachments: Vec::new(),
            message_parts: vec![MessagePart::text(content)],
        }
    }

    /// Replace the author.
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = author;
        self
    }

    /// Replace the attachments.
    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Replace the body.
    pub fn with_parts(mut self, parts: Vec<MessagePart>) -> Self {
        self.message_parts = parts;
        self
    }
}

/// Kind of mutation carried by a [`MessageUpdate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    New,
    Edit,
    Delete,
}

impl UpdateKind {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "new" => Some(UpdateKind::New),
            "edit" => Some(UpdateKind::Edit),
            "delete" => Some(UpdateKind::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateKind::New => "new",
            UpdateKind::Edit => "edit",
            UpdateKind::Delete => "delete",
        }
    }
}

/// A single mutation event delivered by a connection adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageUpdate {
    #[serde(rename = "update")]
    pub kind: UpdateKind,
    pub message: Message,
}

impl MessageUpdate {
    pub fn new(message: Message) -> Self {
        Self {
            kind: UpdateKind::New,
            message,
        }
    }

    pub fn edit(message: Message) -> Self {
        Self {
            kind: UpdateKind::Edit,
            message,
        }
    }

    pub fn delete(message: Message) -> Self {
        Self {
            kind: UpdateKind::Delete,
            message,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.message.id
    }
}
