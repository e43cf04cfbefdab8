//! Row view model for rendering entries.
//!
//! Turns a [`DisplayEntry`] into what a chat overlay row shows: platform
//! icon, author badge, author name, and either the message body or a
//! "(deleted)" placeholder, plus the transition state to style with.

use crate::buffer::{DisplayEntry, Phase};
use crate::types::{MessagePart, Source};
use serde::Serialize;

/// Transition state to style a row with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    Init,
    Loaded,
    Removed,
    Deleted,
}

impl VisualState {
    /// Init wins over everything, a requested delete over fading.
    pub fn of(entry: &DisplayEntry) -> Self {
        match entry.phase {
            Phase::Init => VisualState::Init,
            _ if entry.delete_requested => VisualState::Deleted,
            Phase::Removing | Phase::Deleted => VisualState::Removed,
            Phase::Loaded => VisualState::Loaded,
        }
    }
}

/// Badge shown before the author name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorBadge {
    Bot,
    Admin,
}

/// Row body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowBody {
    /// Content was deleted and must not be shown.
    Hidden,
    Parts {
        edited: bool,
        parts: Vec<MessagePart>,
    },
}

/// Everything a UI needs to paint one entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub id: String,
    pub source_icon: &'static str,
    pub badge: Option<AuthorBadge>,
    pub author: String,
    pub author_color: String,
    pub body: RowBody,
    pub attachments: Vec<String>,
    pub state: VisualState,
}

/// Icon path for a platform.
pub fn source_icon(source: &Source) -> &'static str {
    match source {
        Source::Discord => "/discord.svg",
        Source::Youtube => "/youtube.svg",
        Source::Twitch => "/twitch.svg",
        Source::Test | Source::Unknown(_) => "/analog.svg",
    }
}

impl RowView {
    pub fn from_entry(entry: &DisplayEntry) -> Self {
        let message = &entry.message;

        let badge = if message.author.is_bot {
            Some(AuthorBadge::Bot)
        } else if message.author.is_admin {
            Some(AuthorBadge::Admin)
        } else {
            None
        };

        let body = if entry.is_hidden() {
            RowBody::Hidden
        } else {
            RowBody::Parts {
                edited: entry.edited,
                parts: message.message_parts.clone(),
            }
        };

        Self {
            id: message.id.to_string(),
            source_icon: source_icon(&message.source),
            badge,
            author: message.author.username.clone(),
            author_color: message.author.color.clone(),
            attachments: if entry.is_hidden() {
                Vec::new()
            } else {
                message.attachments.clone()
            },
            body,
            state: VisualState::of(entry),
        }
    }

    /// One-line text rendering, e.g. `[bot] ana: hi :wave:`.
    pub fn to_plain_text(&self) -> String {
        let mut line = String::new();

        match self.badge {
            Some(AuthorBadge::Bot) => line.push_str("[bot] "),
            Some(AuthorBadge::Admin) => line.push_str("[admin] "),
            None => {}
        }
        line.push_str(&self.author);
        line.push_str(": ");

        match &self.body {
            RowBody::Hidden => line.push_str("(deleted)"),
            RowBody::Parts { edited, parts } => {
                if *edited {
                    line.push_str("(edited) ");
                }
                for part in parts {
                    match part {
                        MessagePart::Text(content) => line.push_str(content),
                        MessagePart::Styled { content, .. } => line.push_str(content),
                        MessagePart::Emoji { alt, .. } => line.push_str(alt),
                    }
                }
            }
        }

        line
    }
}

/// Project a whole list of entries, oldest first.
pub fn rows<'a>(entries: impl IntoIterator<Item = &'a DisplayEntry>) -> Vec<RowView> {
    entries.into_iter().map(RowView::from_entry).collect()
}
