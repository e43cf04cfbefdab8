//! JSON frames exchanged with the chat backend.
//!
//! A frame is one `MessageUpdate` object:
//!
//! ```json
//! {"update": "new", "updateTime": "2024-01-01T00:00:00Z",
//!  "message": {"source": "twitch", "id": "42",
//!              "author": {"username": "ana", "isAdmin": false, "isBot": false, "color": "#fff"},
//!              "messageParts": [{"content": "hi"}], "attachments": []}}
//! ```
//!
//! Frames with an update tag this client does not understand are skipped
//! instead of failing, so one odd event never disrupts the live buffer.

use crate::error::{Result, StreamError};
use crate::types::{Message, MessageUpdate, UpdateKind};
use serde::Deserialize;
use tracing::warn;

/// Frame layout before the update tag has been checked. Other keys such
/// as `updateTime` are ignored.
#[derive(Deserialize)]
struct RawFrame {
    update: String,
    message: Message,
}

/// Decode one text frame.
///
/// Returns `Ok(None)` for a well-formed frame with an unknown update tag
/// and `Err(StreamError::Decode)` for anything that is not a frame at all.
pub fn decode_frame(frame: &str) -> Result<Option<MessageUpdate>> {
    let raw: RawFrame = serde_json::from_str(frame)?;

    match UpdateKind::parse(&raw.update) {
        Some(kind) => Ok(Some(MessageUpdate {
            kind,
            message: raw.message,
        })),
        None => {
            warn!(tag = %raw.update, id = %raw.message.id, "ignoring frame with unknown update tag");
            Ok(None)
        }
    }
}

/// Encode an update as a text frame.
pub fn encode_frame(update: &MessageUpdate) -> Result<String> {
    serde_json::to_string(update).map_err(|e| StreamError::Encode(e.to_string()))
}
