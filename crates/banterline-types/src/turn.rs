//! Conversation turn types.
//!
//! A [`Turn`] is one exchange unit in a participant's conversation log.
//! Its content is an ordered list of [`ContentPart`]s rather than a
//! single string because image turns carry pixel data alongside a text
//! hint. [`PromptTurn`] is the ephemeral shape handed to the model
//! adapter: the stored history plus one new trailing user turn.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::participant::ParticipantId;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "model" => Ok(TurnRole::Model),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// An inline image carried by a turn.
///
/// The payload is kept base64-encoded so the type serializes trivially
/// and matches what generative-model APIs accept for inline media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type, e.g. "image/png".
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImageAttachment {
    /// Encode raw image bytes into an attachment.
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: BASE64.encode(bytes),
        }
    }
}

/// One element of a turn's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { image: ImageAttachment },
}

impl ContentPart {
    /// Build a text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Build an image part.
    pub fn image(image: ImageAttachment) -> Self {
        ContentPart::Image { image }
    }

    /// The text payload, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::Image { .. } => None,
        }
    }
}

/// One exchange unit in a participant's conversation log.
///
/// `created_at` is assigned by the store at append time and drives both
/// retention expiry and chronological ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub participant_id: ParticipantId,
    pub role: TurnRole,
    pub parts: Vec<ContentPart>,
    pub created_at: DateTime<Utc>,
}

/// The ephemeral shape of a turn as sent to the model adapter.
///
/// Sending a prompt payload never mutates the store; persistence only
/// happens after the adapter call succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTurn {
    pub role: TurnRole,
    pub parts: Vec<ContentPart>,
}

impl PromptTurn {
    /// A user turn with the given parts.
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: TurnRole::User,
            parts,
        }
    }
}

impl From<&Turn> for PromptTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            parts: turn.parts.clone(),
        }
    }
}
