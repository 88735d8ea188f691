//! Incoming chat events and trigger decisions.
//!
//! The transport delivers a [`ChatEvent`] per message; the core reduces
//! it to [`EventFeatures`], runs the trigger policy over those features,
//! and hands an [`EventOutcome`] back to the transport.

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// Image file extensions the model adapter can accept.
const SUPPORTED_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// A file attached to an incoming message, by reference.
///
/// The bytes are fetched lazily and only for supported image types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
}

impl AttachmentRef {
    /// Whether the attachment looks like an image the model can consume.
    pub fn is_supported_image(&self) -> bool {
        let name = self.filename.to_lowercase();
        SUPPORTED_IMAGE_EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(&format!(".{ext}")))
    }
}

/// One incoming chat message as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub participant_id: ParticipantId,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    /// Whether the message explicitly mentions the agent.
    pub mentions_agent: bool,
}

/// The features the trigger policy looks at, reduced from a [`ChatEvent`].
#[derive(Debug, Clone)]
pub struct EventFeatures {
    pub mentions_agent: bool,
    pub text_lowercased: String,
    pub has_attachments: bool,
    pub is_supported_image: bool,
}

impl EventFeatures {
    /// Reduce an event to its trigger-relevant features.
    ///
    /// An attachment of an unsupported type still counts toward
    /// `has_attachments`; `is_supported_image` only controls whether an
    /// image payload is worth fetching.
    pub fn from_event(event: &ChatEvent) -> Self {
        Self {
            mentions_agent: event.mentions_agent,
            text_lowercased: event.text.to_lowercase(),
            has_attachments: !event.attachments.is_empty(),
            is_supported_image: event
                .attachments
                .iter()
                .any(AttachmentRef::is_supported_image),
        }
    }
}

/// What the trigger policy decided for one event. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDecision {
    pub should_react: bool,
    pub reaction_symbol: Option<String>,
    pub should_reply: bool,
}

/// What the core hands back to the transport for one event.
#[derive(Debug, Clone, Default)]
pub struct EventOutcome {
    pub reply: Option<String>,
    pub reaction: Option<String>,
}
