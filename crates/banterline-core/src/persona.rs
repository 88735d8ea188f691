//! Fixed prompt strings and command-style prompt builders.
//!
//! Everything the assembler injects verbatim lives here: the identity
//! disclosure note, the language-style reminder appended to synthetic
//! prompts, the image annotations, and the builders for the chat-game
//! commands (roast, rate, ship, ask, truth, dare, rename).

use banterline_types::config::PersonaConfig;

/// Annotation appended after an inline image part.
pub const IMAGE_SENT_ANNOTATION: &str = "(User sent an image)";

/// Instruction appended when a message carried only an image.
pub const IMAGE_COMMENT_INSTRUCTION: &str =
    "Look at this image and make a short, funny comment about it.";

/// Placeholder persisted for a user turn that carried only an image.
pub const IMAGE_PLACEHOLDER: &str = "[Sent an Image]";

/// The identity-disclosure note for the privileged user's requests.
///
/// Injected per request and never persisted. Returns `None` unless both
/// creator fields are configured.
pub fn identity_note(persona: &PersonaConfig) -> Option<String> {
    let username = persona.creator_username.as_deref()?;
    let alias = persona.creator_alias.as_deref()?;
    Some(format!(
        "(System note: the user sending this message is your creator. \
         Their username is '{username}' but their display name is '{alias}'. \
         Acknowledge them as your creator and call them '{alias}' in conversation.)"
    ))
}

/// Reminder appended to every synthetic command prompt.
pub fn style_reminder(persona: &PersonaConfig) -> String {
    format!(
        "(Reply as {} and keep the same language style the user has been using.)",
        persona.name
    )
}

pub fn roast_prompt(target: &str) -> String {
    format!("Roast {target}. Be creative and funny.")
}

pub fn rate_prompt(target: &str) -> String {
    format!(
        "Rate {target}'s vibe from 0 to 100%. \
         Give a percentage and a sarcastic reason why."
    )
}

pub fn ship_prompt(first: &str, second: &str) -> String {
    format!(
        "Calculate romantic compatibility between {first} and {second}. \
         Give a percentage and a funny, slightly mean prediction."
    )
}

pub fn ask_prompt(question: &str) -> String {
    format!("Answer this yes/no question sassily: {question}")
}

pub fn truth_prompt() -> String {
    "Give a funny, spicy Truth question for a chat game.".to_string()
}

pub fn dare_prompt() -> String {
    "Give a funny, silly Dare for a chat user.".to_string()
}

pub fn rename_prompt(target: &str) -> String {
    format!(
        "Create a funny, short, slightly mean nickname for {target} based on their vibe. \
         Rules: max 2-3 words. Output only the nickname text, \
         with no filler words and no punctuation."
    )
}
