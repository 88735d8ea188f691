//! Model output post-processing for constrained sinks.
//!
//! Display-name fields cap out at 32 characters and choke on quoting
//! and "Nickname:"-style labels the model sometimes emits despite
//! instructions. Sanitization is deterministic and total: it always
//! returns a string, possibly empty.

use banterline_types::error::EditError;

/// Maximum length a display-name sink accepts.
const MAX_DISPLAY_NAME_CHARS: usize = 32;

/// Fixed message shown when applying a display name fails.
pub const EDIT_FAILURE_REPLY: &str = "Ugh, the nickname would not stick. 🙄";

/// Clean raw model output into something a display-name field accepts.
///
/// Strips quote characters and periods, keeps only the segment after
/// the last colon (dropping any "label:" prefix), trims whitespace,
/// and truncates to 32 characters on a char boundary. Idempotent on
/// its own output.
pub fn sanitize_for_display_name(raw: &str) -> String {
    let cleaned = raw.replace(['"', '\'', '.'], "");

    let tail = match cleaned.rfind(':') {
        Some(idx) => &cleaned[idx + 1..],
        None => cleaned.as_str(),
    };

    let truncated: String = tail.trim().chars().take(MAX_DISPLAY_NAME_CHARS).collect();
    truncated.trim_end().to_string()
}

/// Sanitize and validate a display name for a downstream edit.
///
/// An empty result would be rejected by any display-name sink, so it
/// is reported as an [`EditError`] for the caller to recover from.
pub fn apply_display_name(raw: &str) -> Result<String, EditError> {
    let name = sanitize_for_display_name(raw);
    if name.is_empty() {
        return Err(EditError::EmptyName);
    }
    Ok(name)
}
