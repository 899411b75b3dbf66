//! Trigger matching: watched-post filtering and nickname extraction.
//!
//! An inbound comment event only triggers the pipeline when it targets the
//! configured watched post. The nickname is pulled out of the comment text
//! by two patterns tried in fixed priority order — `"<label>: <value>"`
//! then `"<label> <value>"` (label case-insensitive, value terminated by
//! end of line or end of text) — and sanitized before use.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Read-only view of an inbound comment-reply event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEvent {
    pub post_owner_id: i64,
    pub post_id: i64,
    pub comment_id: i64,
    pub text: String,
}

/// Maximum nickname length after sanitization.
pub const MAX_NICKNAME_LEN: usize = 32;

/// Characters never allowed in a nickname.
pub const FORBIDDEN_CHARS: &[char] = &['<', '>', '{', '}', '(', ')', '/', '\\'];

/// Strip the forbidden set, trim, and truncate to [`MAX_NICKNAME_LEN`]
/// characters. Idempotent: sanitizing a sanitized value is a no-op.
pub fn sanitize_nickname(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect();
    let truncated: String = stripped.trim().chars().take(MAX_NICKNAME_LEN).collect();
    // Truncation may expose trailing whitespace; drop it so the result is
    // a fixed point of this function.
    truncated.trim_end().to_string()
}

/// Validates events against the watched post and extracts nicknames.
#[derive(Debug)]
pub struct TriggerMatcher {
    target_post_id: String,
    patterns: [Regex; 2],
}

impl TriggerMatcher {
    /// Compile the two extraction patterns for a label (e.g. `"nick"`).
    /// Patterns are compiled once here, not per event.
    pub fn new(
        target_post_id: impl Into<String>,
        label: &str,
    ) -> Result<Self, regex::Error> {
        let escaped = regex::escape(label);
        let with_colon = Regex::new(&format!(r"(?i){escaped}:[ \t]*([^\r\n]+)"))?;
        let with_space = Regex::new(&format!(r"(?i){escaped}[ \t]+([^\r\n]+)"))?;
        Ok(TriggerMatcher {
            target_post_id: target_post_id.into(),
            patterns: [with_colon, with_space],
        })
    }

    /// Whether the event targets the watched post (string equality on the
    /// numeric post id).
    pub fn matches_post(&self, event: &CommentEvent) -> bool {
        event.post_id.to_string() == self.target_post_id
    }

    /// Extract the nickname from comment text. First-matching-pattern
    /// wins; `None` when no pattern matches or the matched value
    /// sanitizes to empty.
    pub fn extract_nickname(&self, text: &str) -> Option<String> {
        for pattern in &self.patterns {
            if let Some(captures) = pattern.captures(text) {
                let raw = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let nickname = sanitize_nickname(raw);
                debug!(raw, nickname, "Trigger pattern matched");
                if nickname.is_empty() {
                    return None;
                }
                return Some(nickname);
            }
        }
        None
    }
}
