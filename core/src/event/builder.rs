// Feedback event construction

use super::types::{Tag, UnsignedEvent};
use serde::{Deserialize, Serialize};

/// Event kind used for feedback
pub const FEEDBACK_KIND: u16 = 1314;

/// How long relays should keep a feedback event (seconds)
pub const FEEDBACK_TTL_SECS: u64 = 60 * 24 * 30;

/// Where feedback goes and who it is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackOptions {
    /// Public key of the developer to tag
    pub developer: String,
    /// Namespace the feedback belongs to
    pub namespace: String,
    /// Relays to publish to
    pub relays: Vec<String>,
}

/// Build an unsigned feedback event.
///
/// A metadata block, when given, is appended to the content after a blank
/// line. The expiration tag is `now + FEEDBACK_TTL_SECS`.
pub fn build_feedback_event(
    content: &str,
    options: &FeedbackOptions,
    metadata: Option<&str>,
    now: u64,
) -> UnsignedEvent {
    let content = match metadata {
        Some(block) => format!("{}\n\n{}", content, block),
        None => content.to_string(),
    };

    UnsignedEvent {
        kind: FEEDBACK_KIND,
        created_at: now,
        tags: vec![
            Tag::pubkey(options.developer.clone()),
            Tag::namespace(options.namespace.clone()),
            Tag::expiration(now + FEEDBACK_TTL_SECS),
        ],
        content,
    }
}
