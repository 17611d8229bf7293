//! Publish failure taxonomy

use std::time::Duration;
use thiserror::Error;

/// Why publishing to a single relay failed.
///
/// Each variant is local to one relay attempt; the fan-out never fails as
/// a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Failed to connect to {relay}: {detail}")]
    Connection { relay: String, detail: String },
    #[error("Failed to publish to {relay}: connection closed without response")]
    NoResponse { relay: String },
    #[error("Transport error for {relay}: {detail}")]
    Transport { relay: String, detail: String },
    #[error("No response from {relay} within {after:?}")]
    Timeout { relay: String, after: Duration },
    #[error("Failed to encode event for {relay}: {detail}")]
    Encode { relay: String, detail: String },
}

impl PublishError {
    /// Relay the failure refers to
    pub fn relay(&self) -> &str {
        match self {
            PublishError::Connection { relay, .. }
            | PublishError::NoResponse { relay }
            | PublishError::Transport { relay, .. }
            | PublishError::Timeout { relay, .. }
            | PublishError::Encode { relay, .. } => relay,
        }
    }

    /// Short classification for reporting
    pub fn kind(&self) -> &'static str {
        match self {
            PublishError::Connection { .. } => "connection",
            PublishError::NoResponse { .. } => "no-response",
            PublishError::Transport { .. } => "transport",
            PublishError::Timeout { .. } => "timeout",
            PublishError::Encode { .. } => "encode",
        }
    }
}
