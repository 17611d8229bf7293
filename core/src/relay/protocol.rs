//! Relay wire protocol: outbound commands and inbound frame parsing
//!
//! Frames are JSON arrays whose first element names the command:
//! - client → relay: `["EVENT", <event>]`
//! - relay → client: `["OK", <event id>, <detail>, <message>?]`
//!
//! Anything else a relay sends is tolerated and ignored by publishing.

use crate::event::Event;
use serde::Serialize;
use serde_json::Value;

/// Send-directive tag
pub const EVENT_TAG: &str = "EVENT";
/// Acceptance tag
pub const OK_TAG: &str = "OK";

/// A command sent from client to relay
#[derive(Debug, Clone, Copy)]
pub enum ClientMessage<'a> {
    /// Publish a signed event
    Event(&'a Event),
}

impl ClientMessage<'_> {
    /// Encode as a text frame
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        match self {
            ClientMessage::Event(event) => serde_json::to_string(&(EVENT_TAG, event)),
        }
    }
}

/// A frame received from a relay
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    /// Acknowledgement for a published event
    Ok {
        /// Id of the event being acknowledged
        event_id: String,
        /// Third element, surfaced verbatim
        detail: Value,
        /// Optional human-readable reason (fourth element)
        message: Option<String>,
    },
    /// Any other well-formed array frame, labelled by its first element
    Other(String),
}

impl RelayMessage {
    /// Parse an inbound text frame.
    ///
    /// Returns `None` for frames that are not JSON arrays. An `OK` frame
    /// with fewer than three elements or a non-string id is reported as
    /// `Other` so it can never match a published event.
    pub fn parse(frame: &str) -> Option<Self> {
        let Value::Array(items) = serde_json::from_str::<Value>(frame).ok()? else {
            return None;
        };

        let label = match items.first() {
            Some(Value::String(label)) => label.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        if label == OK_TAG && items.len() >= 3 {
            if let Value::String(event_id) = &items[1] {
                return Some(RelayMessage::Ok {
                    event_id: event_id.clone(),
                    detail: items[2].clone(),
                    message: items.get(3).and_then(Value::as_str).map(str::to_string),
                });
            }
        }

        Some(RelayMessage::Other(label))
    }

    /// Check whether this frame acknowledges `event_id`
    pub fn acknowledges(&self, event_id: &str) -> bool {
        matches!(self, RelayMessage::Ok { event_id: id, .. } if id == event_id)
    }

    /// Short name for logging
    pub fn message_type(&self) -> &str {
        match self {
            RelayMessage::Ok { .. } => OK_TAG,
            RelayMessage::Other(label) => label,
        }
    }
}

/// A relay's acceptance of a published event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayAck {
    /// Relay that acknowledged
    pub relay: String,
    /// Acceptance detail exactly as the relay sent it
    pub detail: Value,
    /// Optional human-readable reason
    pub message: Option<String>,
}

impl RelayAck {
    /// Whether the relay reported the event as stored (`detail == true`)
    pub fn accepted(&self) -> bool {
        self.detail == Value::Bool(true)
    }
}
