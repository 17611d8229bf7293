//! Per-relay publish attempt state machine
//!
//! The transport driver feeds connection events in arrival order and acts on
//! the returned [`Step`]. Once resolved, further events are ignored, so an
//! attempt produces exactly one result.

use super::error::PublishError;
use super::protocol::{RelayAck, RelayMessage};
use std::time::Duration;
use tracing::{debug, trace};

/// Something that happened on the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established
    Opened,
    /// Inbound text frame
    Frame(String),
    /// Connection closed by either side
    Closed,
    /// Transport failure
    Error(String),
    /// Deadline for the whole attempt elapsed
    TimedOut(Duration),
}

/// Attempt lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Waiting for the connection to open
    Connecting,
    /// Event sent, waiting for its acknowledgement
    Open,
    /// Terminal, result is fixed
    Resolved,
}

/// What the driver should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Transmit this frame
    Send(String),
    /// Keep listening
    Wait,
    /// Close the connection, then stop
    Close,
    /// Stop; the connection is already gone or the attempt was resolved earlier
    Done,
}

/// A single publish attempt to one relay
#[derive(Debug)]
pub struct PublishAttempt {
    relay: String,
    event_id: String,
    frame: String,
    state: AttemptState,
    result: Option<Result<RelayAck, PublishError>>,
}

impl PublishAttempt {
    /// Create an attempt that will send `frame` and wait for an ack of `event_id`
    pub fn new(relay: impl Into<String>, event_id: impl Into<String>, frame: String) -> Self {
        Self {
            relay: relay.into(),
            event_id: event_id.into(),
            frame,
            state: AttemptState::Connecting,
            result: None,
        }
    }

    /// Relay address
    pub fn relay(&self) -> &str {
        &self.relay
    }

    /// Current state
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Check if the attempt has reached a terminal state
    pub fn is_resolved(&self) -> bool {
        self.state == AttemptState::Resolved
    }

    /// Apply a transport event
    pub fn handle(&mut self, event: TransportEvent) -> Step {
        match (self.state, event) {
            (AttemptState::Resolved, event) => {
                trace!("Ignoring {:?} from {} after resolution", event, self.relay);
                Step::Done
            }

            (AttemptState::Connecting, TransportEvent::Opened) => {
                debug!("Connected to {}", self.relay);
                self.state = AttemptState::Open;
                Step::Send(self.frame.clone())
            }
            (AttemptState::Open, TransportEvent::Opened) => Step::Wait,

            (AttemptState::Open, TransportEvent::Frame(text)) => match RelayMessage::parse(&text) {
                Some(RelayMessage::Ok {
                    event_id,
                    detail,
                    message,
                }) if event_id == self.event_id => {
                    self.resolve(Ok(RelayAck {
                        relay: self.relay.clone(),
                        detail,
                        message,
                    }));
                    Step::Close
                }
                Some(other) => {
                    trace!("Ignoring {} frame from {}", other.message_type(), self.relay);
                    Step::Wait
                }
                None => {
                    trace!("Ignoring malformed frame from {}", self.relay);
                    Step::Wait
                }
            },
            (AttemptState::Connecting, TransportEvent::Frame(_)) => Step::Wait,

            (AttemptState::Connecting, TransportEvent::Closed) => {
                self.resolve(Err(PublishError::Connection {
                    relay: self.relay.clone(),
                    detail: "connection closed before opening".to_string(),
                }));
                Step::Done
            }
            (AttemptState::Open, TransportEvent::Closed) => {
                self.resolve(Err(PublishError::NoResponse {
                    relay: self.relay.clone(),
                }));
                Step::Done
            }

            (AttemptState::Connecting, TransportEvent::Error(detail)) => {
                self.resolve(Err(PublishError::Connection {
                    relay: self.relay.clone(),
                    detail,
                }));
                Step::Close
            }
            (AttemptState::Open, TransportEvent::Error(detail)) => {
                self.resolve(Err(PublishError::Transport {
                    relay: self.relay.clone(),
                    detail,
                }));
                Step::Close
            }

            (_, TransportEvent::TimedOut(after)) => {
                self.resolve(Err(PublishError::Timeout {
                    relay: self.relay.clone(),
                    after,
                }));
                Step::Close
            }
        }
    }

    /// Consume the attempt, yielding its terminal result.
    ///
    /// An attempt abandoned before resolution counts as closed without response.
    pub fn finish(self) -> Result<RelayAck, PublishError> {
        self.result.unwrap_or(Err(PublishError::NoResponse { relay: self.relay }))
    }

    fn resolve(&mut self, result: Result<RelayAck, PublishError>) {
        self.state = AttemptState::Resolved;
        self.result = Some(result);
    }
}
