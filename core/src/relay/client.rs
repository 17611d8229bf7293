//! Relay Client: publishes one event to one relay over a transient WebSocket
//!
//! Each call opens its own connection, sends a single `EVENT` frame, waits for
//! the matching `OK` and always closes the connection before returning.

use super::attempt::{PublishAttempt, Step, TransportEvent};
use super::error::PublishError;
use super::protocol::{ClientMessage, RelayAck};
use crate::event::Event;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type RelaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Publish configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Deadline for a whole attempt (connect + acknowledgement).
    /// `None` waits for as long as the relay keeps the connection open.
    pub ack_timeout: Option<Duration>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl PublishConfig {
    /// Configuration without a deadline
    pub fn unbounded() -> Self {
        Self { ack_timeout: None }
    }

    /// Configuration with the given deadline
    pub fn with_timeout(ack_timeout: Duration) -> Self {
        Self {
            ack_timeout: Some(ack_timeout),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    after: Duration,
}

/// Publish `event` to a single relay.
///
/// Resolves with the relay's acknowledgement detail, or fails with the
/// reason the attempt ended without one.
pub async fn publish_to_relay(
    relay: &str,
    event: &Event,
    config: &PublishConfig,
) -> Result<RelayAck, PublishError> {
    let frame = ClientMessage::Event(event)
        .to_frame()
        .map_err(|e| PublishError::Encode {
            relay: relay.to_string(),
            detail: e.to_string(),
        })?;

    let mut attempt = PublishAttempt::new(relay, event.id.clone(), frame);
    let deadline = config.ack_timeout.map(|after| Deadline {
        at: Instant::now() + after,
        after,
    });

    debug!("Connecting to {}", relay);
    if let Some(mut socket) = connect(&mut attempt, deadline).await {
        drive(&mut attempt, &mut socket, deadline).await;
    }

    let result = attempt.finish();
    match &result {
        Ok(ack) => info!("Published {} to {}: {}", event.id, relay, ack.detail),
        Err(e) => warn!("{}", e),
    }
    result
}

async fn connect(attempt: &mut PublishAttempt, deadline: Option<Deadline>) -> Option<RelaySocket> {
    let connecting = connect_async(attempt.relay().to_string());
    let connected = match deadline {
        Some(deadline) => match timeout_at(deadline.at, connecting).await {
            Ok(connected) => connected,
            Err(_) => {
                attempt.handle(TransportEvent::TimedOut(deadline.after));
                return None;
            }
        },
        None => connecting.await,
    };

    match connected {
        Ok((socket, _response)) => Some(socket),
        Err(e) => {
            attempt.handle(TransportEvent::Error(e.to_string()));
            None
        }
    }
}

async fn drive(attempt: &mut PublishAttempt, socket: &mut RelaySocket, deadline: Option<Deadline>) {
    let mut step = attempt.handle(TransportEvent::Opened);
    loop {
        step = match step {
            Step::Send(frame) => match socket.send(Message::text(frame)).await {
                Ok(()) => Step::Wait,
                Err(e) => attempt.handle(transport_event(e)),
            },
            Step::Wait => {
                let event = next_event(socket, deadline).await;
                attempt.handle(event)
            }
            Step::Close => {
                if let Err(e) = socket.close(None).await {
                    debug!("Close of {} failed: {}", attempt.relay(), e);
                }
                break;
            }
            Step::Done => break,
        };
    }
}

/// Wait for the next event that matters to the attempt.
///
/// Ping/pong and raw frames are handled by the WebSocket layer and skipped.
async fn next_event(socket: &mut RelaySocket, deadline: Option<Deadline>) -> TransportEvent {
    loop {
        let next = match deadline {
            Some(deadline) => match timeout_at(deadline.at, socket.next()).await {
                Ok(next) => next,
                Err(_) => return TransportEvent::TimedOut(deadline.after),
            },
            None => socket.next().await,
        };

        return match next {
            Some(Ok(Message::Text(text))) => TransportEvent::Frame(text.to_string()),
            Some(Ok(Message::Binary(bytes))) => {
                TransportEvent::Frame(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some(Ok(Message::Close(_))) | None => TransportEvent::Closed,
            Some(Ok(_)) => continue,
            Some(Err(e)) => transport_event(e),
        };
    }
}

fn transport_event(error: WsError) -> TransportEvent {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportEvent::Closed,
        other => TransportEvent::Error(other.to_string()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
