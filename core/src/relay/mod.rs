//! Relay publishing
//!
//! One transient connection per relay per event. Relays are independent: each
//! attempt settles on its own and the fan-out reports all of them.

pub mod attempt;
pub mod client;
pub mod error;
pub mod pool;
pub mod protocol;

pub use attempt::{AttemptState, PublishAttempt, Step, TransportEvent};
pub use client::{publish_to_relay, PublishConfig};
pub use error::PublishError;
pub use pool::{
    publish_to_relays, EventPublisher, PublishReport, RelayPool, ReportSummary, SettledOutcome,
};
pub use protocol::{ClientMessage, RelayAck, RelayMessage};
