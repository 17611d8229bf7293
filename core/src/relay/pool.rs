//! Relay fan-out: publish one event to many relays and collect every outcome

use super::client::{publish_to_relay, PublishConfig};
use super::error::PublishError;
use super::protocol::RelayAck;
use crate::event::Event;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::info;

/// Terminal result of publishing to one relay
#[derive(Debug, Clone, PartialEq)]
pub struct SettledOutcome {
    /// Relay address, as given by the caller
    pub relay: String,
    /// `Ok` when fulfilled, `Err` when rejected
    pub result: Result<RelayAck, PublishError>,
}

impl SettledOutcome {
    /// Check if the relay acknowledged the event
    pub fn is_fulfilled(&self) -> bool {
        self.result.is_ok()
    }

    /// Check if the attempt failed
    pub fn is_rejected(&self) -> bool {
        self.result.is_err()
    }
}

/// Every relay's outcome, in the order the relays were given
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishReport {
    pub outcomes: Vec<SettledOutcome>,
}

/// Flat summary of a report, for display or logging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub fulfilled: usize,
    pub rejected: usize,
}

impl PublishReport {
    /// Number of outcomes (one per relay)
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if no relay was targeted
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Successful acknowledgements
    pub fn fulfilled(&self) -> impl Iterator<Item = &RelayAck> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failures
    pub fn rejected(&self) -> impl Iterator<Item = &PublishError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    /// Check if at least one relay acknowledged the event
    pub fn any_fulfilled(&self) -> bool {
        self.outcomes.iter().any(SettledOutcome::is_fulfilled)
    }

    pub fn summary(&self) -> ReportSummary {
        let fulfilled = self.fulfilled().count();
        ReportSummary {
            total: self.len(),
            fulfilled,
            rejected: self.len() - fulfilled,
        }
    }
}

/// Publish `event` to every relay concurrently.
///
/// All attempts progress on the calling task; the returned report holds one
/// entry per relay, aligned with `relays`, once every attempt has settled.
/// A failing relay never hides or delays another relay's result.
pub async fn publish_to_relays(
    relays: &[String],
    event: &Event,
    config: &PublishConfig,
) -> PublishReport {
    let attempts = relays.iter().map(|relay| async move {
        SettledOutcome {
            relay: relay.clone(),
            result: publish_to_relay(relay, event, config).await,
        }
    });

    let report = PublishReport {
        outcomes: join_all(attempts).await,
    };

    let summary = report.summary();
    info!(
        "Event {} settled on {} relays: {} fulfilled, {} rejected",
        event.id, summary.total, summary.fulfilled, summary.rejected
    );
    report
}

/// Capability to publish an event to a set of relays.
///
/// Callers hold this explicitly so tests and embedders can substitute
/// their own transport.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &Event, relays: &[String]) -> PublishReport;
}

/// Default publisher: a fresh WebSocket per relay per event
#[derive(Debug, Clone, Default)]
pub struct RelayPool {
    config: PublishConfig,
}

impl RelayPool {
    /// Create a pool with the given configuration
    pub fn new(config: PublishConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }
}

#[async_trait]
impl EventPublisher for RelayPool {
    async fn publish(&self, event: &Event, relays: &[String]) -> PublishReport {
        publish_to_relays(relays, event, &self.config).await
    }
}
