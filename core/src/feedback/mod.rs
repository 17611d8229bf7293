//! Feedback submission
//!
//! Everything that happens between "user pressed submit" and "here is what
//! each relay said": build the event, sign it, publish it, notify.

use crate::event::{build_feedback_event, unix_now, Event, FeedbackOptions};
use crate::identity::{EventSigner, SignerError};
use crate::relay::{EventPublisher, PublishReport};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Feedback content is empty")]
    EmptyContent,
    #[error("Metadata error: {0}")]
    Metadata(String),
    #[error("Signing error: {0}")]
    Signing(#[from] SignerError),
}

/// Supplies a block of text appended to every feedback message
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn metadata_block(&self) -> Result<String, String>;
}

/// Metadata that never changes
#[derive(Debug, Clone)]
pub struct StaticMetadata(pub String);

#[async_trait]
impl MetadataProvider for StaticMetadata {
    async fn metadata_block(&self) -> Result<String, String> {
        Ok(self.0.clone())
    }
}

/// A published feedback event and what each relay said about it
#[derive(Debug, Clone)]
pub struct Submission {
    pub event: Event,
    pub report: PublishReport,
}

type FeedbackCallback = Box<dyn Fn(&Event) + Send + Sync>;

/// Builds, signs and publishes feedback.
///
/// All collaborators are passed in explicitly; nothing is looked up from
/// global state.
pub struct FeedbackSubmitter {
    options: FeedbackOptions,
    anonymous_signer: Arc<dyn EventSigner>,
    identity_signer: Option<Arc<dyn EventSigner>>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    publisher: Arc<dyn EventPublisher>,
    on_feedback: Option<FeedbackCallback>,
}

impl FeedbackSubmitter {
    /// Create a submitter that signs anonymously and publishes via `publisher`
    pub fn new(
        options: FeedbackOptions,
        anonymous_signer: Arc<dyn EventSigner>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            options,
            anonymous_signer,
            identity_signer: None,
            metadata: None,
            publisher,
            on_feedback: None,
        }
    }

    /// Allow non-anonymous feedback signed by the user's own identity
    pub fn with_identity_signer(mut self, signer: Arc<dyn EventSigner>) -> Self {
        self.identity_signer = Some(signer);
        self
    }

    /// Append a metadata block to every message
    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Called with each event after it has been published
    pub fn on_feedback(mut self, callback: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_feedback = Some(Box::new(callback));
        self
    }

    /// Whether the user may choose to sign with their own identity
    pub fn can_sign_as_user(&self) -> bool {
        self.identity_signer.is_some()
    }

    pub fn options(&self) -> &FeedbackOptions {
        &self.options
    }

    /// Submit feedback.
    ///
    /// `anonymous == false` signs with the identity signer when one is
    /// configured; otherwise the anonymous signer is used.
    pub async fn submit(&self, content: &str, anonymous: bool) -> Result<Submission, SubmitError> {
        if content.trim().is_empty() {
            return Err(SubmitError::EmptyContent);
        }

        let metadata = match &self.metadata {
            Some(provider) => Some(
                provider
                    .metadata_block()
                    .await
                    .map_err(SubmitError::Metadata)?,
            ),
            None => None,
        };

        let draft = build_feedback_event(content, &self.options, metadata.as_deref(), unix_now());

        let signer = match (&self.identity_signer, anonymous) {
            (Some(identity), false) => identity,
            _ => &self.anonymous_signer,
        };
        let event = signer.sign(draft).await?;
        debug!("Signed feedback event {} as {}", event.id, event.pubkey);

        let report = self.publisher.publish(&event, &self.options.relays).await;
        info!(
            "Feedback {} reached {}/{} relays",
            event.id,
            report.summary().fulfilled,
            report.len()
        );

        if let Some(callback) = &self.on_feedback {
            callback(&event);
        }

        Ok(Submission { event, report })
    }
}
