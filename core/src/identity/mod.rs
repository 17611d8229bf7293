// Identity: signing capabilities supplied by the embedder
//
// The core never holds secret keys. Whoever embeds it hands in a signer
// that turns an unsigned event into a signed one.

use crate::event::{Event, UnsignedEvent};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("Signing was declined")]
    Declined,
    #[error("Signer unavailable: {0}")]
    Unavailable(String),
    #[error("Signing failed: {0}")]
    Failed(String),
}

/// Something that can sign events
#[async_trait]
pub trait EventSigner: Send + Sync {
    async fn sign(&self, draft: UnsignedEvent) -> Result<Event, SignerError>;
}

/// Adapter turning a synchronous closure into an [`EventSigner`]
pub struct FnSigner<F> {
    sign: F,
}

impl<F> FnSigner<F>
where
    F: Fn(UnsignedEvent) -> Result<Event, SignerError> + Send + Sync,
{
    pub fn new(sign: F) -> Self {
        Self { sign }
    }
}

#[async_trait]
impl<F> EventSigner for FnSigner<F>
where
    F: Fn(UnsignedEvent) -> Result<Event, SignerError> + Send + Sync,
{
    async fn sign(&self, draft: UnsignedEvent) -> Result<Event, SignerError> {
        (self.sign)(draft)
    }
}
