// Event types: the signed record relays accept and rebroadcast

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Event validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("Event id mismatch: expected {expected}, found {found}")]
    IdMismatch { expected: String, found: String },
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// A single event tag, e.g. `["p", "<pubkey>"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Tag a public key (`["p", pubkey]`)
    pub fn pubkey(pubkey: impl Into<String>) -> Self {
        Self(vec!["p".to_string(), pubkey.into()])
    }

    /// Tag a namespace (`["n", namespace]`)
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self(vec!["n".to_string(), namespace.into()])
    }

    /// Tag an expiration timestamp in unix seconds
    pub fn expiration(timestamp: u64) -> Self {
        Self(vec!["expiration".to_string(), timestamp.to_string()])
    }

    /// Tag name (first element)
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Tag value (second element)
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }
}

/// An event before it has been signed.
///
/// This is what the builder produces. A signer turns it into an [`Event`]
/// by attaching a public key, the content-derived id and a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEvent {
    /// Event kind
    pub kind: u16,
    /// Unix timestamp (seconds)
    pub created_at: u64,
    /// Ordered tags
    pub tags: Vec<Tag>,
    /// Free-form content
    pub content: String,
}

/// A signed event, as it goes on the wire.
///
/// Publishing treats it as opaque apart from `id`, which correlates the
/// relay's acknowledgement with the frame we sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Lowercase hex sha256 over the canonical serialization
    pub id: String,
    /// Author's public key (hex)
    pub pubkey: String,
    /// Unix timestamp (seconds)
    pub created_at: u64,
    /// Event kind
    pub kind: u16,
    /// Ordered tags
    pub tags: Vec<Tag>,
    /// Free-form content
    pub content: String,
    /// Signature over `id` (hex)
    pub sig: String,
}

impl UnsignedEvent {
    /// Compute the id this template would have once authored by `pubkey`
    pub fn id_for(&self, pubkey: &str) -> Result<String, EventError> {
        compute_id(pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Attach author, id and signature, producing a signed event.
    ///
    /// Signers call this after producing `sig` over the id they computed
    /// with [`UnsignedEvent::id_for`].
    pub fn into_signed(self, pubkey: String, id: String, sig: String) -> Event {
        Event {
            id,
            pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig,
        }
    }

    /// Value of the expiration tag, if any
    pub fn expiration(&self) -> Option<u64> {
        expiration_of(&self.tags)
    }
}

impl Event {
    /// Recompute the id from the event's fields
    pub fn compute_id(&self) -> Result<String, EventError> {
        compute_id(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Check that `id` matches the event's contents
    pub fn verify_id(&self) -> Result<(), EventError> {
        let expected = self.compute_id()?;
        if expected != self.id {
            return Err(EventError::IdMismatch {
                expected,
                found: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Value of the expiration tag, if any
    pub fn expiration(&self) -> Option<u64> {
        expiration_of(&self.tags)
    }

    /// Check if the event has expired at `now` (unix seconds)
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiration().is_some_and(|exp| exp <= now)
    }

    /// Parse a signed event from JSON
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        serde_json::from_str(json).map_err(|e| EventError::SerializationError(e.to_string()))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, EventError> {
        serde_json::to_string(self).map_err(|e| EventError::SerializationError(e.to_string()))
    }
}

/// sha256 over `[0, pubkey, created_at, kind, tags, content]`
fn compute_id(
    pubkey: &str,
    created_at: u64,
    kind: u16,
    tags: &[Tag],
    content: &str,
) -> Result<String, EventError> {
    let canonical = serde_json::to_string(&(0u8, pubkey, created_at, kind, tags, content))
        .map_err(|e| EventError::SerializationError(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

fn expiration_of(tags: &[Tag]) -> Option<u64> {
    tags.iter()
        .find(|tag| tag.name() == Some("expiration"))
        .and_then(|tag| tag.value())
        .and_then(|value| value.parse().ok())
}

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
