// Shout Core: feedback events and relay publishing
//
// A feedback widget hands us a signed event and a list of relays.
// We tell it, relay by relay, whether the event was accepted.

pub mod event;
pub mod feedback;
pub mod identity;
pub mod relay;

pub use event::{build_feedback_event, Event, FeedbackOptions, Tag, UnsignedEvent, FEEDBACK_KIND};
pub use feedback::{FeedbackSubmitter, MetadataProvider, StaticMetadata, SubmitError, Submission};
pub use identity::{EventSigner, FnSigner, SignerError};
pub use relay::{
    publish_to_relay, publish_to_relays, EventPublisher, PublishConfig, PublishError,
    PublishReport, RelayAck, RelayPool, SettledOutcome,
};
