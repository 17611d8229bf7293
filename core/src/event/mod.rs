// Event module: the signed record and how feedback events are shaped

pub mod builder;
pub mod types;

pub use builder::{build_feedback_event, FeedbackOptions, FEEDBACK_KIND, FEEDBACK_TTL_SECS};
pub use types::{unix_now, Event, EventError, Tag, UnsignedEvent};
