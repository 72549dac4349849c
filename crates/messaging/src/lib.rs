//! Push-notification plumbing for the emergency chat.
//!
//! The remote API pushes a small payload whenever an emergency message is sent. This crate
//! provides:
//! - [`notification`]: the strict wire model for that payload and its event identity
//! - [`relay`]: a named in-process bus that fans payloads out to every open session
//! - [`inbox`]: the event-sourced per-conversation cache that turns payloads into
//!   last-message and unread-count bookkeeping
//! - [`sse`]: a decoder for the relay's server-sent event stream
//!
//! Applying the same payload more than once never changes the outcome.

pub mod inbox;
pub mod notification;
pub mod relay;
pub mod sse;

pub use inbox::{
    Applied, ChatMessage, Conversation, ConversationOverview, Inbox, LastMessage,
    DEFAULT_SEEN_CAPACITY,
};
pub use notification::{EventId, Notification, Task};
pub use relay::{BroadcastRelay, Delivery, RelaySubscription, DEFAULT_CAPACITY, DEFAULT_CHANNEL};
pub use sse::{SseDecoder, SseEvent};

/// Errors returned by the messaging crate.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("notification schema mismatch at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("relay channel '{0}' is closed")]
    Closed(String),
}

/// Type alias for Results that can fail with a [`MessagingError`].
pub type MessagingResult<T> = Result<T, MessagingError>;
