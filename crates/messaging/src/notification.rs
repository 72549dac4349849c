//! Notification payload wire model.
//!
//! The payload the remote API attaches to every push notification:
//!
//! ```json
//! {"task": "emergency", "_id": "<student id>", "text": "...", "fr": "student",
//!  "to": "medical-centre", "createdAt": "2026-10-16T09:30:00.000Z"}
//! ```
//!
//! `messageId` is optional. When present it identifies the event; otherwise the event is
//! identified by a SHA-256 fingerprint of the payload (see [`Notification::event_id`]).
//!
//! Parsing is strict: unknown keys and wrong types are rejected and the error names the
//! offending key.

use crate::{MessagingError, MessagingResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use unicare_types::{NonEmptyText, Role};

/// What a notification is about. Unrecognised task strings are preserved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Task {
    Emergency,
    Other(String),
}

impl Task {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Emergency => "emergency",
            Self::Other(task) => task,
        }
    }
}

impl From<String> for Task {
    fn from(value: String) -> Self {
        match value.as_str() {
            "emergency" => Self::Emergency,
            _ => Self::Other(value),
        }
    }
}

impl From<Task> for String {
    fn from(task: Task) -> Self {
        match task {
            Task::Emergency => "emergency".to_string(),
            Task::Other(task) => task,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one notification event, used to make applying it idempotent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventId(String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed notification payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NotificationWire", into = "NotificationWire")]
pub struct Notification {
    pub task: Task,
    /// Conversation the event belongs to: the student's id.
    pub conversation_id: NonEmptyText,
    pub text: String,
    pub from: Role,
    pub to: Role,
    pub created_at: DateTime<Utc>,
    pub message_id: Option<NonEmptyText>,
}

impl Notification {
    /// An emergency chat message event.
    pub fn emergency(
        conversation_id: NonEmptyText,
        text: impl Into<String>,
        from: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task: Task::Emergency,
            conversation_id,
            text: text.into(),
            from,
            to: from.counterpart(),
            created_at,
            message_id: None,
        }
    }

    pub fn with_message_id(mut self, message_id: NonEmptyText) -> Self {
        self.message_id = Some(message_id);
        self
    }

    pub fn is_emergency(&self) -> bool {
        self.task == Task::Emergency
    }

    /// The event identity: the message id when the payload carries one, otherwise a
    /// SHA-256 fingerprint over task, conversation, sender, recipient, timestamp and text.
    pub fn event_id(&self) -> EventId {
        if let Some(id) = &self.message_id {
            return EventId(format!("msg:{id}"));
        }

        let created_at = self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut hasher = Sha256::new();
        for part in [
            self.task.as_str(),
            self.conversation_id.as_str(),
            self.from.as_str(),
            self.to.as_str(),
            created_at.as_str(),
            self.text.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        EventId(format!("sha256:{}", hex::encode(hasher.finalize())))
    }

    /// Parse a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Schema`] if the JSON does not match the payload schema,
    /// naming the offending key (for example `fr`).
    pub fn parse(json: &str) -> MessagingResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        serde_path_to_error::deserialize(&mut deserializer).map_err(schema_error)
    }

    /// Parse a full push message and take the payload from its `data` member.
    ///
    /// The envelope's own `messageId` is used when the payload does not carry one. Other
    /// envelope keys (display banner, sender, collapse key) are ignored.
    pub fn parse_envelope(json: &str) -> MessagingResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let envelope: Envelope =
            serde_path_to_error::deserialize(&mut deserializer).map_err(schema_error)?;

        let mut notification = envelope.data;
        if notification.message_id.is_none() {
            notification.message_id = envelope
                .message_id
                .and_then(|id| NonEmptyText::new(id).ok());
        }
        Ok(notification)
    }

    /// Render the payload as JSON text.
    pub fn render(&self) -> MessagingResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn schema_error(err: serde_path_to_error::Error<serde_json::Error>) -> MessagingError {
    let path = err.path().to_string();
    let message = err.into_inner().to_string();
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    MessagingError::Schema { path, message }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct NotificationWire {
    task: String,
    #[serde(rename = "_id")]
    id: String,
    text: String,
    fr: Role,
    to: Role,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
}

impl TryFrom<NotificationWire> for Notification {
    type Error = MessagingError;

    fn try_from(wire: NotificationWire) -> Result<Self, Self::Error> {
        let conversation_id = NonEmptyText::new(&wire.id)
            .map_err(|_| MessagingError::InvalidInput("_id must not be empty".into()))?;
        let message_id = wire
            .message_id
            .map(|id| {
                NonEmptyText::new(&id)
                    .map_err(|_| MessagingError::InvalidInput("messageId must not be empty".into()))
            })
            .transpose()?;

        Ok(Self {
            task: Task::from(wire.task),
            conversation_id,
            text: wire.text,
            from: wire.fr,
            to: wire.to,
            created_at: wire.created_at,
            message_id,
        })
    }
}

impl From<Notification> for NotificationWire {
    fn from(n: Notification) -> Self {
        Self {
            task: n.task.into(),
            id: n.conversation_id.into_inner(),
            text: n.text,
            fr: n.from,
            to: n.to,
            created_at: n.created_at,
            message_id: n.message_id.map(NonEmptyText::into_inner),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    data: Notification,
    #[serde(default)]
    message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "task": "emergency",
        "_id": "65f0c2a1b4",
        "text": "I feel dizzy",
        "fr": "student",
        "to": "medical-centre",
        "createdAt": "2026-10-16T09:30:00.000Z"
    }"#;

    #[test]
    fn parses_emergency_payload() {
        let n = Notification::parse(SAMPLE).expect("payload should parse");
        assert_eq!(n.task, Task::Emergency);
        assert_eq!(n.conversation_id.as_str(), "65f0c2a1b4");
        assert_eq!(n.from, Role::Student);
        assert_eq!(n.to, Role::MedicalCentre);
        assert!(n.message_id.is_none());
    }

    #[test]
    fn keeps_unknown_tasks() {
        let json = SAMPLE.replace("\"emergency\"", "\"appointment\"");
        let n = Notification::parse(&json).expect("payload should parse");
        assert_eq!(n.task, Task::Other("appointment".into()));
        assert!(!n.is_emergency());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_roles() {
        let json = SAMPLE.replace("\"text\"", "\"body\"");
        let err = Notification::parse(&json).expect_err("should reject unknown key");
        assert!(matches!(err, MessagingError::Schema { message, .. } if message.contains("body")));

        let json = SAMPLE.replace("\"fr\": \"student\"", "\"fr\": \"nurse\"");
        match Notification::parse(&json).expect_err("should reject role") {
            MessagingError::Schema { path, .. } => assert_eq!(path, "fr"),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_conversation_id() {
        let json = SAMPLE.replace("\"65f0c2a1b4\"", "\"\"");
        assert!(Notification::parse(&json).is_err());
    }

    #[test]
    fn render_parses_back() {
        let n = Notification::parse(SAMPLE).expect("payload should parse");
        let rendered = n.render().expect("render");
        assert_eq!(Notification::parse(&rendered).expect("reparse"), n);
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = Notification::parse(SAMPLE).expect("payload should parse");
        let b = Notification::parse(SAMPLE).expect("payload should parse");
        assert_eq!(a.event_id(), b.event_id());
        assert!(a.event_id().as_str().starts_with("sha256:"));

        let mut c = b.clone();
        c.text.push('!');
        assert_ne!(a.event_id(), c.event_id());
    }

    #[test]
    fn message_id_takes_precedence() {
        let n = Notification::parse(SAMPLE)
            .expect("payload should parse")
            .with_message_id(NonEmptyText::new("m-1").expect("non-empty"));
        assert_eq!(n.event_id().as_str(), "msg:m-1");
    }

    #[test]
    fn envelope_supplies_message_id() {
        let json = format!(
            r#"{{"from": "71770612056", "messageId": "fcm-42",
                "notification": {{"title": "Emergency", "body": "I feel dizzy"}},
                "data": {SAMPLE}}}"#
        );
        let n = Notification::parse_envelope(&json).expect("envelope should parse");
        assert_eq!(n.message_id.as_ref().map(NonEmptyText::as_str), Some("fcm-42"));
    }
}
