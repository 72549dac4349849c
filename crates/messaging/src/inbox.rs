//! Event-sourced conversation caches.
//!
//! [`Inbox`] is the medical centre's view: one overview per student conversation with the
//! latest message and an unread counter. [`Conversation`] is the student's view: the single
//! thread with the medical centre.
//!
//! Both are folds over notification events. Every event is identified by
//! [`Notification::event_id`] and applied at most once, so redelivered payloads leave the
//! state unchanged. Only the most recent [`DEFAULT_SEEN_CAPACITY`] event ids are remembered.
//! The latest message is last-write-wins on `createdAt`, so events applied
//! out of order still settle on the newest message.

use crate::notification::{EventId, Notification};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use unicare_types::Role;

/// Number of recent event ids an [`Inbox`] or [`Conversation`] remembers by default.
pub const DEFAULT_SEEN_CAPACITY: usize = 4096;

/// Bounded set of recently applied event ids. The oldest id is evicted first.
#[derive(Clone, Debug)]
struct RecentIds {
    order: VecDeque<EventId>,
    ids: HashSet<EventId>,
    capacity: usize,
}

impl RecentIds {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            ids: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Returns false when the id is already remembered.
    fn insert(&mut self, id: EventId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        self.ids.insert(id.clone());
        self.order.push_back(id);
        true
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

impl Default for RecentIds {
    fn default() -> Self {
        Self::new(DEFAULT_SEEN_CAPACITY)
    }
}

/// Latest message shown on a conversation card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One conversation card in the medical centre's inbox.
///
/// Matches the overview objects returned by the messaging endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationOverview {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, rename = "lastMsg")]
    pub last_message: LastMessage,
    #[serde(default, rename = "unreadMsgCount")]
    pub unread_count: u32,
}

impl ConversationOverview {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Outcome of applying one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The event had been applied before.
    Duplicate,
    /// The event is not an emergency chat message.
    Ignored,
    /// The conversation was updated; carries its unread count afterwards.
    Updated { unread: u32 },
}

/// The medical centre's inbox.
#[derive(Clone, Debug, Default)]
pub struct Inbox {
    conversations: HashMap<String, ConversationOverview>,
    seen: RecentIds,
    focus: Option<String>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers at most `capacity` recent event ids (at least one).
    pub fn with_seen_capacity(capacity: usize) -> Self {
        Self {
            seen: RecentIds::new(capacity),
            ..Self::default()
        }
    }

    /// Number of event ids currently remembered for duplicate detection.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Starts from overviews loaded from the API.
    pub fn with_overviews(overviews: impl IntoIterator<Item = ConversationOverview>) -> Self {
        let mut inbox = Self::new();
        inbox.replace_overviews(overviews);
        inbox
    }

    /// Applies one notification event.
    ///
    /// Messages sent by the medical centre itself update the latest message but never
    /// count as unread. Messages for the focused conversation keep its count at zero.
    pub fn apply(&mut self, notification: &Notification) -> Applied {
        if !notification.is_emergency() {
            return Applied::Ignored;
        }

        let event_id = notification.event_id();
        if !self.seen.insert(event_id.clone()) {
            tracing::debug!(event = %event_id, "duplicate event ignored");
            return Applied::Duplicate;
        }

        let id = notification.conversation_id.as_str();
        let focused = self.focus.as_deref() == Some(id);
        let overview = self
            .conversations
            .entry(id.to_string())
            .or_insert_with(|| ConversationOverview::new(id));

        let newer = overview
            .last_message
            .created_at
            .is_none_or(|current| notification.created_at >= current);
        if newer {
            overview.last_message = LastMessage {
                text: Some(notification.text.clone()),
                created_at: Some(notification.created_at),
            };
        }

        if focused {
            overview.unread_count = 0;
        } else if notification.from == Role::Student {
            overview.unread_count = overview.unread_count.saturating_add(1);
        }

        Applied::Updated {
            unread: overview.unread_count,
        }
    }

    /// Applies events in order and returns how many changed the inbox.
    pub fn apply_all<'a>(&mut self, notifications: impl IntoIterator<Item = &'a Notification>) -> usize {
        notifications
            .into_iter()
            .filter(|n| matches!(self.apply(n), Applied::Updated { .. }))
            .count()
    }

    /// Opens a conversation: its count resets and stays at zero while focused.
    /// `None` closes the open conversation.
    pub fn focus(&mut self, id: Option<&str>) {
        self.focus = id.map(str::to_string);
        if let Some(id) = id {
            self.mark_read(id);
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Resets a conversation's unread count. Returns false for unknown conversations.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.conversations.get_mut(id) {
            Some(overview) => {
                overview.unread_count = 0;
                true
            }
            None => false,
        }
    }

    /// Replaces every overview with a fresh snapshot from the API.
    ///
    /// Recently seen events stay seen, so a redelivery after the reload is still a no-op.
    pub fn replace_overviews(&mut self, overviews: impl IntoIterator<Item = ConversationOverview>) {
        self.conversations = overviews
            .into_iter()
            .map(|overview| (overview.id.clone(), overview))
            .collect();
        if let Some(id) = self.focus.clone() {
            self.mark_read(&id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&ConversationOverview> {
        self.conversations.get(id)
    }

    /// Overviews with the most recent message first. Conversations without messages sort
    /// last, ties by id.
    pub fn overviews(&self) -> Vec<ConversationOverview> {
        let mut overviews: Vec<_> = self.conversations.values().cloned().collect();
        overviews.sort_by(|a, b| {
            b.last_message
                .created_at
                .cmp(&a.last_message.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        overviews
    }

    pub fn total_unread(&self) -> u32 {
        self.conversations.values().map(|o| o.unread_count).sum()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

/// One chat message as returned by the messaging endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub from: Role,
    pub to: Role,
    #[serde(alias = "time")]
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for ChatMessage {
    fn from(n: &Notification) -> Self {
        Self {
            text: n.text.clone(),
            from: n.from,
            to: n.to,
            created_at: n.created_at,
        }
    }
}

/// The student's single thread with the medical centre.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    seen: RecentIds,
}

impl Conversation {
    pub fn new(history: Vec<ChatMessage>) -> Self {
        Self {
            messages: history,
            seen: RecentIds::default(),
        }
    }

    /// Appends an emergency message from the medical centre. Other events, and events
    /// already applied, are ignored. Returns whether a message was appended.
    pub fn apply(&mut self, notification: &Notification) -> bool {
        if !notification.is_emergency() || notification.from != Role::MedicalCentre {
            return false;
        }
        if !self.seen.insert(notification.event_id()) {
            return false;
        }
        self.messages.push(ChatMessage::from(notification));
        true
    }

    /// Records a message the student just sent.
    pub fn push_sent(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
