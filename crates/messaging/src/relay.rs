//! In-process notification bus.
//!
//! A [`BroadcastRelay`] is a named channel that every open session subscribes to. Each
//! published payload is delivered to every live subscriber. The channel has bounded
//! capacity: a subscriber that falls behind loses the oldest payloads, is told how many it
//! missed, and then carries on from the oldest payload still buffered.

use crate::notification::Notification;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Channel name shared by the push worker and the open sessions.
pub const DEFAULT_CHANNEL: &str = "fcm-channel";

/// Payloads buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct BroadcastRelay {
    name: String,
    sender: broadcast::Sender<Notification>,
}

impl BroadcastRelay {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            name: name.into(),
            sender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivers `notification` to every live subscriber and returns how many there were.
    ///
    /// Publishing with no subscribers is not an error; the payload is dropped.
    pub fn publish(&self, notification: Notification) -> usize {
        match self.sender.send(notification) {
            Ok(count) => {
                tracing::debug!(channel = %self.name, subscribers = count, "published notification");
                count
            }
            Err(_) => {
                tracing::debug!(channel = %self.name, "no subscribers, notification dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> RelaySubscription {
        RelaySubscription {
            channel: self.name.clone(),
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastRelay {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL, DEFAULT_CAPACITY)
    }
}

/// What a subscriber receives next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    Message(Notification),
    /// The subscriber fell behind and this many payloads were dropped.
    Missed(u64),
}

#[derive(Debug)]
pub struct RelaySubscription {
    channel: String,
    receiver: broadcast::Receiver<Notification>,
}

impl RelaySubscription {
    /// Waits for the next delivery. Returns `None` once every relay handle is dropped.
    pub async fn recv(&mut self) -> Option<Delivery> {
        match self.receiver.recv().await {
            Ok(notification) => Some(Delivery::Message(notification)),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(channel = %self.channel, missed, "subscriber lagged behind");
                Some(Delivery::Missed(missed))
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Waits for the next payload, skipping over lag reports.
    pub async fn next_message(&mut self) -> Option<Notification> {
        loop {
            match self.recv().await? {
                Delivery::Message(notification) => return Some(notification),
                Delivery::Missed(_) => continue,
            }
        }
    }

    pub fn into_inner(self) -> broadcast::Receiver<Notification> {
        self.receiver
    }
}
