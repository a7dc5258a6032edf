//! In-process chat channel: every posted, edited or deleted message becomes
//! a [`ChatEvent`] fanned out to all subscribers.
//!
//! The gateway subscribes once per connected client and forwards the events
//! as frames. Nothing is stored: a subscriber that joins late only sees what
//! happens from then on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use trivia_protocol::{ChannelId, ChatEvent, MessageHandle};

use crate::{ChatTransport, SendOptions, TransportError};

/// A [`ChatTransport`] backed by a `tokio::sync::broadcast` channel.
///
/// Cheap to clone; clones share the channel and the message counter.
#[derive(Clone)]
pub struct BroadcastTransport {
    events: broadcast::Sender<ChatEvent>,
    next_message: Arc<AtomicU64>,
    /// Author name attached to messages posted through [`ChatTransport::send`].
    author: Arc<str>,
}

impl BroadcastTransport {
    /// Creates a channel that buffers up to `capacity` events per slow
    /// subscriber before it starts lagging.
    pub fn new(author: &str, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            events,
            next_message: Arc::new(AtomicU64::new(1)),
            author: Arc::from(author),
        }
    }

    /// Subscribes to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Publishes a message typed by a user so everyone in the channel
    /// sees it.
    pub fn relay(
        &self,
        channel: &ChannelId,
        author: &str,
        text: &str,
    ) -> MessageHandle {
        let message = self.next_handle();
        self.publish(ChatEvent::Posted {
            channel: channel.clone(),
            message,
            author: author.to_string(),
            text: text.to_string(),
        });
        message
    }

    fn next_handle(&self) -> MessageHandle {
        MessageHandle(self.next_message.fetch_add(1, Ordering::Relaxed))
    }

    /// A send with no subscribers is not an error: nobody is watching.
    fn publish(&self, event: ChatEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("chat event dropped, no subscribers");
        }
    }
}

#[async_trait::async_trait]
impl ChatTransport for BroadcastTransport {
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageHandle, TransportError> {
        let message = self.next_handle();
        self.publish(ChatEvent::Posted {
            channel: channel.clone(),
            message,
            author: self.author.to_string(),
            text: text.to_string(),
        });

        if let Some(after) = options.delete_after {
            let events = self.events.clone();
            let channel = channel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                let _ = events.send(ChatEvent::Deleted { channel, message });
            });
        }

        Ok(message)
    }

    async fn edit(
        &self,
        channel: &ChannelId,
        message: MessageHandle,
        text: &str,
    ) -> Result<(), TransportError> {
        self.publish(ChatEvent::Edited {
            channel: channel.clone(),
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(
        &self,
        channel: &ChannelId,
        message: MessageHandle,
    ) -> Result<(), TransportError> {
        self.publish(ChatEvent::Deleted {
            channel: channel.clone(),
            message,
        });
        Ok(())
    }
}
