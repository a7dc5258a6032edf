//! Transport layer for the trivia room.
//!
//! Two seams live here:
//!
//! - [`ChatTransport`]: what the game needs from a chat network: post a
//!   message (optionally auto-deleted later), edit it, delete it.
//!   [`BroadcastTransport`] implements it by fanning [`ChatEvent`]s out to
//!   every subscriber.
//! - [`Transport`] / [`Connection`]: raw byte connections accepted by the
//!   gateway. [`WebSocketTransport`] implements them.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket listener via `tokio-tungstenite`
//!
//! [`ChatEvent`]: trivia_protocol::ChatEvent

#![allow(async_fn_in_trait)]

mod broadcast;
mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use broadcast::BroadcastTransport;
pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::time::Duration;

use trivia_protocol::{ChannelId, MessageHandle};

// ---------------------------------------------------------------------------
// Chat transport
// ---------------------------------------------------------------------------

/// Per-message delivery hints for [`ChatTransport::send`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Remove the message this long after it was posted. Non-blocking:
    /// `send` returns immediately and the removal happens in the background.
    pub delete_after: Option<Duration>,
}

impl SendOptions {
    /// Options for a message that removes itself after `after`.
    pub fn delete_after(after: Duration) -> Self {
        Self {
            delete_after: Some(after),
        }
    }
}

/// Outbound side of a chat network, as seen by the game.
///
/// Uses `async_trait` rather than native async fns so the transport can be
/// shared as `Arc<dyn ChatTransport>` and called from spawned tasks (the
/// round timer edits its countdown from its own task).
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Posts `text` to `channel` and returns a handle to the new message.
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageHandle, TransportError>;

    /// Replaces the text of a previously posted message.
    async fn edit(
        &self,
        channel: &ChannelId,
        message: MessageHandle,
        text: &str,
    ) -> Result<(), TransportError>;

    /// Removes a previously posted message.
    async fn delete(
        &self,
        channel: &ChannelId,
        message: MessageHandle,
    ) -> Result<(), TransportError>;
}

// ---------------------------------------------------------------------------
// Byte connections
// ---------------------------------------------------------------------------

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// `send` and `recv` may be called concurrently from different tasks.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
