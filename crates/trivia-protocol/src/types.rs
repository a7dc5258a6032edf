//! Identity types and the frames that travel over the chat gateway.
//!
//! The game core only needs to know *who* said something and *where*; the
//! gateway additionally needs a way to refer back to a message it already
//! posted (the live countdown is edited in place and removed afterwards).

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a chat participant.
///
/// Newtype over `u64` so a player id can never be confused with a message
/// handle. `#[serde(transparent)]` keeps it a bare number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A chat participant: a stable id plus the name shown in replies and
/// standings.
///
/// Identity is the id alone; two players may pick the same display name
/// without sharing a score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The chat channel a message was posted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Refers to a message the transport has already posted, so it can be
/// edited or deleted later.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageHandle(pub u64);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Chat events
// ---------------------------------------------------------------------------

/// Something visible happened in a channel.
///
/// This is what a chat transport fans out to everyone watching the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A new message appeared.
    Posted {
        channel: ChannelId,
        message: MessageHandle,
        author: String,
        text: String,
    },
    /// An existing message's text was replaced.
    Edited {
        channel: ChannelId,
        message: MessageHandle,
        text: String,
    },
    /// A message was removed.
    Deleted {
        channel: ChannelId,
        message: MessageHandle,
    },
}

impl ChatEvent {
    /// The channel the event belongs to.
    pub fn channel(&self) -> &ChannelId {
        match self {
            Self::Posted { channel, .. }
            | Self::Edited { channel, .. }
            | Self::Deleted { channel, .. } => channel,
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway frames
// ---------------------------------------------------------------------------

/// Frames a chat client sends to the gateway.
///
/// Internally tagged (`{"type": "Say", "text": "..."}`) so browser clients
/// can build them by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// First frame of every connection: pick a display name.
    Hello { name: String },
    /// A chat line typed by the user.
    Say { text: String },
}

/// Frames the gateway sends to a chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// Reply to `Hello`: the id the gateway assigned to this connection.
    Welcome { player_id: PlayerId },
    Posted {
        channel: ChannelId,
        message: MessageHandle,
        author: String,
        text: String,
    },
    Edited {
        channel: ChannelId,
        message: MessageHandle,
        text: String,
    },
    Deleted {
        channel: ChannelId,
        message: MessageHandle,
    },
    /// The gateway rejected a frame.
    Error { message: String },
}

impl From<ChatEvent> for ServerFrame {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::Posted {
                channel,
                message,
                author,
                text,
            } => Self::Posted {
                channel,
                message,
                author,
                text,
            },
            ChatEvent::Edited {
                channel,
                message,
                text,
            } => Self::Edited {
                channel,
                message,
                text,
            },
            ChatEvent::Deleted { channel, message } => {
                Self::Deleted { channel, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_player_identity_ignores_display_name() {
        let a = Player::new(PlayerId(1), "alice");
        let renamed = Player::new(PlayerId(1), "alice2");
        let other = Player::new(PlayerId(2), "alice");
        assert_eq!(a, renamed);
        assert_ne!(a, other);
        assert_eq!(a.to_string(), "alice");
    }

    #[test]
    fn test_channel_id_display_and_json() {
        let channel = ChannelId::new("trivia");
        assert_eq!(channel.to_string(), "#trivia");
        assert_eq!(serde_json::to_string(&channel).unwrap(), "\"trivia\"");
    }

    #[test]
    fn test_client_hello_json_format() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"Hello","name":"alice"}"#)
                .unwrap();
        assert_eq!(
            frame,
            ClientFrame::Hello {
                name: "alice".into()
            }
        );
    }

    #[test]
    fn test_client_frame_unknown_type_is_rejected() {
        let result: Result<ClientFrame, _> =
            serde_json::from_str(r#"{"type":"Shout","text":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_welcome_json_format() {
        let json = serde_json::to_value(ServerFrame::Welcome {
            player_id: PlayerId(9),
        })
        .unwrap();
        assert_eq!(json["type"], "Welcome");
        assert_eq!(json["player_id"], 9);
    }

    #[test]
    fn test_chat_event_converts_to_flat_frame() {
        let event = ChatEvent::Edited {
            channel: ChannelId::new("trivia"),
            message: MessageHandle(5),
            text: "You have 12 seconds left".into(),
        };
        assert_eq!(event.channel().as_str(), "trivia");

        let json = serde_json::to_value(ServerFrame::from(event)).unwrap();
        assert_eq!(json["type"], "Edited");
        assert_eq!(json["channel"], "trivia");
        assert_eq!(json["message"], 5);
        assert_eq!(json["text"], "You have 12 seconds left");
    }
}
