//! Shared vocabulary of the trivia room.
//!
//! This crate defines what every other layer agrees on:
//!
//! - **Identity** ([`PlayerId`], [`Player`], [`ChannelId`], [`MessageHandle`]):
//!   who is talking, where, and which posted message an edit refers to.
//! - **Wire frames** ([`ClientFrame`], [`ServerFrame`], [`ChatEvent`]): what
//!   travels over the chat gateway.
//! - **Commands** ([`Command`], [`Difficulty`]): the closed set of things a
//!   chat line can mean to the game.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): frames to/from bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (frames, commands) → Game (state machine)
//! ```

mod codec;
mod command;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::{Command, Difficulty, ParseDifficultyError};
pub use error::ProtocolError;
pub use types::{
    ChannelId, ChatEvent, ClientFrame, MessageHandle, Player, PlayerId,
    ServerFrame,
};
