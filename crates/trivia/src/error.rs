//! Unified error type for the trivia bot.

use trivia_game::GameError;
use trivia_protocol::ProtocolError;
use trivia_provider::FetchError;
use trivia_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded, or came out of order.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game rejected a request or is not running.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The question provider could not be set up.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The environment holds an invalid setting.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
