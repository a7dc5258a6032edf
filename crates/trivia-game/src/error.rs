//! Error types for the game layer.
//!
//! Every rejection a player can trigger is a variant here, and its
//! `Display` text is exactly what the bot replies in the channel.

use trivia_provider::FetchError;

/// Why a command was rejected, or why the game could not be reached.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// `!trivia` while a round is already open. Nothing changes.
    #[error("A trivia game is already in progress. Please wait until it finishes.")]
    AlreadyInProgress,

    /// `!join` or `!standings` with no round open.
    #[error("No game is currently in progress. Start a new game with !trivia.")]
    NoActiveGame,

    /// `!endgame` with no round open.
    #[error("No game is currently in progress to end.")]
    NothingToEnd,

    /// Category number outside the offered list.
    #[error("Invalid selection. Please choose a valid number from the list.")]
    InvalidSelection,

    /// Answer number outside the offered options. The timer keeps running.
    #[error("Invalid option number. Please select a valid option.")]
    InvalidOption,

    /// Free text while an answer is expected.
    #[error("Please respond with the number corresponding to your answer choice.")]
    MalformedReply,

    /// Someone other than the starter tried `!endgame`.
    #[error("Only the game starter can end the game.")]
    UnauthorizedAction,

    /// The question could not be fetched; the round was abandoned.
    #[error("Failed to fetch a trivia question. Please try again.")]
    FetchFailure(#[source] FetchError),

    /// The game actor has stopped or its inbox is closed.
    #[error("the trivia game is not running")]
    Unavailable,
}
