//! # Trivia
//!
//! A chat trivia bot for a single room.
//!
//! Clients connect over WebSocket, introduce themselves with a name and
//! then chat. Lines starting with `!` drive the game (`!trivia`, `!join`,
//! `!endgame`, ...); numbers pick a category or answer a question. The bot
//! fetches questions from the Open Trivia Database and runs a visible
//! countdown for every question.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trivia::prelude::*;
//!
//! # async fn start() -> Result<(), TriviaError> {
//! let config = BotConfig::from_env()?;
//! let bot = TriviaBot::builder().config(&config).build().await?;
//! bot.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{BotConfig, ConfigError};
pub use error::TriviaError;
pub use server::{BOT_NAME, TriviaBot, TriviaBotBuilder};

/// Everything needed to run a bot or talk to one.
pub mod prelude {
    pub use crate::{BOT_NAME, BotConfig, ConfigError, TriviaBot, TriviaBotBuilder, TriviaError};
    pub use trivia_game::{GameConfig, GameError, GameHandle, Phase, SessionSnapshot};
    pub use trivia_protocol::{
        ChannelId, ClientFrame, Difficulty, MessageHandle, Player, PlayerId,
        ServerFrame,
    };
    pub use trivia_provider::{
        FetchError, OpenTdbProvider, ProviderConfig, Question, QuestionProvider,
    };
}
