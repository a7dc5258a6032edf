//! The trivia game: one room, one round at a time.
//!
//! A round is opened with `!trivia`, a category is picked by number, a
//! question is fetched and shown with a countdown, and the first valid
//! answer (or the countdown running out) closes the round. Scores outlive
//! rounds until the starter ends the game.
//!
//! # Key types
//!
//! - [`GameSession`]: the synchronous state machine
//! - [`spawn_game`] / [`GameHandle`]: the actor that owns a session
//! - [`ScoreLedger`]: per-player scores
//! - [`ChannelCountdown`]: renders the round timer in the channel
//! - [`GameConfig`]: categories, difficulty, countdown settings

mod actor;
mod config;
mod countdown;
mod error;
mod ledger;
mod session;

pub use actor::{GameHandle, spawn_game};
pub use config::{GameConfig, Phase};
pub use countdown::ChannelCountdown;
pub use error::GameError;
pub use ledger::{LedgerEntry, ScoreLedger};
pub use session::{ActiveQuestion, Action, GameSession, RoundId, SessionSnapshot};
