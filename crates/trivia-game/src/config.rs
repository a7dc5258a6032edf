//! Game configuration and the round phase enum.

use std::fmt;
use std::time::Duration;

use trivia_protocol::Difficulty;
use trivia_provider::default_category_names;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Configuration for the game actor.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Categories offered by `!trivia`, in menu order. Names must be known
    /// to the question provider or the fetch fails.
    pub categories: Vec<String>,

    /// Difficulty in effect when the actor starts.
    pub difficulty: Difficulty,

    /// Remaining seconds at which the "hurry up" notice is posted.
    pub hurry_at_secs: u32,

    /// How long the "hurry up" notice stays in the channel.
    pub hurry_notice_ttl: Duration,

    /// Wall time of one countdown second. Only tests change this.
    pub tick_interval: Duration,

    /// Capacity of the actor's inbox. Senders wait when it is full.
    pub channel_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            categories: default_category_names(),
            difficulty: Difficulty::default(),
            hurry_at_secs: 10,
            hurry_notice_ttl: Duration::from_secs(5),
            tick_interval: Duration::from_secs(1),
            channel_size: 64,
        }
    }
}

impl GameConfig {
    /// Fix values that would make the game unusable.
    ///
    /// - An empty category list falls back to the default list.
    /// - `channel_size` is at least 1.
    pub fn validated(mut self) -> Self {
        if self.categories.is_empty() {
            tracing::warn!("no categories configured, using defaults");
            self.categories = default_category_names();
        }
        self.channel_size = self.channel_size.max(1);
        self
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the current round is in its lifecycle.
///
/// ```text
/// Idle → AwaitingCategory → Resolving → AwaitingAnswer → Idle
///              ↑ invalid number stays     │ fetch failed → Idle
/// ```
///
/// - **Idle**: no round. Only `!trivia` opens one.
/// - **AwaitingCategory**: the category menu is up; a number picks one.
/// - **Resolving**: a category was picked and the question is being
///   fetched. Numbers are ignored.
/// - **AwaitingAnswer**: question and options are up and the countdown
///   runs; a number answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingCategory,
    Resolving,
    AwaitingAnswer,
}

impl Phase {
    /// Returns `true` if a round is open.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AwaitingCategory => write!(f, "AwaitingCategory"),
            Self::Resolving => write!(f, "Resolving"),
            Self::AwaitingAnswer => write!(f, "AwaitingAnswer"),
        }
    }
}
