//! Parsing chat lines into game commands.
//!
//! Every line typed in the channel becomes exactly one [`Command`]. Prefixed
//! tokens (`!trivia`, `!join`, ...) always win; only lines that match no
//! token are read as a number or as free text. What a number *means* is not
//! decided here: the game picks category-vs-answer from its current phase.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Answer-time setting. Takes effect from the next question on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Seconds a player gets to answer a question.
    pub fn time_limit_secs(self) -> u32 {
        match self {
            Self::Easy => 45,
            Self::Medium => 30,
            Self::Hard => 15,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

/// Returned when a difficulty name is not `easy`, `medium` or `hard`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty {0:?} (expected easy, medium or hard)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// The closed set of meanings a chat line can have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!trivia`: open a round and offer the categories.
    Start,
    /// `!endgame`: starter-only: end the game and report final standings.
    End,
    /// `!standings`: current scores, highest first.
    Standings,
    /// `!score`: the caller's own score.
    Score,
    /// `!join`: join the active game.
    Join,
    /// `!help`: list the commands.
    Help,
    /// `!easy`, `!medium`, `!hard`.
    SetDifficulty(Difficulty),
    /// All ASCII digits. 1-based; values too large for `usize` saturate so
    /// they still read as "out of range".
    Number(usize),
    /// Anything else, already trimmed.
    Text(String),
}

/// Prefix table, checked in order. Case-sensitive.
const PREFIXES: &[(&str, Command)] = &[
    ("!trivia", Command::Start),
    ("!standings", Command::Standings),
    ("!endgame", Command::End),
    ("!help", Command::Help),
    ("!hard", Command::SetDifficulty(Difficulty::Hard)),
    ("!medium", Command::SetDifficulty(Difficulty::Medium)),
    ("!easy", Command::SetDifficulty(Difficulty::Easy)),
    ("!join", Command::Join),
    ("!score", Command::Score),
];

impl Command {
    /// Parses one chat line. Never fails: unknown input is [`Command::Text`].
    pub fn parse(line: &str) -> Self {
        let content = line.trim();

        if let Some((_, cmd)) =
            PREFIXES.iter().find(|(token, _)| content.starts_with(token))
        {
            return cmd.clone();
        }

        if !content.is_empty() && content.bytes().all(|b| b.is_ascii_digit())
        {
            return Self::Number(content.parse().unwrap_or(usize::MAX));
        }

        Self::Text(content.to_string())
    }

    /// Text shown by `!help`.
    pub fn help_text() -> &'static str {
        "!help = Shows all commands\n\
         !trivia = Start a new trivia game\n\
         !score = Show your current score\n\
         !join = Join an in-progress trivia game\n\
         !standings = Show the current standings\n\
         !endgame = End the game (game starter only)\n\
         !easy / !medium / !hard = Answer time of 45 / 30 / 15 seconds"
    }
}
