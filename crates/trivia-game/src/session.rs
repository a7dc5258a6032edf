//! The round state machine.
//!
//! [`GameSession`] is plain synchronous state: it turns `(phase, command)`
//! into an [`Action`] for the actor to carry out. Everything asynchronous
//! (fetching, counting down, posting) happens in the actor, which reports
//! back through [`GameSession::begin_question`], [`GameSession::abandon`]
//! and [`GameSession::expire`]. Those take the [`RoundId`] the work was
//! started for, so a result that arrives after its round is over is
//! simply ignored.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use trivia_protocol::{Command, Difficulty, Player, PlayerId};
use trivia_provider::Question;
use trivia_timer::TimerHandle;

use crate::{GameConfig, GameError, LedgerEntry, Phase, ScoreLedger};

/// Identifies one round, from `!trivia` until it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundId(pub u64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A question as shown to the players: options numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuestion {
    pub text: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

impl ActiveQuestion {
    /// Mixes the correct answer in with the wrong ones.
    pub fn shuffled<R: Rng + ?Sized>(question: Question, rng: &mut R) -> Self {
        let mut options = question.incorrect_answers;
        options.push(question.correct_answer.clone());
        options.shuffle(rng);
        Self {
            text: question.text,
            correct_answer: question.correct_answer,
            options,
        }
    }

    /// `Question: ...` followed by the numbered options.
    pub fn render(&self) -> String {
        let mut out = format!("Question: {}\nOptions:", self.text);
        for (i, option) in self.options.iter().enumerate() {
            out.push_str(&format!("\n{}. {}", i + 1, option));
        }
        out
    }

    /// The option shown as number `n`.
    pub fn option(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer.to_lowercase() == self.correct_answer.to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// Each stage carries exactly the fields that are valid in it.
#[derive(Debug)]
enum Stage {
    AwaitingCategory,
    Resolving {
        category: String,
    },
    AwaitingAnswer {
        category: String,
        question: ActiveQuestion,
        timer: TimerHandle,
    },
}

#[derive(Debug)]
struct Round {
    id: RoundId,
    starter: Player,
    stage: Stage,
}

impl Round {
    fn phase(&self) -> Phase {
        match self.stage {
            Stage::AwaitingCategory => Phase::AwaitingCategory,
            Stage::Resolving { .. } => Phase::Resolving,
            Stage::AwaitingAnswer { .. } => Phase::AwaitingAnswer,
        }
    }

    /// Stops the countdown, if one runs. The round is dropped right after.
    fn close(mut self) {
        if let Stage::AwaitingAnswer { timer, .. } = &mut self.stage {
            timer.cancel();
        }
    }
}

/// What the actor should do after a command was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Post these messages, in order.
    Reply(Vec<String>),
    /// Post `reply`, then fetch a question in `category` for `round`.
    Fetch {
        round: RoundId,
        category: String,
        reply: String,
    },
    /// Say nothing.
    Ignore,
}

impl Action {
    fn say(text: impl Into<String>) -> Self {
        Self::Reply(vec![text.into()])
    }
}

/// Read-only view of the session, for tests and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub round: Option<RoundId>,
    pub starter: Option<PlayerId>,
    pub category: Option<String>,
    pub question: Option<String>,
    pub options: Vec<String>,
    pub players: Vec<PlayerId>,
    /// Scores, highest first.
    pub scores: Vec<LedgerEntry>,
    pub difficulty: Difficulty,
    /// Length of the running countdown, if a question is up.
    pub active_timer_secs: Option<u32>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// All game state of the room: the open round (if any), who joined, the
/// scores and the difficulty.
#[derive(Debug)]
pub struct GameSession {
    round: Option<Round>,
    players: Vec<Player>,
    ledger: ScoreLedger,
    difficulty: Difficulty,
    categories: Vec<String>,
    next_round: u64,
}

impl GameSession {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            round: None,
            players: Vec::new(),
            ledger: ScoreLedger::new(),
            difficulty: config.difficulty,
            categories: config.categories.clone(),
            next_round: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.round.as_ref().map_or(Phase::Idle, Round::phase)
    }

    /// Seconds the next question's countdown will run for.
    pub fn time_limit_secs(&self) -> u32 {
        self.difficulty.time_limit_secs()
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// Applies one command from `author`.
    ///
    /// # Errors
    /// Rejections leave the session unchanged; the error's text is the
    /// reply for the channel.
    pub fn handle(
        &mut self,
        author: &Player,
        command: Command,
    ) -> Result<Action, GameError> {
        match (self.phase(), command) {
            (Phase::Idle, Command::Start) => Ok(self.open_round(author)),
            (_, Command::Start) => Err(GameError::AlreadyInProgress),

            (Phase::Idle, Command::End) => Err(GameError::NothingToEnd),
            (_, Command::End) => self.end_game(author),

            (Phase::Idle, Command::Join | Command::Standings) => {
                Err(GameError::NoActiveGame)
            }
            (_, Command::Join) => Ok(self.join(author)),
            (_, Command::Standings) => Ok(self.standings()),

            (_, Command::Score) => Ok(Action::say(format!(
                "{}, your current score is: {}",
                author.name,
                self.ledger.get(author.id)
            ))),
            (_, Command::Help) => Ok(Action::say(Command::help_text())),
            (_, Command::SetDifficulty(difficulty)) => {
                Ok(self.set_difficulty(difficulty))
            }

            (Phase::AwaitingCategory, Command::Number(n)) => {
                self.select_category(n)
            }
            (Phase::AwaitingAnswer, Command::Number(n)) => self.answer(author, n),
            (Phase::AwaitingAnswer, Command::Text(_)) => {
                Err(GameError::MalformedReply)
            }
            (_, Command::Number(_) | Command::Text(_)) => Ok(Action::Ignore),
        }
    }

    fn open_round(&mut self, author: &Player) -> Action {
        let id = RoundId(self.next_round);
        self.next_round += 1;
        self.round = Some(Round {
            id,
            starter: author.clone(),
            stage: Stage::AwaitingCategory,
        });
        tracing::info!(round = %id, starter = %author.id, "round opened");

        let mut menu = String::from(
            "Choose a trivia category by typing the corresponding number:",
        );
        for (i, category) in self.categories.iter().enumerate() {
            menu.push_str(&format!("\n{}. {}", i + 1, category));
        }
        Action::Reply(vec![menu])
    }

    fn end_game(&mut self, author: &Player) -> Result<Action, GameError> {
        let Some(round) = self.round.as_ref() else {
            return Err(GameError::NothingToEnd);
        };
        if round.starter.id != author.id {
            return Err(GameError::UnauthorizedAction);
        }

        let rankings = match self.ledger.rankings() {
            Some(r) => format!("The game has ended! Final rankings:\n{r}"),
            None => "The game has ended! No scores to display.".to_string(),
        };
        self.reset();
        self.players.clear();
        self.ledger.clear();
        tracing::info!(player = %author.id, "game ended by starter");

        Ok(Action::Reply(vec![
            "The game has been ended by the game starter.".to_string(),
            rankings,
        ]))
    }

    fn join(&mut self, author: &Player) -> Action {
        if self.players.iter().any(|p| p.id == author.id) {
            return Action::say(format!(
                "{}, you are already in the game!",
                author.name
            ));
        }
        self.players.push(author.clone());
        tracing::debug!(player = %author.id, players = self.players.len(), "player joined");
        Action::say(format!("{} has joined the game!", author.name))
    }

    fn standings(&self) -> Action {
        match self.ledger.rankings() {
            Some(r) => Action::say(format!("Current standings:\n{r}")),
            None => Action::say(
                "No scores to display yet. Start answering questions to earn points!",
            ),
        }
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) -> Action {
        self.difficulty = difficulty;
        Action::say(format!(
            "You have chosen {} mode. You have {} seconds per question!",
            difficulty,
            difficulty.time_limit_secs()
        ))
    }

    fn select_category(&mut self, n: usize) -> Result<Action, GameError> {
        let category = n
            .checked_sub(1)
            .and_then(|i| self.categories.get(i))
            .cloned()
            .ok_or(GameError::InvalidSelection)?;
        let round = self.round.as_mut().ok_or(GameError::NoActiveGame)?;

        round.stage = Stage::Resolving {
            category: category.clone(),
        };
        Ok(Action::Fetch {
            round: round.id,
            reply: format!("You selected: {category}"),
            category,
        })
    }

    fn answer(&mut self, author: &Player, n: usize) -> Result<Action, GameError> {
        let Some(Round {
            stage: Stage::AwaitingAnswer { question, .. },
            ..
        }) = self.round.as_ref()
        else {
            return Ok(Action::Ignore);
        };
        let chosen = question.option(n).ok_or(GameError::InvalidOption)?;

        let reply = if question.is_correct(chosen) {
            let score = self.ledger.increment(author);
            tracing::info!(player = %author.id, score, "correct answer");
            "Correct answer! You earned 1 point.".to_string()
        } else {
            format!(
                "Wrong answer! The correct answer was: {}",
                question.correct_answer
            )
        };
        self.reset();
        Ok(Action::say(reply))
    }

    // -- completions from the actor ---------------------------------------

    /// Whether `round` is still waiting for its question.
    pub fn is_resolving(&self, round: RoundId) -> bool {
        matches!(
            &self.round,
            Some(Round { id, stage: Stage::Resolving { .. }, .. }) if *id == round
        )
    }

    /// Puts the fetched question up with its running countdown.
    ///
    /// Returns `false` (and stops `timer`) if `round` is no longer
    /// resolving.
    pub fn begin_question(
        &mut self,
        round: RoundId,
        question: ActiveQuestion,
        mut timer: TimerHandle,
    ) -> bool {
        let Some(current) = self.round.as_mut().filter(|r| r.id == round) else {
            timer.cancel();
            return false;
        };
        let Stage::Resolving { category } = &mut current.stage else {
            timer.cancel();
            return false;
        };

        let category = std::mem::take(category);
        current.stage = Stage::AwaitingAnswer {
            category,
            question,
            timer,
        };
        true
    }

    /// The fetch for `round` failed. Returns `true` if that closed the round.
    pub fn abandon(&mut self, round: RoundId) -> bool {
        if !self.is_resolving(round) {
            return false;
        }
        self.reset();
        true
    }

    /// The countdown for `round` ran out. Returns the timeout message, or
    /// `None` if the round was already resolved.
    pub fn expire(&mut self, round: RoundId) -> Option<String> {
        let Some(Round {
            id,
            stage: Stage::AwaitingAnswer { question, .. },
            ..
        }) = &self.round
        else {
            return None;
        };
        if *id != round {
            return None;
        }

        let text = format!(
            "Time's up! The correct answer was: {}",
            question.correct_answer
        );
        self.reset();
        Some(text)
    }

    /// Closes the open round. Players and scores stay.
    fn reset(&mut self) {
        if let Some(round) = self.round.take() {
            tracing::info!(round = %round.id, "round closed");
            round.close();
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let stage = self.round.as_ref().map(|r| &r.stage);
        let (category, question, active_timer_secs) = match stage {
            Some(Stage::Resolving { category }) => {
                (Some(category.clone()), None, None)
            }
            Some(Stage::AwaitingAnswer {
                category,
                question,
                timer,
            }) => (
                Some(category.clone()),
                Some(question),
                Some(timer.duration_secs()),
            ),
            Some(Stage::AwaitingCategory) | None => (None, None, None),
        };

        SessionSnapshot {
            phase: self.phase(),
            round: self.round.as_ref().map(|r| r.id),
            starter: self.round.as_ref().map(|r| r.starter.id),
            category,
            question: question.map(|q| q.text.clone()),
            options: question.map(|q| q.options.clone()).unwrap_or_default(),
            players: self.players.iter().map(|p| p.id).collect(),
            scores: self.ledger.snapshot(),
            difficulty: self.difficulty,
            active_timer_secs,
        }
    }
}
