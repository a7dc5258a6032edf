//! Integration tests for the game actor, driven through its handle.
//!
//! Tokio's clock is paused: `settle()` lets every task run without moving
//! time, and an explicit `sleep` moves the countdown forward.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trivia_game::{GameConfig, GameError, GameHandle, Phase, SessionSnapshot, spawn_game};
use trivia_protocol::{ChannelId, Difficulty, MessageHandle, Player, PlayerId};
use trivia_provider::{FetchError, Question, QuestionProvider};
use trivia_transport::{ChatTransport, SendOptions, TransportError};

// =========================================================================
// Mock transport: records everything the game does in the channel.
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Out {
    Sent {
        message: MessageHandle,
        text: String,
        delete_after: Option<Duration>,
    },
    Edited {
        message: MessageHandle,
        text: String,
    },
    Deleted {
        message: MessageHandle,
    },
}

#[derive(Clone, Default)]
struct Recorder {
    log: Arc<Mutex<Vec<Out>>>,
    next: Arc<AtomicU64>,
    offline: bool,
}

impl Recorder {
    fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    fn log(&self) -> Vec<Out> {
        self.log.lock().unwrap().clone()
    }

    /// Texts of posted messages, in order.
    fn sent(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Out::Sent { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn last_sent(&self) -> String {
        self.sent().pop().unwrap_or_default()
    }

    fn count_sent(&self, prefix: &str) -> usize {
        self.sent().iter().filter(|t| t.starts_with(prefix)).count()
    }

    /// Handle of the first message posted with exactly `text`.
    fn handle_of(&self, text: &str) -> MessageHandle {
        self.log()
            .into_iter()
            .find_map(|o| match o {
                Out::Sent { message, text: t, .. } if t == text => Some(message),
                _ => None,
            })
            .unwrap()
    }

    fn edits_of(&self, handle: MessageHandle) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Out::Edited { message, text } if message == handle => Some(text),
                _ => None,
            })
            .collect()
    }

    fn was_deleted(&self, handle: MessageHandle) -> bool {
        self.log().contains(&Out::Deleted { message: handle })
    }

    fn push(&self, out: Out) -> Result<(), TransportError> {
        if self.offline {
            return Err(TransportError::ConnectionClosed("offline".into()));
        }
        self.log.lock().unwrap().push(out);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatTransport for Recorder {
    async fn send(
        &self,
        _channel: &ChannelId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageHandle, TransportError> {
        let message = MessageHandle(self.next.fetch_add(1, Ordering::SeqCst));
        self.push(Out::Sent {
            message,
            text: text.to_string(),
            delete_after: options.delete_after,
        })?;
        Ok(message)
    }

    async fn edit(
        &self,
        _channel: &ChannelId,
        message: MessageHandle,
        text: &str,
    ) -> Result<(), TransportError> {
        self.push(Out::Edited {
            message,
            text: text.to_string(),
        })
    }

    async fn delete(
        &self,
        _channel: &ChannelId,
        message: MessageHandle,
    ) -> Result<(), TransportError> {
        self.push(Out::Deleted { message })
    }
}

// =========================================================================
// Mock providers
// =========================================================================

fn napoleon() -> Question {
    Question {
        category: "History".into(),
        text: "Who was crowned Emperor of the French in 1804?".into(),
        correct_answer: "Napoleon".into(),
        incorrect_answers: vec![
            "Caesar".into(),
            "Charlemagne".into(),
            "Louis XIV".into(),
        ],
    }
}

/// Always serves the same question, after an optional delay.
#[derive(Clone, Default)]
struct Fixed {
    requested: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

#[async_trait::async_trait]
impl QuestionProvider for Fixed {
    async fn fetch(&self, category: &str) -> Result<Question, FetchError> {
        self.requested.lock().unwrap().push(category.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Question {
            category: category.to_string(),
            ..napoleon()
        })
    }
}

struct Unavailable;

#[async_trait::async_trait]
impl QuestionProvider for Unavailable {
    async fn fetch(&self, _category: &str) -> Result<Question, FetchError> {
        Err(FetchError::NoResults(1))
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn alice() -> Player {
    Player::new(PlayerId(1), "alice")
}

fn bob() -> Player {
    Player::new(PlayerId(2), "bob")
}

fn start(provider: impl QuestionProvider) -> (GameHandle, Recorder) {
    let transport = Recorder::default();
    let game = spawn_game(
        GameConfig::default(),
        ChannelId::new("trivia"),
        Arc::new(transport.clone()),
        Arc::new(provider),
    );
    (game, transport)
}

/// Runs every ready task without advancing the paused clock.
async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

async fn say(game: &GameHandle, who: &Player, text: &str) {
    game.post(who.clone(), text).await.unwrap();
    settle().await;
}

/// `alice` opens a round and picks History; the question is up afterwards.
async fn open_question(game: &GameHandle) -> SessionSnapshot {
    say(game, &alice(), "!trivia").await;
    say(game, &alice(), "3").await;
    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::AwaitingAnswer);
    snap
}

/// The number to type to pick `answer`.
fn option_number(snap: &SessionSnapshot, answer: &str) -> String {
    let i = snap.options.iter().position(|o| o == answer).unwrap();
    (i + 1).to_string()
}

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_correct_answer_scores_and_stops_timer() {
    let provider = Fixed::default();
    let (game, chat) = start(provider.clone());

    let snap = open_question(&game).await;
    assert_eq!(provider.requested.lock().unwrap().as_slice(), ["History"]);
    assert_eq!(snap.category.as_deref(), Some("History"));
    assert_eq!(snap.options.len(), 4);
    assert_eq!(snap.active_timer_secs, Some(30));

    say(&game, &bob(), &option_number(&snap, "Napoleon")).await;

    let sent = chat.sent();
    assert!(sent[0].starts_with("Choose a trivia category"));
    assert_eq!(sent[1], "You selected: History");
    assert!(sent[2].starts_with(
        "Question: Who was crowned Emperor of the French in 1804?\nOptions:\n1. "
    ));
    assert_eq!(sent[3], "You have 30 seconds to answer starting now!");
    assert_eq!(sent[4], "Correct answer! You earned 1 point.");

    let countdown = chat.handle_of("You have 30 seconds to answer starting now!");
    assert_eq!(
        chat.edits_of(countdown).last().map(String::as_str),
        Some("The timer has been stopped.")
    );
    assert!(chat.was_deleted(countdown));

    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Idle);
    assert_eq!(snap.question, None);
    assert!(snap.options.is_empty());
    assert_eq!(snap.active_timer_secs, None);
    assert_eq!(snap.scores.len(), 1);
    assert_eq!(snap.scores[0].player, PlayerId(2));
    assert_eq!(snap.scores[0].score, 1);

    // Nothing else happens once the timer would have run out.
    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(chat.count_sent("Time's up!"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_answer_discloses_correct_one() {
    let (game, chat) = start(Fixed::default());
    let snap = open_question(&game).await;

    say(&game, &bob(), &option_number(&snap, "Caesar")).await;

    assert_eq!(
        chat.last_sent(),
        "Wrong answer! The correct answer was: Napoleon"
    );
    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Idle);
    assert!(snap.scores.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_with_hurry_notice() {
    let (game, chat) = start(Fixed::default());
    open_question(&game).await;

    tokio::time::sleep(Duration::from_secs(31)).await;
    settle().await;

    let countdown = chat.handle_of("You have 30 seconds to answer starting now!");
    let edits = chat.edits_of(countdown);
    let ticks: Vec<String> = (1..=30)
        .rev()
        .map(|r| format!("You have {r} seconds left"))
        .collect();
    assert_eq!(&edits[..30], ticks.as_slice());
    assert_eq!(edits[30], "Time's up! You can no longer submit answers.");
    assert!(chat.was_deleted(countdown));

    assert!(chat.log().contains(&Out::Sent {
        message: chat.handle_of("Hurry up! Only 10 seconds left!"),
        text: "Hurry up! Only 10 seconds left!".into(),
        delete_after: Some(Duration::from_secs(5)),
    }));
    assert_eq!(chat.count_sent("Hurry up!"), 1);
    assert_eq!(chat.count_sent("Time's up! The correct answer was: Napoleon"), 1);
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Idle);

    // Too late: with no round open the number is just chatter.
    let before = chat.sent().len();
    say(&game, &bob(), "1").await;
    assert_eq!(chat.sent().len(), before);
}

#[tokio::test(start_paused = true)]
async fn test_non_starter_cannot_end_the_game() {
    let (game, chat) = start(Fixed::default());
    open_question(&game).await;

    say(&game, &bob(), "!endgame").await;
    assert_eq!(chat.last_sent(), "Only the game starter can end the game.");
    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::AwaitingAnswer);
    assert_eq!(snap.starter, Some(PlayerId(1)));
    assert_eq!(snap.active_timer_secs, Some(30));

    say(&game, &alice(), "!endgame").await;
    let sent = chat.sent();
    assert!(sent.contains(&"The game has been ended by the game starter.".to_string()));
    assert!(sent.contains(&"The game has ended! No scores to display.".to_string()));

    let countdown = chat.handle_of("You have 30 seconds to answer starting now!");
    assert!(chat.was_deleted(countdown));
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Idle);

    say(&game, &alice(), "!endgame").await;
    assert_eq!(chat.last_sent(), "No game is currently in progress to end.");
}

// =========================================================================
// Properties
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_second_start_is_rejected_without_change() {
    let (game, chat) = start(Fixed::default());
    say(&game, &alice(), "!trivia").await;
    say(&game, &alice(), "!join").await;
    let before = game.snapshot().await.unwrap();

    say(&game, &bob(), "!trivia").await;
    assert_eq!(
        chat.last_sent(),
        "A trivia game is already in progress. Please wait until it finishes."
    );
    assert_eq!(game.snapshot().await.unwrap(), before);
}

#[tokio::test(start_paused = true)]
async fn test_join_twice_keeps_one_entry() {
    let (game, chat) = start(Fixed::default());

    say(&game, &bob(), "!join").await;
    assert_eq!(
        chat.last_sent(),
        "No game is currently in progress. Start a new game with !trivia."
    );

    say(&game, &alice(), "!trivia").await;
    say(&game, &bob(), "!join").await;
    assert_eq!(chat.last_sent(), "bob has joined the game!");
    say(&game, &bob(), "!join").await;
    assert_eq!(chat.last_sent(), "bob, you are already in the game!");

    assert_eq!(game.snapshot().await.unwrap().players, vec![PlayerId(2)]);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_replies_keep_the_round_going() {
    let (game, chat) = start(Fixed::default());

    say(&game, &alice(), "!trivia").await;
    say(&game, &alice(), "99").await;
    assert_eq!(
        chat.last_sent(),
        "Invalid selection. Please choose a valid number from the list."
    );
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::AwaitingCategory);

    say(&game, &alice(), "3").await;
    say(&game, &bob(), "7").await;
    assert_eq!(
        chat.last_sent(),
        "Invalid option number. Please select a valid option."
    );
    say(&game, &bob(), "  Napoleon  ").await;
    assert_eq!(
        chat.last_sent(),
        "Please respond with the number corresponding to your answer choice."
    );

    // The countdown carried on regardless.
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    settle().await;
    let countdown = chat.handle_of("You have 30 seconds to answer starting now!");
    assert!(chat
        .edits_of(countdown)
        .contains(&"You have 25 seconds left".to_string()));
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::AwaitingAnswer);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_abandons_round() {
    let (game, chat) = start(Unavailable);

    say(&game, &alice(), "!trivia").await;
    say(&game, &alice(), "1").await;

    assert_eq!(
        chat.sent()[1..],
        [
            "You selected: General Knowledge".to_string(),
            "Failed to fetch a trivia question. Please try again.".to_string(),
        ]
    );
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Idle);

    // A new round can be started right away.
    say(&game, &bob(), "!trivia").await;
    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::AwaitingCategory);
    assert_eq!(snap.starter, Some(PlayerId(2)));
}

#[tokio::test(start_paused = true)]
async fn test_question_for_ended_round_is_discarded() {
    let provider = Fixed {
        delay: Some(Duration::from_secs(3)),
        ..Default::default()
    };
    let (game, chat) = start(provider);

    say(&game, &alice(), "!trivia").await;
    say(&game, &alice(), "3").await;
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Resolving);

    // Numbers are ignored while the question is on its way.
    let before = chat.sent().len();
    say(&game, &bob(), "2").await;
    assert_eq!(chat.sent().len(), before);

    say(&game, &alice(), "!endgame").await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;

    assert_eq!(chat.count_sent("Question:"), 0);
    assert_eq!(chat.count_sent("You have"), 0);
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_difficulty_change_waits_for_next_question() {
    let (game, chat) = start(Fixed::default());
    let snap = open_question(&game).await;

    say(&game, &bob(), "!hard").await;
    assert_eq!(
        chat.last_sent(),
        "You have chosen Hard mode. You have 15 seconds per question!"
    );
    let during = game.snapshot().await.unwrap();
    assert_eq!(during.difficulty, Difficulty::Hard);
    assert_eq!(during.active_timer_secs, Some(30));

    say(&game, &bob(), &option_number(&snap, "Napoleon")).await;
    let next = open_question(&game).await;
    assert_eq!(next.active_timer_secs, Some(15));
    assert_eq!(chat.count_sent("You have 15 seconds to answer starting now!"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_score_counts_correct_answers_until_end_game() {
    let (game, chat) = start(Fixed::default());

    for answer in ["Napoleon", "Caesar", "NAPOLEON"] {
        let snap = open_question(&game).await;
        let pick = snap
            .options
            .iter()
            .position(|o| o.eq_ignore_ascii_case(answer))
            .unwrap();
        say(&game, &bob(), &(pick + 1).to_string()).await;
    }

    say(&game, &bob(), "!score").await;
    assert_eq!(chat.last_sent(), "bob, your current score is: 2");
    say(&game, &alice(), "!score").await;
    assert_eq!(chat.last_sent(), "alice, your current score is: 0");

    say(&game, &alice(), "!trivia").await;
    say(&game, &alice(), "!standings").await;
    assert_eq!(chat.last_sent(), "Current standings:\n1. bob: 2 points");

    say(&game, &alice(), "!endgame").await;
    assert_eq!(
        chat.last_sent(),
        "The game has ended! Final rankings:\n1. bob: 2 points"
    );
    say(&game, &bob(), "!score").await;
    assert_eq!(chat.last_sent(), "bob, your current score is: 0");
}

#[tokio::test(start_paused = true)]
async fn test_answer_at_expiry_instant_applies_once() {
    for offset_ms in [29_999, 30_000, 30_001] {
        let (game, chat) = start(Fixed::default());
        let snap = open_question(&game).await;

        tokio::time::sleep(Duration::from_millis(offset_ms)).await;
        game.post(bob(), option_number(&snap, "Napoleon")).await.unwrap();
        settle().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;

        let correct = chat.count_sent("Correct answer!");
        let timed_out = chat.count_sent("Time's up! The correct answer was");
        assert_eq!(correct + timed_out, 1, "offset {offset_ms}ms");

        let snap = game.snapshot().await.unwrap();
        assert_eq!(snap.phase, Phase::Idle);
        let score = snap.scores.first().map_or(0, |e| e.score) as usize;
        assert_eq!(score, correct);
    }
}

#[tokio::test(start_paused = true)]
async fn test_help_lists_commands() {
    let (game, chat) = start(Fixed::default());
    say(&game, &alice(), "!help").await;
    assert!(chat.last_sent().starts_with("!help = Shows all commands"));
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Idle);
}

// =========================================================================
// Lifecycle
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_transport_failures_do_not_stop_the_game() {
    let game = spawn_game(
        GameConfig::default(),
        ChannelId::new("trivia"),
        Arc::new(Recorder::offline()),
        Arc::new(Fixed::default()),
    );

    say(&game, &alice(), "!trivia").await;
    say(&game, &alice(), "3").await;
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::AwaitingAnswer);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_the_handle() {
    let (game, chat) = start(Fixed::default());
    open_question(&game).await;

    game.shutdown().await.unwrap();
    settle().await;

    assert!(matches!(
        game.post(alice(), "!trivia").await,
        Err(GameError::Unavailable)
    ));
    assert!(matches!(game.snapshot().await, Err(GameError::Unavailable)));

    let countdown = chat.handle_of("You have 30 seconds to answer starting now!");
    assert!(chat.was_deleted(countdown));
}
