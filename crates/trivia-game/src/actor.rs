//! Game actor: the Tokio task that owns the [`GameSession`].
//!
//! Chat lines arrive through a bounded mpsc inbox and are applied one at a
//! time. Work that takes a while runs elsewhere and reports back through a
//! second channel: the question fetch runs in a spawned task, the countdown
//! runs in the round timer's task. Both tag their report with the round it
//! belongs to, so every state change still happens here, in order.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use trivia_protocol::{ChannelId, Command, Player};
use trivia_provider::{FetchError, Question, QuestionProvider};
use trivia_timer::{RoundTimer, TimerConfig, TimerHandle};
use trivia_transport::{ChatTransport, SendOptions};

use crate::{
    Action, ActiveQuestion, ChannelCountdown, GameConfig, GameError,
    GameSession, RoundId, SessionSnapshot,
};

/// Requests from the outside world.
pub(crate) enum GameCommand {
    /// A line typed in the game's channel.
    Message { author: Player, text: String },

    /// Request a view of the session.
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },

    /// Stop the actor. A running countdown is stopped with it.
    Shutdown,
}

/// Completions of work the actor started.
#[derive(Debug)]
enum RoundEvent {
    Fetched {
        round: RoundId,
        result: Result<Question, FetchError>,
    },
    Expired(RoundId),
}

/// Handle to a running game actor.
///
/// Cheap to clone. The game stops once every handle is dropped or
/// [`shutdown`](Self::shutdown) is called.
#[derive(Clone)]
pub struct GameHandle {
    channel: ChannelId,
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    /// The channel this game plays in.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Delivers a chat line from `author` (fire-and-forget).
    pub async fn post(
        &self,
        author: Player,
        text: impl Into<String>,
    ) -> Result<(), GameError> {
        self.sender
            .send(GameCommand::Message {
                author,
                text: text.into(),
            })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Requests a view of the current session.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable)?;
        reply_rx.await.map_err(|_| GameError::Unavailable)
    }

    /// Tells the game to stop.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.sender
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| GameError::Unavailable)
    }
}

/// Spawns the game actor for `channel` and returns its handle.
pub fn spawn_game(
    config: GameConfig,
    channel: ChannelId,
    transport: Arc<dyn ChatTransport>,
    provider: Arc<dyn QuestionProvider>,
) -> GameHandle {
    let config = config.validated();
    let (sender, receiver) = mpsc::channel(config.channel_size);
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let actor = GameActor {
        session: GameSession::new(&config),
        config,
        channel: channel.clone(),
        transport,
        provider,
        receiver,
        events_tx,
        events_rx,
    };
    tokio::spawn(actor.run());

    GameHandle { channel, sender }
}

struct GameActor {
    session: GameSession,
    config: GameConfig,
    channel: ChannelId,
    transport: Arc<dyn ChatTransport>,
    provider: Arc<dyn QuestionProvider>,
    receiver: mpsc::Receiver<GameCommand>,
    /// Kept so `events_rx` never reports closed.
    events_tx: mpsc::UnboundedSender<RoundEvent>,
    events_rx: mpsc::UnboundedReceiver<RoundEvent>,
}

impl GameActor {
    async fn run(mut self) {
        tracing::info!(channel = %self.channel, "game actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(GameCommand::Message { author, text }) => {
                        self.handle_message(author, text).await;
                    }
                    Some(GameCommand::Snapshot { reply }) => {
                        let _ = reply.send(self.session.snapshot());
                    }
                    Some(GameCommand::Shutdown) | None => break,
                },
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event).await;
                }
            }
        }

        tracing::info!(channel = %self.channel, "game actor stopped");
    }

    async fn handle_message(&mut self, author: Player, text: String) {
        let command = Command::parse(&text);
        match self.session.handle(&author, command) {
            Ok(Action::Reply(lines)) => {
                for line in &lines {
                    self.say(line).await;
                }
            }
            Ok(Action::Fetch {
                round,
                category,
                reply,
            }) => {
                self.say(&reply).await;
                self.spawn_fetch(round, category);
            }
            Ok(Action::Ignore) => {}
            Err(e) => {
                tracing::debug!(player = %author.id, error = %e, "command rejected");
                self.say(&e.to_string()).await;
            }
        }
    }

    async fn handle_event(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::Fetched {
                round,
                result: Ok(question),
            } => {
                if !self.session.is_resolving(round) {
                    tracing::debug!(%round, "stale question discarded");
                    return;
                }
                let question =
                    ActiveQuestion::shuffled(question, &mut rand::rng());
                self.say(&question.render()).await;
                let timer = self.start_timer(round);
                if self.session.begin_question(round, question, timer) {
                    tracing::info!(
                        %round,
                        time_limit = self.session.time_limit_secs(),
                        "question posted"
                    );
                }
            }
            RoundEvent::Fetched {
                round,
                result: Err(e),
            } => {
                if !self.session.abandon(round) {
                    tracing::debug!(%round, error = %e, "stale fetch failure discarded");
                    return;
                }
                tracing::warn!(%round, error = %e, "question fetch failed");
                let reply = GameError::FetchFailure(e).to_string();
                self.say(&reply).await;
            }
            RoundEvent::Expired(round) => match self.session.expire(round) {
                Some(text) => {
                    tracing::info!(%round, "round timed out");
                    self.say(&text).await;
                }
                None => tracing::debug!(%round, "late expiry ignored"),
            },
        }
    }

    fn spawn_fetch(&self, round: RoundId, category: String) {
        let provider = Arc::clone(&self.provider);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = provider.fetch(&category).await;
            let _ = events.send(RoundEvent::Fetched { round, result });
        });
    }

    fn start_timer(&self, round: RoundId) -> TimerHandle {
        let config = TimerConfig {
            duration_secs: self.session.time_limit_secs(),
            tick_interval: self.config.tick_interval,
            hurry_at_secs: self.config.hurry_at_secs,
        };
        let sink = ChannelCountdown::new(
            Arc::clone(&self.transport),
            self.channel.clone(),
            self.config.hurry_notice_ttl,
        );
        let events = self.events_tx.clone();
        RoundTimer::start(config, sink, move || {
            let _ = events.send(RoundEvent::Expired(round));
        })
    }

    async fn say(&self, text: &str) {
        let sent = self
            .transport
            .send(&self.channel, text, SendOptions::default())
            .await;
        if let Err(e) = sent {
            tracing::warn!(channel = %self.channel, error = %e, "failed to post message");
        }
    }
}
