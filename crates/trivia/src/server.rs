//! `TriviaBot` builder and accept loop.
//!
//! Ties the layers together: WebSocket clients → gateway handler → game
//! actor → broadcast channel → every client.

use std::sync::Arc;

use trivia_game::{GameConfig, GameHandle, spawn_game};
use trivia_protocol::{ChannelId, JsonCodec};
use trivia_provider::{OpenTdbProvider, ProviderConfig, QuestionProvider};
use trivia_transport::{BroadcastTransport, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{BotConfig, TriviaError};

/// Author name on every message the game posts.
pub const BOT_NAME: &str = "trivia-bot";

/// Events buffered per client before it counts as lagging.
const EVENT_BUFFER: usize = 256;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) chat: BroadcastTransport,
    pub(crate) game: GameHandle,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a trivia bot.
///
/// # Example
///
/// ```rust,ignore
/// use trivia::prelude::*;
///
/// let bot = TriviaBot::builder()
///     .bind("0.0.0.0:8080")
///     .channel("trivia")
///     .build()
///     .await?;
/// bot.run().await
/// ```
pub struct TriviaBotBuilder {
    bind_addr: String,
    channel: ChannelId,
    game_config: GameConfig,
    provider_config: ProviderConfig,
    provider: Option<Arc<dyn QuestionProvider>>,
}

impl TriviaBotBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            channel: ChannelId::new("trivia"),
            game_config: GameConfig::default(),
            provider_config: ProviderConfig::default(),
            provider: None,
        }
    }

    /// Applies everything in a [`BotConfig`].
    pub fn config(self, config: &BotConfig) -> Self {
        self.bind(&config.bind)
            .channel(&config.channel)
            .game_config(config.game_config())
            .provider_config(config.provider_config())
    }

    /// Sets the address to bind the gateway to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the channel the game plays in.
    pub fn channel(mut self, name: &str) -> Self {
        self.channel = ChannelId::new(name);
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Settings for the default Open Trivia DB provider.
    pub fn provider_config(mut self, config: ProviderConfig) -> Self {
        self.provider_config = config;
        self
    }

    /// Uses `provider` instead of the Open Trivia DB.
    pub fn provider(mut self, provider: impl QuestionProvider) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Binds the gateway and starts the game.
    pub async fn build(self) -> Result<TriviaBot, TriviaError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let provider = match self.provider {
            Some(provider) => provider,
            None => Arc::new(OpenTdbProvider::new(self.provider_config)?),
        };
        let chat = BroadcastTransport::new(BOT_NAME, EVENT_BUFFER);
        let game = spawn_game(
            self.game_config,
            self.channel,
            Arc::new(chat.clone()),
            provider,
        );

        Ok(TriviaBot {
            transport,
            state: Arc::new(ServerState {
                chat,
                game,
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for TriviaBotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A trivia bot with its gateway bound and its game running.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TriviaBot {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TriviaBot {
    /// Creates a new builder.
    pub fn builder() -> TriviaBotBuilder {
        TriviaBotBuilder::new()
    }

    /// Returns the local address the gateway is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Handle to the running game.
    pub fn game(&self) -> &GameHandle {
        &self.state.game
    }

    /// Runs the accept loop, spawning a handler task per client. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), TriviaError> {
        tracing::info!(channel = %self.state.game.channel(), "trivia bot running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
