//! Per-connection handler: greeting and chat relay.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `Hello { name }` → send `Welcome { player_id }`
//!   2. Loop: a `Say` is shown to everyone and handed to the game; every
//!      event in the game's channel is forwarded to this client

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use trivia_protocol::{
    ClientFrame, Codec, Player, PlayerId, ProtocolError, ServerFrame,
};
use trivia_transport::{Connection, WebSocketConnection};

use crate::TriviaError;
use crate::server::ServerState;

/// How long a new client has to introduce itself.
const HELLO_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), TriviaError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let name = receive_hello(&conn, &state).await?;
    let player = Player::new(PlayerId(conn_id.into_inner()), name);

    // Subscribe before the Welcome so nothing posted after it is missed.
    let mut events = state.chat.subscribe();
    send_frame(&conn, &state, &ServerFrame::Welcome { player_id: player.id })
        .await?;
    tracing::info!(%conn_id, player = %player.id, name = %player.name, "player connected");

    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(player = %player.id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(player = %player.id, error = %e, "recv error");
                        break;
                    }
                };
                handle_frame(&conn, &state, &player, &data).await?;
            }
            event = events.recv() => match event {
                Ok(event) if event.channel() == state.game.channel() => {
                    send_frame(&conn, &state, &ServerFrame::from(event)).await?;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(player = %player.id, skipped, "client fell behind, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

/// Waits for the first frame, which must be a `Hello` with a non-blank name.
async fn receive_hello(
    conn: &WebSocketConnection,
    state: &ServerState,
) -> Result<String, TriviaError> {
    let data = match tokio::time::timeout(HELLO_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidFrame(
                "connection closed before Hello".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(TriviaError::Transport(e)),
        Err(_) => {
            return Err(
                ProtocolError::InvalidFrame("Hello timed out".into()).into()
            );
        }
    };

    match state.codec.decode::<ClientFrame>(&data) {
        Ok(ClientFrame::Hello { name }) if !name.trim().is_empty() => {
            Ok(name.trim().to_string())
        }
        _ => {
            send_error(conn, state, "first frame must be Hello with a name")
                .await?;
            Err(ProtocolError::InvalidFrame("first frame must be Hello".into())
                .into())
        }
    }
}

/// A frame after the greeting.
async fn handle_frame(
    conn: &WebSocketConnection,
    state: &ServerState,
    player: &Player,
    data: &[u8],
) -> Result<(), TriviaError> {
    match state.codec.decode::<ClientFrame>(data) {
        Ok(ClientFrame::Say { text }) => {
            state.chat.relay(state.game.channel(), &player.name, &text);
            state.game.post(player.clone(), text).await?;
        }
        Ok(ClientFrame::Hello { .. }) => {
            send_error(conn, state, "already introduced").await?;
        }
        Err(e) => {
            tracing::debug!(player = %player.id, error = %e, "failed to decode frame");
            send_error(conn, state, &e.to_string()).await?;
        }
    }
    Ok(())
}

async fn send_frame(
    conn: &WebSocketConnection,
    state: &ServerState,
    frame: &ServerFrame,
) -> Result<(), TriviaError> {
    let bytes = state.codec.encode(frame)?;
    conn.send(&bytes).await?;
    Ok(())
}

async fn send_error(
    conn: &WebSocketConnection,
    state: &ServerState,
    message: &str,
) -> Result<(), TriviaError> {
    let frame = ServerFrame::Error {
        message: message.to_string(),
    };
    send_frame(conn, state, &frame).await
}
