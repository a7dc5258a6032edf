//! Renders a round countdown as a single, live-edited chat message.

use std::sync::Arc;
use std::time::Duration;

use trivia_protocol::{ChannelId, MessageHandle};
use trivia_timer::{CountdownError, CountdownSink, TimerOutcome};
use trivia_transport::{ChatTransport, SendOptions, TransportError};

/// [`CountdownSink`] that posts the countdown in a channel.
///
/// `started` posts the message, every tick edits it, and `finish` edits in
/// a closing line and removes it. The "hurry up" notice is a separate
/// message that removes itself after `hurry_ttl`.
pub struct ChannelCountdown {
    transport: Arc<dyn ChatTransport>,
    channel: ChannelId,
    message: Option<MessageHandle>,
    hurry_ttl: Duration,
}

impl ChannelCountdown {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        channel: ChannelId,
        hurry_ttl: Duration,
    ) -> Self {
        Self {
            transport,
            channel,
            message: None,
            hurry_ttl,
        }
    }
}

fn sink_error(e: TransportError) -> CountdownError {
    CountdownError(e.to_string())
}

#[async_trait::async_trait]
impl CountdownSink for ChannelCountdown {
    async fn started(&mut self, duration_secs: u32) -> Result<(), CountdownError> {
        let text =
            format!("You have {duration_secs} seconds to answer starting now!");
        let handle = self
            .transport
            .send(&self.channel, &text, SendOptions::default())
            .await
            .map_err(sink_error)?;
        self.message = Some(handle);
        Ok(())
    }

    async fn tick(&mut self, remaining: u32) -> Result<(), CountdownError> {
        let Some(message) = self.message else {
            return Err(CountdownError("countdown message was never posted".into()));
        };
        self.transport
            .edit(
                &self.channel,
                message,
                &format!("You have {remaining} seconds left"),
            )
            .await
            .map_err(sink_error)
    }

    async fn hurry(&mut self, remaining: u32) -> Result<(), CountdownError> {
        self.transport
            .send(
                &self.channel,
                &format!("Hurry up! Only {remaining} seconds left!"),
                SendOptions::delete_after(self.hurry_ttl),
            )
            .await
            .map(|_| ())
            .map_err(sink_error)
    }

    async fn finish(&mut self, outcome: TimerOutcome) -> Result<(), CountdownError> {
        let Some(message) = self.message.take() else {
            return Ok(());
        };
        let text = match outcome {
            TimerOutcome::Expired => "Time's up! You can no longer submit answers.",
            TimerOutcome::Stopped | TimerOutcome::Faulted => {
                "The timer has been stopped."
            }
        };
        // Remove the message even if the final edit didn't land.
        let edited = self.transport.edit(&self.channel, message, text).await;
        self.transport
            .delete(&self.channel, message)
            .await
            .map_err(sink_error)?;
        edited.map_err(sink_error)
    }
}
