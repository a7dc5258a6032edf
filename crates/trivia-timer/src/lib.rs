//! Per-question countdown for the trivia room.
//!
//! A [`RoundTimer`] counts one question's answer window down in whole
//! seconds on its own Tokio task. It knows nothing about the game: it
//! reports elapsed time to a [`CountdownSink`] (which renders the live
//! countdown) and, on natural expiry only, calls the `on_expire` callback
//! exactly once. What expiry *means* is decided by whoever receives that
//! callback.
//!
//! # Terminal outcomes
//!
//! Every timer ends in exactly one [`TimerOutcome`]:
//!
//! - `Expired`: the countdown reached zero; `on_expire` ran.
//! - `Stopped`: [`TimerHandle::cancel`] was called (or the handle was
//!   dropped) first; `on_expire` never runs.
//! - `Faulted`: the sink failed mid-countdown; logged, `on_expire` never
//!   runs.
//!
//! # Integration
//!
//! ```ignore
//! let tx = events_tx.clone();
//! let handle = RoundTimer::start(TimerConfig::with_duration(30), sink, move || {
//!     let _ = tx.send(RoundEvent::Expired(round));
//! });
//! // ... later, if the question is answered first:
//! handle.cancel();
//! ```

use std::fmt;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a single countdown.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Length of the answer window in ticks (seconds by default).
    pub duration_secs: u32,
    /// Wall time of one tick. One second in production; tests may shrink it.
    pub tick_interval: Duration,
    /// Remaining count at which the one-time "hurry up" notice fires.
    /// Only fires when `duration_secs` is strictly greater.
    pub hurry_at_secs: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            tick_interval: Duration::from_secs(1),
            hurry_at_secs: 10,
        }
    }
}

impl TimerConfig {
    /// Longest accepted answer window.
    pub const MAX_DURATION_SECS: u32 = 3_600;

    /// Shortest accepted tick.
    pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

    /// Config for a countdown of `duration_secs` with default settings.
    pub fn with_duration(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to run.
    ///
    /// Called automatically by [`RoundTimer::start`]. Rules:
    /// - `duration_secs` clamped to `1..=MAX_DURATION_SECS`.
    /// - `tick_interval` raised to [`Self::MIN_TICK_INTERVAL`].
    pub fn validated(mut self) -> Self {
        let clamped = self.duration_secs.clamp(1, Self::MAX_DURATION_SECS);
        if clamped != self.duration_secs {
            warn!(
                requested = self.duration_secs,
                clamped, "timer duration out of range, clamping"
            );
            self.duration_secs = clamped;
        }
        if self.tick_interval < Self::MIN_TICK_INTERVAL {
            self.tick_interval = Self::MIN_TICK_INTERVAL;
        }
        self
    }

    /// Whether the hurry notice is due with `remaining` ticks left.
    pub fn hurry_due(&self, remaining: u32) -> bool {
        self.duration_secs > self.hurry_at_secs
            && remaining == self.hurry_at_secs
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// How a countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Expired,
    Stopped,
    Faulted,
}

impl fmt::Display for TimerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::Stopped => write!(f, "stopped"),
            Self::Faulted => write!(f, "faulted"),
        }
    }
}

/// A sink failure. Ends the countdown as [`TimerOutcome::Faulted`].
#[derive(Debug, thiserror::Error)]
#[error("countdown sink failed: {0}")]
pub struct CountdownError(pub String);

/// Receives the visible side of a countdown.
///
/// Called from the timer's own task, strictly in order:
/// `started`, then per tick (`hurry` at most once, right before its tick)
/// `tick`, then `finish` exactly once.
#[async_trait::async_trait]
pub trait CountdownSink: Send + 'static {
    /// The countdown began with `duration_secs` to go.
    async fn started(&mut self, duration_secs: u32) -> Result<(), CountdownError>;

    /// `remaining` ticks are left (counts `duration_secs` down to 1).
    async fn tick(&mut self, remaining: u32) -> Result<(), CountdownError>;

    /// One-time "hurry up" notice.
    async fn hurry(&mut self, remaining: u32) -> Result<(), CountdownError>;

    /// Terminal cleanup. Called after `on_expire` for `Expired`.
    async fn finish(&mut self, outcome: TimerOutcome) -> Result<(), CountdownError>;
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Owner's side of a running countdown.
///
/// Dropping the handle without calling [`cancel`](Self::cancel) stops the
/// timer the same way `cancel` does.
#[derive(Debug)]
pub struct TimerHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<TimerOutcome>,
    duration_secs: u32,
}

impl TimerHandle {
    /// Stops the countdown. Idempotent. Has no effect if the timer already
    /// expired; `on_expire` is never called after a cancel it observed.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    /// The (validated) length this timer was started with.
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Whether the timer task has reached its terminal outcome.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the terminal outcome without cancelling.
    pub async fn outcome(mut self) -> TimerOutcome {
        // `self.cancel` stays alive across the await so waiting doesn't
        // count as dropping the handle.
        match (&mut self.task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "round timer task panicked");
                TimerOutcome::Faulted
            }
        }
    }
}

/// Spawns countdowns.
pub struct RoundTimer;

enum Countdown {
    Elapsed,
    Cancelled,
}

impl RoundTimer {
    /// Starts a countdown on a new task and returns its handle.
    pub fn start<S, F>(config: TimerConfig, sink: S, on_expire: F) -> TimerHandle
    where
        S: CountdownSink,
        F: FnOnce() + Send + 'static,
    {
        let config = config.validated();
        let duration_secs = config.duration_secs;
        let (tx, rx) = oneshot::channel();

        debug!(
            duration_secs,
            hurry_at = config.hurry_at_secs,
            "round timer started"
        );
        let task = tokio::spawn(run(config, sink, rx, on_expire));

        TimerHandle {
            cancel: Some(tx),
            task,
            duration_secs,
        }
    }
}

async fn run<S, F>(
    config: TimerConfig,
    mut sink: S,
    mut cancel: oneshot::Receiver<()>,
    on_expire: F,
) -> TimerOutcome
where
    S: CountdownSink,
    F: FnOnce(),
{
    let outcome = match countdown(&config, &mut sink, &mut cancel).await {
        Ok(Countdown::Elapsed) => {
            on_expire();
            TimerOutcome::Expired
        }
        Ok(Countdown::Cancelled) => TimerOutcome::Stopped,
        Err(e) => {
            warn!(error = %e, "round timer faulted, finalizing as stopped");
            TimerOutcome::Faulted
        }
    };

    if let Err(e) = sink.finish(outcome).await {
        warn!(error = %e, %outcome, "countdown cleanup failed");
    }
    debug!(%outcome, "round timer finished");
    outcome
}

async fn countdown<S: CountdownSink>(
    config: &TimerConfig,
    sink: &mut S,
    cancel: &mut oneshot::Receiver<()>,
) -> Result<Countdown, CountdownError> {
    sink.started(config.duration_secs).await?;

    for remaining in (1..=config.duration_secs).rev() {
        if config.hurry_due(remaining) {
            sink.hurry(remaining).await?;
        }
        sink.tick(remaining).await?;
        trace!(remaining, "countdown tick");

        tokio::select! {
            biased;
            // A sent value and a dropped handle both mean "stop".
            _ = &mut *cancel => return Ok(Countdown::Cancelled),
            _ = time::sleep(config.tick_interval) => {}
        }
    }

    // A cancel that landed during the final sleep still wins.
    match cancel.try_recv() {
        Err(TryRecvError::Empty) => Ok(Countdown::Elapsed),
        Ok(()) | Err(TryRecvError::Closed) => Ok(Countdown::Cancelled),
    }
}
