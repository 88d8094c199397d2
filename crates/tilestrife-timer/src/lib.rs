//! Countdown timers for Tilestrife room tasks.
//!
//! A [`Countdown`] drives the turn and fight timers of a single room.
//! It is designed to sit inside the room task's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         ev = fight_timer.next_event() => match ev {
//!             CountdownEvent::Tick(secs) => { /* broadcast remaining time */ }
//!             CountdownEvent::Finished => { /* timeout action */ }
//!         }
//!     }
//! }
//! ```
//!
//! While idle or paused, [`Countdown::next_event`] pends forever, so
//! `select!` simply services the other branches. Resetting, pausing,
//! resuming, and stopping are all synchronous; the scheduling
//! decisions belong to the caller, the timing to Tokio.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// How often a running countdown emits a [`CountdownEvent::Tick`].
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// An event from a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One tick interval elapsed; carries whole seconds remaining.
    Tick(u64),
    /// The countdown reached zero and is now idle.
    Finished,
}

/// A resettable, pausable countdown with 1 Hz ticks.
///
/// One instance per timer per room (turn timer, fight timer). Not
/// shared across tasks; the owning room task is the only caller.
#[derive(Debug)]
pub struct Countdown {
    /// When the countdown expires. `None` while idle.
    deadline: Option<Instant>,
    /// When the next tick fires. `None` while idle.
    next_tick: Option<Instant>,
    /// Remaining duration frozen by `pause`.
    frozen: Option<Duration>,
    /// Name used in log lines ("turn", "fight").
    label: &'static str,
}

impl Countdown {
    /// Creates an idle countdown. `label` names it in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            deadline: None,
            next_tick: None,
            frozen: None,
            label,
        }
    }

    /// Arms (or re-arms) the countdown for `duration` from now. Any
    /// previous deadline or paused remainder is discarded.
    pub fn reset(&mut self, duration: Duration) {
        let now = Instant::now();
        self.deadline = Some(now + duration);
        self.next_tick = Some(now + TICK_INTERVAL.min(duration));
        self.frozen = None;
        debug!(timer = self.label, secs = duration.as_secs(), "countdown reset");
    }

    /// Freezes the remaining duration. A paused countdown emits no
    /// events until [`resume`](Self::resume). Idempotent; a no-op while
    /// idle.
    pub fn pause(&mut self) {
        if let Some(deadline) = self.deadline.take() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.frozen = Some(remaining);
            self.next_tick = None;
            debug!(
                timer = self.label,
                remaining_ms = remaining.as_millis() as u64,
                "countdown paused"
            );
        }
    }

    /// Re-arms the countdown from the paused remainder. A no-op unless
    /// paused.
    pub fn resume(&mut self) {
        if let Some(remaining) = self.frozen.take() {
            let now = Instant::now();
            self.deadline = Some(now + remaining);
            self.next_tick = Some(now + TICK_INTERVAL.min(remaining));
            debug!(
                timer = self.label,
                remaining_ms = remaining.as_millis() as u64,
                "countdown resumed"
            );
        }
    }

    /// Disarms the countdown entirely. No further events fire until the
    /// next [`reset`](Self::reset).
    pub fn stop(&mut self) {
        if self.deadline.is_some() || self.frozen.is_some() {
            debug!(timer = self.label, "countdown stopped");
        }
        self.deadline = None;
        self.next_tick = None;
        self.frozen = None;
    }

    /// The time left: live remainder while running, the frozen
    /// remainder while paused, zero while idle.
    pub fn remaining(&self) -> Duration {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the countdown is live (armed and not paused).
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the countdown is paused with a frozen remainder.
    pub fn is_paused(&self) -> bool {
        self.frozen.is_some()
    }

    /// Waits for the next tick or expiry. Pends forever while idle or
    /// paused.
    pub async fn next_event(&mut self) -> CountdownEvent {
        let (Some(deadline), Some(next_tick)) = (self.deadline, self.next_tick)
        else {
            // Idle or paused: never resolves, select! handles the rest.
            std::future::pending::<()>().await;
            unreachable!()
        };

        if next_tick >= deadline {
            time::sleep_until(deadline).await;
            self.deadline = None;
            self.next_tick = None;
            trace!(timer = self.label, "countdown finished");
            return CountdownEvent::Finished;
        }

        time::sleep_until(next_tick).await;
        self.next_tick = Some(next_tick + TICK_INTERVAL);
        let remaining = deadline.saturating_duration_since(Instant::now());
        trace!(
            timer = self.label,
            secs = remaining.as_secs(),
            "countdown tick"
        );
        CountdownEvent::Tick(remaining.as_secs())
    }
}
