/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Debounced admission trigger.
//!
//! ```text
//!  button edge ──► Debouncer ──► try_send ──► bounded mpsc ──► Tick Driver
//!                  (200 ms)      never blocks   (capacity C)     polls each tick
//! ```
//!
//! The edge handler plays the role of an interrupt callback: it must never
//! wait, so a full queue drops the edge instead of blocking.  Debouncing
//! happens here and only here; the Admission Gate never looks at time.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One accepted button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger;

/// What happened to a raw edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Forwarded to the scheduler.
    Accepted,
    /// Arrived inside the debounce window of the previous edge.
    Debounced,
    /// The queue was full; the edge was dropped.
    QueueFull,
    /// The scheduler side has gone away.
    Disconnected,
}

// ── Debouncer ─────────────────────────────────────────────────────────────────

/// Minimum-spacing filter over edge timestamps.
///
/// The reference timestamp moves on every edge, accepted or not, so a line
/// that keeps bouncing stays suppressed until it has been quiet for longer
/// than the window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_edge: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_edge: None,
        }
    }

    /// Returns `true` if the edge at `now` should be forwarded.
    pub fn accept(&mut self, now: Instant) -> bool {
        let accepted = match self.last_edge {
            None => true,
            Some(_) if self.window.is_zero() => true,
            Some(last) => now.saturating_duration_since(last) > self.window,
        };
        self.last_edge = Some(now);
        accepted
    }
}

// ── TriggerLine ───────────────────────────────────────────────────────────────

/// Producer side of the admission channel, with its debouncer.
#[derive(Debug)]
pub struct TriggerLine {
    debouncer: Debouncer,
    tx: mpsc::Sender<Trigger>,
}

impl TriggerLine {
    /// Handle one raw edge observed at `now`.  Never blocks.
    pub fn edge(&mut self, now: Instant) -> EdgeOutcome {
        if !self.debouncer.accept(now) {
            debug!("edge debounced");
            return EdgeOutcome::Debounced;
        }
        match self.tx.try_send(Trigger) {
            Ok(()) => EdgeOutcome::Accepted,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("admission queue full – edge dropped");
                EdgeOutcome::QueueFull
            }
            Err(mpsc::error::TrySendError::Closed(_)) => EdgeOutcome::Disconnected,
        }
    }
}

/// Build the bounded trigger channel.
///
/// `capacity` should be at least the task capacity so that no accepted edge
/// is lost before the gate consumes it.  It is raised to 1 if zero.
pub fn trigger_channel(
    capacity: usize,
    debounce: Duration,
) -> (TriggerLine, mpsc::Receiver<Trigger>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let line = TriggerLine {
        debouncer: Debouncer::new(debounce),
        tx,
    };
    (line, rx)
}

/// Treat every line read from `reader` as one button edge.
///
/// Returns when the reader reaches end of input or the scheduler has gone.
pub async fn forward_lines<R>(reader: R, mut line: TriggerLine) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while lines.next_line().await?.is_some() {
        match line.edge(Instant::now()) {
            EdgeOutcome::Accepted => debug!("button press forwarded"),
            EdgeOutcome::Disconnected => break,
            EdgeOutcome::Debounced | EdgeOutcome::QueueFull => {}
        }
    }
    info!("trigger input closed");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[test]
    fn first_edge_is_accepted() {
        let mut d = Debouncer::new(WINDOW);
        assert!(d.accept(Instant::now()));
    }

    #[test]
    fn edges_inside_window_are_rejected() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        assert!(d.accept(t0));
        assert!(!d.accept(t0 + Duration::from_millis(150)));
        assert!(!d.accept(t0 + Duration::from_millis(200) + Duration::from_millis(150)));
        // Quiet for more than the window since the last bounce.
        assert!(d.accept(t0 + Duration::from_millis(600)));
    }

    #[test]
    fn exactly_window_apart_is_rejected() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.accept(t0);
        assert!(!d.accept(t0 + WINDOW));
    }

    #[test]
    fn zero_window_accepts_everything() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        assert!(d.accept(t0));
        assert!(d.accept(t0));
    }

    #[tokio::test]
    async fn accepted_edges_reach_the_receiver() {
        let (mut line, mut rx) = trigger_channel(2, WINDOW);
        let t0 = Instant::now();

        assert_eq!(line.edge(t0), EdgeOutcome::Accepted);
        assert_eq!(line.edge(t0 + Duration::from_millis(10)), EdgeOutcome::Debounced);
        assert_eq!(rx.recv().await, Some(Trigger));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (mut line, _rx) = trigger_channel(1, Duration::ZERO);
        let t0 = Instant::now();
        assert_eq!(line.edge(t0), EdgeOutcome::Accepted);
        assert_eq!(line.edge(t0), EdgeOutcome::QueueFull);
    }

    #[tokio::test]
    async fn closed_receiver_reports_disconnected() {
        let (mut line, rx) = trigger_channel(1, WINDOW);
        drop(rx);
        assert_eq!(line.edge(Instant::now()), EdgeOutcome::Disconnected);
    }

    #[tokio::test]
    async fn each_input_line_is_one_edge() {
        let (line, mut rx) = trigger_channel(4, Duration::ZERO);
        forward_lines(&b"\n\n\n"[..], line).await.unwrap();

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
