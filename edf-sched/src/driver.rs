/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Tick Driver: the outer control loop.
//!
//! Each iteration, paced at the tick length:
//!
//! 1. wait briefly for one admission trigger (bounded by `poll_timeout`);
//! 2. run admission, the Deadline Monitor and the EDF Selector
//!    ([`EdfScheduler::step`]) and advance the tick counter;
//! 3. grant the selected task one tick, or report an idle tick;
//! 4. sleep until the next tick boundary.
//!
//! Nothing in a tick can stop the loop: failed grants, deadline misses and
//! closed admission are all logged and the next tick proceeds.  The loop
//! ends only when the shutdown signal fires.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::indicator::CapacityIndicator;
use crate::random::RandomSource;
use crate::runtime::TaskRuntime;
use crate::scheduler::{EdfScheduler, TickReport};
use crate::trigger::Trigger;

/// Drives an [`EdfScheduler`] against a [`TaskRuntime`] in real time.
pub struct TickDriver<R, I, X> {
    scheduler: EdfScheduler<R, I>,
    runtime: X,
    triggers: mpsc::Receiver<Trigger>,
    tick: Duration,
    tick_ms: u64,
    poll_timeout: Duration,
}

impl<R, I, X> TickDriver<R, I, X>
where
    R: RandomSource,
    I: CapacityIndicator,
    X: TaskRuntime,
{
    pub fn new(
        scheduler: EdfScheduler<R, I>,
        runtime: X,
        triggers: mpsc::Receiver<Trigger>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            scheduler,
            runtime,
            triggers,
            tick: config.tick(),
            tick_ms: config.tick_ms,
            poll_timeout: config.poll_timeout(),
        }
    }

    pub fn scheduler(&self) -> &EdfScheduler<R, I> {
        &self.scheduler
    }

    /// Wait at most `poll_timeout` for one pending trigger.
    async fn poll_trigger(&mut self) -> Option<Trigger> {
        match time::timeout(self.poll_timeout, self.triggers.recv()).await {
            Ok(trigger) => trigger,
            Err(_elapsed) => None,
        }
    }

    /// One full tick, without the trailing sleep.
    pub async fn iterate(&mut self) -> TickReport {
        let trigger = self.poll_trigger().await;
        let report = self.scheduler.step(trigger);

        if let Some(task) = report.admitted.and_then(|id| self.scheduler.task(id)) {
            self.runtime.spawn(task);
        }

        let now = report.tick + 1;
        match report.selected {
            Some(id) => {
                if let Err(e) = self.runtime.grant(id, now).await {
                    error!(task = %id, tick = now, "grant failed: {e}");
                    self.scheduler.record_failed_grant();
                }
            }
            None => info!(time_ms = now * self.tick_ms, "{}ms | idle", now * self.tick_ms),
        }

        report
    }

    /// Run until `shutdown` changes (or its sender is dropped).
    ///
    /// Returns the scheduler and runtime so the caller can inspect the final
    /// state and stop the execution contexts.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> (EdfScheduler<R, I>, X) {
        let mut interval = time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_ms = self.tick_ms,
            capacity = self.scheduler.capacity(),
            "EDF scheduler running"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = interval.tick() => {}
            }
            self.iterate().await;
        }

        info!(tick = self.scheduler.now(), "EDF scheduler stopping");
        self.scheduler.log_summary();
        (self.scheduler, self.runtime)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
