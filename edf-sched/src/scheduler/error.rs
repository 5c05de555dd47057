/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the EDF scheduler.
//!
//! Two error enums model the two failure layers:
//!
//! * [`ConfigError`] – why a scheduler configuration was refused before the
//!   Tick Driver ever started (the only place a run can fail outright).
//! * [`GrantError`] – why a granted tick could not be delivered to a task's
//!   execution context.  The driver logs it and keeps ticking.
//!
//! Admission-capacity exhaustion, deadline misses and triggers arriving while
//! admission is closed are *not* errors: they are expected steady-state
//! behaviour and surface only as log events and counters.

use thiserror::Error;

use crate::task::TaskId;

// ── Configuration ─────────────────────────────────────────────────────────────

/// A configuration value that would make the scheduler meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `capacity` must admit at least one task.
    #[error("capacity must be at least 1")]
    ZeroCapacity,

    /// The task table and the trigger queue are allocated up front.
    #[error("capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge { capacity: usize, max: usize },

    /// `tick_ms` of zero would spin the driver loop.
    #[error("tick length must be at least 1 ms")]
    ZeroTick,

    /// A zero period has no deadline.
    #[error("period_min must be at least 1 tick")]
    ZeroPeriod,

    /// The period range is empty.
    #[error("period range is empty: period_min ({min}) > period_max ({max})")]
    EmptyPeriodRange { min: u64, max: u64 },

    /// The admission poll must stay short relative to the tick cadence.
    #[error("poll timeout ({poll_ms} ms) must be shorter than the tick ({tick_ms} ms)")]
    PollTooLong { poll_ms: u64, tick_ms: u64 },
}

// ── Tick grants ───────────────────────────────────────────────────────────────

/// Failure to deliver one tick of execution to a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantError {
    /// The selected id has no registered execution context.
    #[error("task {0} has no execution context")]
    UnknownTask(TaskId),

    /// The execution context terminated (panicked or was aborted).
    #[error("execution context of task {0} is gone")]
    ContextGone(TaskId),
}
