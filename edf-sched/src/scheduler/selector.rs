/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! EDF Selector: pick the single task that runs during the next tick.

use crate::task::{Task, TaskId, Tick};

/// Select the eligible task with the nearest deadline at `tick`.
///
/// * Eligible: admitted and not yet finished in its current period.
/// * Key: ticks remaining until the next deadline.
/// * Tie-break: lowest id (first admitted wins).
///
/// Returns `None` when nothing is eligible (idle tick).  No feasibility
/// analysis is attempted; overload shows up later as deadline misses.
pub fn select(tick: Tick, tasks: &[Task]) -> Option<TaskId> {
    tasks
        .iter()
        .filter(|t| !t.is_completed())
        .min_by_key(|t| (t.time_to_deadline(tick), t.id))
        .map(|t| t.id)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
