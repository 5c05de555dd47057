/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Admission Gate: turns debounced triggers into new periodic tasks.
//!
//! The gate owns the randomness source and the capacity indicator.  It
//! never looks at timestamps (debouncing is done upstream in
//! [`crate::trigger`]) and never refuses a task for feasibility reasons;
//! the only admission criterion is the free slot count.

use tracing::{debug, info, warn};

use crate::indicator::CapacityIndicator;
use crate::random::{draw_task_params, RandomSource};
use crate::task::{Task, TaskId, TaskTable, Tick};
use crate::trigger::Trigger;

/// Capacity-bounded task admission.
#[derive(Debug)]
pub struct AdmissionGate<R, I> {
    rng: R,
    indicator: I,
    period_min: Tick,
    period_max: Tick,
    open: bool,
}

impl<R: RandomSource, I: CapacityIndicator> AdmissionGate<R, I> {
    /// Create an open gate drawing periods from `[period_min, period_max]`.
    ///
    /// The indicator is switched on immediately, before any admission.
    pub fn new(rng: R, mut indicator: I, period_min: Tick, period_max: Tick) -> Self {
        indicator.set_open(true);
        Self {
            rng,
            indicator,
            period_min,
            period_max,
            open: true,
        }
    }

    /// Admit one task into `table` at `now`, if a slot is free.
    ///
    /// A trigger arriving while the table is full is dropped; this is the
    /// expected steady state once capacity is reached, not an error.
    pub fn try_admit(
        &mut self,
        _trigger: Trigger,
        table: &mut TaskTable,
        now: Tick,
    ) -> Option<TaskId> {
        if table.is_full() {
            self.close(table);
            warn!(
                tasks = table.len(),
                capacity = table.capacity(),
                "Can't schedule any more tasks"
            );
            return None;
        }

        let params = draw_task_params(&mut self.rng, self.period_min, self.period_max);
        let mut first_deadline = now;
        let id = table.insert_with(|id| {
            let task = Task::new(id, params, now);
            first_deadline = task.next_deadline(now);
            task
        })?;

        info!(
            task = %id,
            budget = params.budget,
            period = params.period,
            admitted_at = now,
            first_deadline,
            "Created task {}: budget = {}, period = {}",
            id,
            params.budget,
            params.period,
        );

        self.close(table);
        Some(id)
    }

    /// Clear the indicator the first time the table is seen full.
    fn close(&mut self, table: &TaskTable) {
        if self.open && table.is_full() {
            self.open = false;
            self.indicator.set_open(false);
            debug!(capacity = table.capacity(), "admission closed");
        }
    }

    /// `true` while further tasks can be admitted.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
