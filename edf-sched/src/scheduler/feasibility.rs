/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Processor-demand reporting for the admitted task set.
//!
//! # Status: advisory only
//!
//! The utilisation is **computed and logged** after every admission.  It is
//! never used to refuse a task: the only admission criterion is the slot
//! count, and overload is detected reactively by the Deadline Monitor.
//!
//! # Theory
//! For independent periodic tasks with deadlines equal to periods on one
//! processor, preemptive EDF meets every deadline if and only if
//!
//! $$U = \sum_{i=1}^{n} \frac{C_i}{T_i} \leq 1$$
//!
//! Budgets and periods are whole numbers of ticks and one granted tick is the
//! unit of work, so the tick-granular selector inherits the same bound.

use crate::task::Task;

/// Utilisation bound for EDF on a single processor.
pub const EDF_UTILIZATION_BOUND: f64 = 1.0;

/// `Σ budget / period` over `tasks`.
pub fn total_utilization(tasks: &[Task]) -> f64 {
    tasks.iter().map(Task::utilization).sum()
}

/// Returns `Some(total_utilisation)` if the task set exceeds the EDF bound
/// and deadline misses are therefore certain; `None` otherwise.
pub fn check_edf_bound(tasks: &[Task]) -> Option<f64> {
    let u = total_utilization(tasks);
    (u > EDF_UTILIZATION_BOUND).then_some(u)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskId, TaskParams, Tick};

    fn task_with_timing(budget: Tick, period: Tick) -> Task {
        Task::new(TaskId::new(1).unwrap(), TaskParams { budget, period }, 0)
    }

    #[test]
    fn empty_set_has_zero_utilization() {
        assert_eq!(total_utilization(&[]), 0.0);
        assert!(check_edf_bound(&[]).is_none());
    }

    #[test]
    fn utilizations_add_up() {
        let tasks = vec![task_with_timing(1, 4), task_with_timing(1, 2)];
        assert!((total_utilization(&tasks) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn exactly_full_processor_is_within_bound() {
        let tasks = vec![task_with_timing(1, 2), task_with_timing(2, 4)];
        assert!(check_edf_bound(&tasks).is_none(), "U == 1.0 is feasible (≤)");
    }

    #[test]
    fn overloaded_set_exceeds_bound() {
        let tasks = vec![
            task_with_timing(3, 5),
            task_with_timing(3, 6),
            task_with_timing(1, 10),
        ];
        let u = check_edf_bound(&tasks).expect("set should be overloaded");
        assert!((u - 1.2).abs() < 1e-9, "utilization should be 1.2, got {u}");
    }
}
