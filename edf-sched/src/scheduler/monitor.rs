/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deadline Monitor.
//!
//! Runs once per tick, before selection.  For every task whose period ends
//! exactly at the current tick it starts a fresh period, and reports a miss
//! if the period that just ended did not consume its full budget.  A miss
//! is an observation only: the task keeps its slot and its timing.

use tracing::warn;

use crate::task::{Task, TaskId, Tick};

/// A task that reached a period boundary without finishing its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineMiss {
    pub task: TaskId,
    /// The boundary tick at which the miss was detected.
    pub tick: Tick,
}

/// Roll every task whose deadline falls on `tick` into its next period.
///
/// Returns the misses in task-id order.
pub fn check_period_boundaries(tick: Tick, tasks: &[Task]) -> Vec<DeadlineMiss> {
    let mut misses = Vec::new();

    for task in tasks.iter().filter(|t| t.is_period_boundary(tick)) {
        let unfinished = task.state().elapsed();
        if !task.state().roll_over() {
            warn!(
                task = %task.id,
                tick,
                done = unfinished,
                budget = task.budget,
                "Task {} didn't finish before the deadline",
                task.id,
            );
            misses.push(DeadlineMiss {
                task: task.id,
                tick,
            });
        }
    }

    misses
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskParams;

    fn task(id: u32, budget: Tick, period: Tick, admitted_at: Tick) -> Task {
        Task::new(
            TaskId::new(id).unwrap(),
            TaskParams { budget, period },
            admitted_at,
        )
    }

    #[test]
    fn completed_task_rolls_over_silently() {
        let t = task(1, 1, 5, 0);
        t.state().run_tick();
        assert!(t.is_completed());

        let misses = check_period_boundaries(5, std::slice::from_ref(&t));
        assert!(misses.is_empty());
        assert!(!t.is_completed(), "flag must be cleared for the new period");
    }

    #[test]
    fn unfinished_task_is_reported_at_boundary() {
        let t = task(1, 3, 5, 2);
        t.state().run_tick();

        let misses = check_period_boundaries(7, std::slice::from_ref(&t));
        assert_eq!(
            misses,
            vec![DeadlineMiss {
                task: t.id,
                tick: 7
            }]
        );
        assert_eq!(t.state().elapsed(), 0, "partial work does not carry over");
    }

    #[test]
    fn ticks_between_boundaries_do_nothing() {
        let t = task(1, 3, 5, 0);
        t.state().run_tick();
        for tick in 0..5 {
            assert!(check_period_boundaries(tick, std::slice::from_ref(&t)).is_empty());
        }
        assert_eq!(t.state().elapsed(), 1);
    }

    #[test]
    fn admission_tick_is_not_checked() {
        let t = task(1, 2, 5, 10);
        assert!(check_period_boundaries(10, std::slice::from_ref(&t)).is_empty());
    }

    #[test]
    fn infeasible_task_misses_every_period() {
        // budget > period: can never complete, even if granted every tick.
        let t = task(1, 7, 4, 0);
        let mut misses = Vec::new();
        for tick in 0..=20 {
            misses.extend(check_period_boundaries(tick, std::slice::from_ref(&t)));
            t.state().run_tick();
        }
        let at: Vec<Tick> = misses.iter().map(|m| m.tick).collect();
        assert_eq!(at, vec![4, 8, 12, 16, 20]);
    }

    #[test]
    fn only_tasks_on_boundary_are_touched() {
        let a = task(1, 1, 3, 0);
        let b = task(2, 1, 4, 0);
        let tasks = vec![a, b];

        let misses = check_period_boundaries(3, &tasks);
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].task, TaskId::new(1).unwrap());
    }
}
