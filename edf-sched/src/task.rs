/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the EDF scheduler.
//!
//! Two types model the two sides of a task:
//!
//! ```text
//!  AdmissionGate ──(TaskParams)──►  Task  ──(Arc<ExecutionState>)──►  execution context
//!                                    ↑ scheduler table                  ↑ runtime binding
//!                                    immutable timing                   progress + completion
//! ```
//!
//! # Ownership model
//! `Task` lives in the `EdfScheduler` table for the lifetime of the process.
//! Its timing fields never change after admission.  The only mutable
//! scheduling state is the shared [`ExecutionState`]: the execution context
//! advances the work counter and raises the completion flag, the Deadline
//! Monitor (driven by the Tick Driver) clears both at a period boundary.
//! All time values are expressed in ticks.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

// ── Time ──────────────────────────────────────────────────────────────────────

/// Global tick count.  Advanced by exactly one per Tick Driver iteration.
pub type Tick = u64;

// ── TaskId ────────────────────────────────────────────────────────────────────

/// Dense, 1-based task identifier assigned in admission order.
///
/// `id - 1` is the task's slot in the scheduler table; ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u32);

impl TaskId {
    /// Build an id from its 1-based number.  Returns `None` for `0`.
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(TaskId(number))
    }

    /// Id of the task stored at `index` in the table.
    pub(crate) fn from_index(index: usize) -> Self {
        TaskId(index as u32 + 1)
    }

    /// 1-based task number, as printed in reports.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Slot in the scheduler table (`id - 1`).
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── TaskParams ────────────────────────────────────────────────────────────────

/// Timing parameters drawn for a task at admission, in ticks.
///
/// `budget > period` is representable on purpose: such a task can never
/// finish inside a period and exercises the deadline-miss path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskParams {
    /// Ticks of work required per period.
    pub budget: Tick,
    /// Ticks between successive deadlines.
    pub period: Tick,
}

// ── ExecutionState ────────────────────────────────────────────────────────────

/// Per-period progress shared between the scheduler table and the task's
/// execution context.
///
/// Single-writer discipline per field transition:
/// * the execution context increments `elapsed` and sets `completed`;
/// * the Deadline Monitor clears both at a period boundary.
///
/// The Driver never grants a tick while a boundary check is in progress, so
/// the two writers never overlap.
#[derive(Debug)]
pub struct ExecutionState {
    budget: Tick,
    elapsed: AtomicU64,
    completed: AtomicBool,
}

impl ExecutionState {
    pub fn new(budget: Tick) -> Self {
        Self {
            budget,
            elapsed: AtomicU64::new(0),
            completed: AtomicBool::new(false),
        }
    }

    /// Perform one granted tick of work.
    ///
    /// Returns the cumulative work done in this period including this tick.
    /// When the budget is reached the counter is reset and the completion
    /// flag is raised.
    pub fn run_tick(&self) -> Tick {
        let elapsed = self.elapsed.fetch_add(1, Ordering::AcqRel) + 1;
        if elapsed >= self.budget {
            self.elapsed.store(0, Ordering::Release);
            self.completed.store(true, Ordering::Release);
        }
        elapsed
    }

    /// `true` once the budget for the current period has been consumed.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Work done so far in the current, unfinished period.
    pub fn elapsed(&self) -> Tick {
        self.elapsed.load(Ordering::Acquire)
    }

    /// Start a fresh period.  Returns whether the previous one completed.
    pub(crate) fn roll_over(&self) -> bool {
        let completed = self.completed.swap(false, Ordering::AcqRel);
        self.elapsed.store(0, Ordering::Release);
        completed
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// One admitted periodic task.
///
/// Deadlines recur at `admitted_at + k * period` for every `k >= 1`.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,

    /// Ticks of work required per period.
    pub budget: Tick,

    /// Ticks between successive deadlines.  Always non-zero.
    pub period: Tick,

    /// Global tick at the moment of admission; anchor for all deadlines.
    pub admitted_at: Tick,

    state: Arc<ExecutionState>,
}

impl Task {
    pub fn new(id: TaskId, params: TaskParams, admitted_at: Tick) -> Self {
        debug_assert!(params.period > 0, "task period must be non-zero");
        debug_assert!(params.budget > 0, "task budget must be non-zero");
        Self {
            id,
            budget: params.budget,
            period: params.period,
            admitted_at,
            state: Arc::new(ExecutionState::new(params.budget)),
        }
    }

    /// Ticks into the current period at `tick`.
    fn phase(&self, tick: Tick) -> Tick {
        tick.saturating_sub(self.admitted_at) % self.period
    }

    /// `true` when a deadline falls exactly on `tick`.
    ///
    /// The admission instant itself is not a boundary.
    pub fn is_period_boundary(&self, tick: Tick) -> bool {
        tick > self.admitted_at && self.phase(tick) == 0
    }

    /// Ticks remaining until the next deadline, in `1..=period`.
    pub fn time_to_deadline(&self, tick: Tick) -> Tick {
        self.period - self.phase(tick)
    }

    /// Absolute tick of the next deadline strictly after `tick`.
    pub fn next_deadline(&self, tick: Tick) -> Tick {
        tick + self.time_to_deadline(tick)
    }

    /// Processor share: `budget / period`.
    pub fn utilization(&self) -> f64 {
        self.budget as f64 / self.period as f64
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    /// Shared progress handle handed to the execution context.
    pub fn state(&self) -> &Arc<ExecutionState> {
        &self.state
    }
}

// ── TaskTable ─────────────────────────────────────────────────────────────────

/// Fixed-capacity, append-only table of admitted tasks.
///
/// Storage is allocated once for `capacity` slots; the task with id `k`
/// always lives at slot `k - 1`.  Tasks are never removed.
#[derive(Debug, Clone)]
pub struct TaskTable {
    slots: Vec<Task>,
    capacity: usize,
}

impl TaskTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of admitted tasks (`n`).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of tasks (`C`).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` once `n == C`.
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Id the next admitted task will receive, or `None` when full.
    pub fn next_id(&self) -> Option<TaskId> {
        (!self.is_full()).then(|| TaskId::from_index(self.slots.len()))
    }

    /// Append a task built for the next free id.
    ///
    /// `build` is not called when the table is full.
    pub fn insert_with(&mut self, build: impl FnOnce(TaskId) -> Task) -> Option<TaskId> {
        let id = self.next_id()?;
        let task = build(id);
        debug_assert_eq!(task.id, id, "task built with a foreign id");
        self.slots.push(task);
        Some(id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.slots.get(id.index())
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.slots.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn task(budget: Tick, period: Tick, admitted_at: Tick) -> Task {
        Task::new(
            TaskId::new(1).unwrap(),
            TaskParams { budget, period },
            admitted_at,
        )
    }

    #[test]
    fn task_id_zero_is_rejected() {
        assert!(TaskId::new(0).is_none());
    }

    #[test]
    fn task_id_index_is_one_less_than_number() {
        let id = TaskId::new(3).unwrap();
        assert_eq!(id.index(), 2);
        assert_eq!(TaskId::from_index(2), id);
        assert_eq!(id.to_string(), "3");
    }

    #[test]
    fn boundaries_fall_on_multiples_of_period_after_admission() {
        let t = task(2, 6, 4);
        let boundaries: Vec<Tick> = (0..30).filter(|&k| t.is_period_boundary(k)).collect();
        assert_eq!(boundaries, vec![10, 16, 22, 28]);
    }

    #[test]
    fn admission_instant_is_not_a_boundary() {
        let t = task(1, 5, 7);
        assert!(!t.is_period_boundary(7));
    }

    #[test]
    fn time_to_deadline_counts_down_and_wraps() {
        let t = task(1, 5, 3);
        let ttd: Vec<Tick> = (3..10).map(|k| t.time_to_deadline(k)).collect();
        assert_eq!(ttd, vec![5, 4, 3, 2, 1, 5, 4]);
        assert_eq!(t.next_deadline(4), 8);
    }

    #[test]
    fn run_tick_completes_on_budget_and_resets_counter() {
        let state = ExecutionState::new(2);
        assert_eq!(state.run_tick(), 1);
        assert!(!state.is_completed());
        assert_eq!(state.run_tick(), 2);
        assert!(state.is_completed());
        assert_eq!(state.elapsed(), 0);
    }

    #[test]
    fn roll_over_reports_and_clears_progress() {
        let state = ExecutionState::new(3);
        state.run_tick();
        assert!(!state.roll_over(), "unfinished period must report false");
        assert_eq!(state.elapsed(), 0);

        for _ in 0..3 {
            state.run_tick();
        }
        assert!(state.roll_over());
        assert!(!state.is_completed());
    }

    #[test]
    fn table_assigns_dense_ids_and_stops_at_capacity() {
        let params = TaskParams {
            budget: 1,
            period: 5,
        };
        let mut table = TaskTable::with_capacity(2);
        assert_eq!(table.next_id(), TaskId::new(1));

        let a = table.insert_with(|id| Task::new(id, params, 0));
        let b = table.insert_with(|id| Task::new(id, params, 3));
        let c = table.insert_with(|id| Task::new(id, params, 4));

        assert_eq!(a, TaskId::new(1));
        assert_eq!(b, TaskId::new(2));
        assert_eq!(c, None);
        assert!(table.is_full());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(b.unwrap()).unwrap().admitted_at, 3);
    }

    #[test]
    fn utilization_is_budget_over_period() {
        let t = task(3, 6, 0);
        assert!((t.utilization() - 0.5).abs() < 1e-12);
    }
}
