//! Tick-synchronous Earliest-Deadline-First scheduler.
//!
//! [`EdfScheduler`] is the single owner of all scheduling state: the global
//! tick counter, the fixed-capacity task table and the admission gate.  One
//! call to [`EdfScheduler::step`] performs the synchronous part of a tick:
//!
//! ```text
//!  trigger? ──► admission ──► deadline monitor ──► EDF selection ──► tick += 1
//!                 (≤ 1)        (tick before ++)     (tick before ++)
//! ```
//!
//! Granting the selected task (waking its execution context) and pacing to
//! the tick length are the Tick Driver's job; the scheduler itself never
//! sleeps or awaits, which keeps it deterministic and directly testable.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Task storage | Pre-allocated table indexed by `id - 1`, append-only |
//! | Shared state | Tick counter and table owned here; contexts only see their `ExecutionState` |
//! | Anomalies | Misses and closed-admission triggers are counted and logged, never `Err` |
//! | Feasibility | Utilisation logged after admission, never enforced |
//!
//! # Example
//! ```rust,ignore
//! let mut sched = EdfScheduler::from_config(&config, SplitMix64::new(1), LogIndicator);
//! let report = sched.step(Some(Trigger));
//! if let Some(id) = report.selected { runtime.grant(id, sched.now()).await?; }
//! ```

pub mod error;
pub mod feasibility;
pub mod monitor;
pub mod selector;

pub use error::{ConfigError, GrantError};
pub use monitor::DeadlineMiss;

use tracing::{debug, info, warn};

use crate::admission::AdmissionGate;
use crate::config::SchedulerConfig;
use crate::indicator::{CapacityIndicator, LogIndicator};
use crate::random::{RandomSource, SplitMix64};
use crate::task::{Task, TaskId, TaskTable, Tick};
use crate::trigger::Trigger;

use feasibility::{check_edf_bound, total_utilization, EDF_UTILIZATION_BOUND};

// ── Reports ───────────────────────────────────────────────────────────────────

/// Outcome of one [`EdfScheduler::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Tick value the monitor and selector ran at (before the increment).
    pub tick: Tick,

    /// Task admitted at the top of this tick, if any.
    pub admitted: Option<TaskId>,

    /// Deadline misses detected at this tick's boundaries.
    pub misses: Vec<DeadlineMiss>,

    /// Task to be granted this tick; `None` for an idle tick.
    pub selected: Option<TaskId>,
}

/// Running counters, reported when the driver stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub ticks: u64,
    /// Ticks on which a task was selected for a grant.
    pub selections: u64,
    /// Selected ticks whose grant never reached the execution context.
    pub failed_grants: u64,
    pub idle_ticks: u64,
    pub misses: u64,
    pub admitted: u64,
    /// Triggers dropped because admission was closed.
    pub rejected_triggers: u64,
}

// ── EdfScheduler ──────────────────────────────────────────────────────────────

/// Owner of the tick counter, the task table and the admission gate.
///
/// Only [`step`](Self::step) advances time; everything else is either a
/// read-only view or one of the narrow per-phase operations `step` is built
/// from.
#[derive(Debug)]
pub struct EdfScheduler<R = SplitMix64, I = LogIndicator> {
    tick: Tick,
    tasks: TaskTable,
    gate: AdmissionGate<R, I>,
    stats: ScheduleStats,
}

impl<R: RandomSource, I: CapacityIndicator> EdfScheduler<R, I> {
    /// Create a scheduler with `capacity` task slots, starting at tick 0.
    pub fn new(capacity: usize, gate: AdmissionGate<R, I>) -> Self {
        Self {
            tick: 0,
            tasks: TaskTable::with_capacity(capacity),
            gate,
            stats: ScheduleStats::default(),
        }
    }

    /// Build the scheduler and its gate from a validated configuration.
    pub fn from_config(config: &SchedulerConfig, rng: R, indicator: I) -> Self {
        let gate = AdmissionGate::new(rng, indicator, config.period_min, config.period_max);
        Self::new(config.capacity, gate)
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    /// Current value of the global tick counter.
    pub fn now(&self) -> Tick {
        self.tick
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn capacity(&self) -> usize {
        self.tasks.capacity()
    }

    pub fn is_admission_open(&self) -> bool {
        self.gate.is_open()
    }

    pub fn gate(&self) -> &AdmissionGate<R, I> {
        &self.gate
    }

    pub fn stats(&self) -> &ScheduleStats {
        &self.stats
    }

    // ── Phases ────────────────────────────────────────────────────────────────

    /// Admission Gate: admit one task at the current tick if capacity
    /// remains.  Triggers arriving while closed are counted and dropped.
    pub fn admit(&mut self, trigger: Trigger) -> Option<TaskId> {
        let Some(id) = self.gate.try_admit(trigger, &mut self.tasks, self.tick) else {
            self.stats.rejected_triggers += 1;
            return None;
        };
        self.stats.admitted += 1;

        let tasks = self.tasks.as_slice();
        match check_edf_bound(tasks) {
            Some(u) => warn!(
                utilization = u,
                bound = EDF_UTILIZATION_BOUND,
                task_count = tasks.len(),
                "task set exceeds the EDF utilisation bound – deadline misses are expected"
            ),
            None => debug!(
                utilization = total_utilization(tasks),
                task_count = tasks.len(),
                "task set within the EDF utilisation bound"
            ),
        }

        Some(id)
    }

    /// Deadline Monitor at the current tick.
    pub fn check_period_boundaries(&mut self) -> Vec<DeadlineMiss> {
        let misses = monitor::check_period_boundaries(self.tick, self.tasks.as_slice());
        self.stats.misses += misses.len() as u64;
        misses
    }

    /// EDF Selector at the current tick.
    pub fn select(&self) -> Option<TaskId> {
        selector::select(self.tick, self.tasks.as_slice())
    }

    /// Run the synchronous part of one tick and advance the counter.
    ///
    /// The caller must grant the returned `selected` task (if any) before
    /// the next call; a task is never selected twice without an intervening
    /// call.
    pub fn step(&mut self, trigger: Option<Trigger>) -> TickReport {
        let tick = self.tick;

        let admitted = trigger.and_then(|t| self.admit(t));
        let misses = self.check_period_boundaries();
        let selected = self.select();

        self.tick += 1;
        self.stats.ticks += 1;
        match selected {
            Some(id) => {
                self.stats.selections += 1;
                debug!(tick, task = %id, "selected");
            }
            None => self.stats.idle_ticks += 1,
        }

        TickReport {
            tick,
            admitted,
            misses,
            selected,
        }
    }

    /// Count a selected tick that could not be delivered to its task.
    pub fn record_failed_grant(&mut self) {
        self.stats.failed_grants += 1;
    }

    /// Log the counters accumulated so far.
    pub fn log_summary(&self) {
        let s = &self.stats;
        info!(
            ticks = s.ticks,
            selections = s.selections,
            failed_grants = s.failed_grants,
            idle_ticks = s.idle_ticks,
            misses = s.misses,
            admitted = s.admitted,
            rejected_triggers = s.rejected_triggers,
            "=== Scheduling summary ==="
        );
        for task in self.tasks.iter() {
            info!(
                task = %task.id,
                budget = task.budget,
                period = task.period,
                admitted_at = task.admitted_at,
                utilization = task.utilization(),
                "  task"
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
