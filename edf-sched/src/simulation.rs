/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deterministic, sleep-free scheduler runs.
//!
//! A [`Simulation`] drives the same [`EdfScheduler`] the real-time driver
//! uses, but with an [`InlineRuntime`] and scripted trigger ticks instead of
//! a button and a clock.  Given the same seed and script, two runs produce
//! identical timelines.
//!
//! Trigger delivery mirrors the admission channel: triggers queue up to the
//! task capacity, extras are dropped, and at most one is consumed per tick.
//! Debouncing is not modelled; scripted triggers are already clean edges.

use std::fmt;

use tracing::{info, warn};

use crate::indicator::CapacityIndicator;
use crate::random::RandomSource;
use crate::runtime::{InlineRuntime, TaskRuntime};
use crate::scheduler::{DeadlineMiss, EdfScheduler, GrantError, ScheduleStats};
use crate::task::{Task, TaskId, Tick};
use crate::trigger::Trigger;

/// What the processor did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Run(TaskId),
    Idle,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Run(id) => write!(f, "T{id}"),
            Slot::Idle => write!(f, "--"),
        }
    }
}

/// Everything observed during a simulation.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// One entry per simulated tick, starting at tick 0.
    pub timeline: Vec<Slot>,
    /// `(tick, id)` for every admission.
    pub admissions: Vec<(Tick, TaskId)>,
    pub misses: Vec<DeadlineMiss>,
    pub stats: ScheduleStats,
    pub tasks: Vec<Task>,
}

impl SimulationReport {
    /// Space-separated timeline, e.g. `T1 T1 -- T2`.
    pub fn timeline_string(&self) -> String {
        self.timeline
            .iter()
            .map(Slot::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn log(&self) {
        info!("=== Simulation report ===");
        for task in &self.tasks {
            info!(
                task = %task.id,
                budget = task.budget,
                period = task.period,
                admitted_at = task.admitted_at,
                "  task"
            );
        }
        for (row, slots) in self.timeline.chunks(20).enumerate() {
            let line = slots
                .iter()
                .map(Slot::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            info!("  {:>5} | {}", row * 20, line);
        }
        for miss in &self.misses {
            warn!(task = %miss.task, tick = miss.tick, "  deadline miss");
        }
        info!(
            ticks = self.stats.ticks,
            selections = self.stats.selections,
            idle_ticks = self.stats.idle_ticks,
            misses = self.stats.misses,
            rejected_triggers = self.stats.rejected_triggers,
            "  totals"
        );
    }
}

/// Largest timeline allocated up front; longer runs grow on demand.
const TIMELINE_PREALLOC: usize = 4096;

fn timeline_buffer(ticks: Tick) -> Vec<Slot> {
    let hint = usize::try_from(ticks).unwrap_or(usize::MAX);
    Vec::with_capacity(hint.min(TIMELINE_PREALLOC))
}

/// Scripted run of an [`EdfScheduler`].
pub struct Simulation<R, I> {
    scheduler: EdfScheduler<R, I>,
    runtime: InlineRuntime,
}

impl<R: RandomSource, I: CapacityIndicator> Simulation<R, I> {
    pub fn new(scheduler: EdfScheduler<R, I>, tick_ms: u64) -> Self {
        Self {
            scheduler,
            runtime: InlineRuntime::new(tick_ms),
        }
    }

    /// Simulate `ticks` ticks, with one trigger arriving at each entry of
    /// `triggers_at` (repeat a tick to press more than once).
    pub fn run(
        mut self,
        triggers_at: &[Tick],
        ticks: Tick,
    ) -> Result<SimulationReport, GrantError> {
        let queue_capacity = self.scheduler.capacity().max(1);
        let mut pending = 0usize;

        let mut timeline = timeline_buffer(ticks);
        let mut admissions = Vec::new();
        let mut misses = Vec::new();

        for _ in 0..ticks {
            let tick = self.scheduler.now();
            let arrivals = triggers_at.iter().filter(|&&t| t == tick).count();
            pending = (pending + arrivals).min(queue_capacity);

            let trigger = (pending > 0).then(|| {
                pending -= 1;
                Trigger
            });
            let report = self.scheduler.step(trigger);

            if let Some(id) = report.admitted {
                if let Some(task) = self.scheduler.task(id) {
                    self.runtime.spawn(task);
                }
                admissions.push((report.tick, id));
            }
            misses.extend(report.misses);

            let slot = match report.selected {
                Some(id) => {
                    self.runtime.run_tick(id, report.tick + 1)?;
                    Slot::Run(id)
                }
                None => Slot::Idle,
            };
            timeline.push(slot);
        }

        Ok(SimulationReport {
            timeline,
            admissions,
            misses,
            stats: *self.scheduler.stats(),
            tasks: self.scheduler.tasks().to_vec(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::AdmissionGate;
    use crate::indicator::RecordingIndicator;
    use crate::random::{ReplaySource, SplitMix64};

    fn simulation<R: RandomSource>(capacity: usize, rng: R) -> Simulation<R, RecordingIndicator> {
        let gate = AdmissionGate::new(rng, RecordingIndicator::default(), 5, 10);
        Simulation::new(EdfScheduler::new(capacity, gate), 1000)
    }

    fn id(n: u32) -> TaskId {
        TaskId::new(n).unwrap()
    }

    #[test]
    fn single_task_timeline() {
        let report = simulation(1, ReplaySource::fixed(2, 6)).run(&[0], 14).unwrap();
        assert_eq!(
            report.timeline_string(),
            "T1 T1 -- -- -- -- T1 T1 -- -- -- -- T1 T1"
        );
        assert!(report.misses.is_empty());
        assert_eq!(report.admissions, vec![(0, id(1))]);
    }

    #[test]
    fn overloaded_set_reports_misses_and_keeps_running() {
        // Three tasks of budget 2 / period 5 need 120 % of the processor.
        let rng = ReplaySource::new(vec![0, 4]);
        let report = simulation(3, rng).run(&[0, 0, 0], 40).unwrap();

        assert_eq!(report.tasks.len(), 3);
        assert_eq!(report.tasks[0].budget, 2);
        assert_eq!(report.tasks[0].period, 5);
        assert!(!report.misses.is_empty());
        assert_eq!(report.stats.ticks, 40);
        assert_eq!(report.stats.misses, report.misses.len() as u64);
    }

    #[test]
    fn triggers_beyond_capacity_are_dropped() {
        let report = simulation(2, SplitMix64::new(1))
            .run(&[0, 1, 2, 3, 4, 5], 10)
            .unwrap();
        assert_eq!(report.admissions.len(), 2);
        assert_eq!(report.stats.rejected_triggers, 4);
    }

    #[test]
    fn same_seed_same_run() {
        let script = [0, 3, 3, 8, 15];
        let a = simulation(5, SplitMix64::new(42)).run(&script, 120).unwrap();
        let b = simulation(5, SplitMix64::new(42)).run(&script, 120).unwrap();
        assert_eq!(a.timeline, b.timeline);
        assert_eq!(a.misses, b.misses);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn timeline_preallocation_is_bounded() {
        assert!(timeline_buffer(14).capacity() >= 14);
        assert!(timeline_buffer(u64::MAX).capacity() <= TIMELINE_PREALLOC);
    }

    #[test]
    fn at_most_one_admission_per_tick() {
        let report = simulation(3, SplitMix64::new(9)).run(&[2, 2, 2], 10).unwrap();
        let ticks: Vec<Tick> = report.admissions.iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, vec![2, 3, 4]);
    }
}
