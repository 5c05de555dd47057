/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task Runtime Binding: one execution context per admitted task.
//!
//! ```text
//!   Tick Driver ──Grant{tick, ack}──► [cap-1 mpsc] ──► execution context
//!        ▲                                               │ run_tick()
//!        └──────────────── GrantReport (oneshot) ◄───────┘
//! ```
//!
//! A context is suspended on its grant channel and does exactly one tick of
//! work per grant.  The driver awaits the acknowledgement before starting
//! the next selection cycle, so a grant and the progress update it causes
//! are complete before the Deadline Monitor looks at the task again.

use std::future::{self, Future};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::scheduler::GrantError;
use crate::task::{ExecutionState, Task, TaskId, Tick};

// ── Grant protocol ────────────────────────────────────────────────────────────

/// Progress record emitted by a context after one granted tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantReport {
    pub task: TaskId,
    /// Tick value after the driver's increment, i.e. the end of the granted tick.
    pub tick: Tick,
    /// Work done in the current period including this tick.
    pub elapsed: Tick,
    /// `true` if this tick consumed the last of the period's budget.
    pub completed: bool,
}

/// Seam between the Tick Driver and whatever executes task work.
pub trait TaskRuntime {
    /// Create the execution context for a newly admitted task.
    fn spawn(&mut self, task: &Task);

    /// Wake `id` for one tick and wait until that tick of work is done.
    fn grant(
        &mut self,
        id: TaskId,
        tick: Tick,
    ) -> impl Future<Output = Result<GrantReport, GrantError>> + Send;
}

/// Do one tick of work on `state` and emit the progress record.
fn perform_tick(id: TaskId, state: &ExecutionState, tick: Tick, tick_ms: u64) -> GrantReport {
    let elapsed = state.run_tick();
    let completed = state.is_completed();
    info!(
        time_ms = tick * tick_ms,
        task = %id,
        elapsed,
        "{}ms | Task number {}, elapsed = {}",
        tick * tick_ms,
        id,
        elapsed,
    );
    GrantReport {
        task: id,
        tick,
        elapsed,
        completed,
    }
}

// ── TokioRuntime ──────────────────────────────────────────────────────────────

struct Grant {
    tick: Tick,
    ack: oneshot::Sender<GrantReport>,
}

struct Context {
    grants: mpsc::Sender<Grant>,
    handle: JoinHandle<()>,
}

/// Runs each task as its own tokio task.
pub struct TokioRuntime {
    contexts: Vec<Context>,
    tick_ms: u64,
}

impl TokioRuntime {
    /// `tick_ms` is only used to print wall-clock times in progress records.
    pub fn new(tick_ms: u64) -> Self {
        Self {
            contexts: Vec::new(),
            tick_ms,
        }
    }

    /// Number of live execution contexts.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Close every grant channel and wait for the contexts to exit.
    pub async fn shutdown(self) {
        let handles: Vec<_> = self
            .contexts
            .into_iter()
            .map(|c| {
                drop(c.grants);
                c.handle
            })
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
        debug!("all execution contexts stopped");
    }
}

async fn execution_context(
    id: TaskId,
    state: Arc<ExecutionState>,
    mut grants: mpsc::Receiver<Grant>,
    tick_ms: u64,
) {
    while let Some(Grant { tick, ack }) = grants.recv().await {
        let report = perform_tick(id, &state, tick, tick_ms);
        // The driver only drops the receiver if it is shutting down.
        let _ = ack.send(report);
    }
    debug!(task = %id, "execution context finished");
}

impl TaskRuntime for TokioRuntime {
    fn spawn(&mut self, task: &Task) {
        debug_assert_eq!(
            task.id.index(),
            self.contexts.len(),
            "contexts must be spawned in id order"
        );
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(execution_context(
            task.id,
            Arc::clone(task.state()),
            rx,
            self.tick_ms,
        ));
        self.contexts.push(Context { grants: tx, handle });
        debug!(task = %task.id, "execution context spawned");
    }

    fn grant(
        &mut self,
        id: TaskId,
        tick: Tick,
    ) -> impl Future<Output = Result<GrantReport, GrantError>> + Send {
        let grants = self.contexts.get(id.index()).map(|c| c.grants.clone());
        async move {
            let grants = grants.ok_or(GrantError::UnknownTask(id))?;
            let (ack, done) = oneshot::channel();
            grants
                .send(Grant { tick, ack })
                .await
                .map_err(|_| GrantError::ContextGone(id))?;
            done.await.map_err(|_| GrantError::ContextGone(id))
        }
    }
}

// ── InlineRuntime ─────────────────────────────────────────────────────────────

/// Executes granted ticks synchronously on the caller's thread.
///
/// Used by the simulation and by tests that need a fully deterministic run.
#[derive(Debug, Default)]
pub struct InlineRuntime {
    states: Vec<Arc<ExecutionState>>,
    tick_ms: u64,
}

impl InlineRuntime {
    pub fn new(tick_ms: u64) -> Self {
        Self {
            states: Vec::new(),
            tick_ms,
        }
    }

    /// Synchronous form of [`TaskRuntime::grant`].
    pub fn run_tick(&mut self, id: TaskId, tick: Tick) -> Result<GrantReport, GrantError> {
        let state = self
            .states
            .get(id.index())
            .ok_or(GrantError::UnknownTask(id))?;
        Ok(perform_tick(id, state, tick, self.tick_ms))
    }
}

impl TaskRuntime for InlineRuntime {
    fn spawn(&mut self, task: &Task) {
        self.states.push(Arc::clone(task.state()));
    }

    fn grant(
        &mut self,
        id: TaskId,
        tick: Tick,
    ) -> impl Future<Output = Result<GrantReport, GrantError>> + Send {
        future::ready(self.run_tick(id, tick))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskParams;

    fn task(id: u32, budget: Tick) -> Task {
        Task::new(
            TaskId::new(id).unwrap(),
            TaskParams { budget, period: 6 },
            0,
        )
    }

    #[tokio::test]
    async fn tokio_context_runs_one_tick_per_grant() {
        let t = task(1, 2);
        let mut rt = TokioRuntime::new(1000);
        rt.spawn(&t);

        let r1 = rt.grant(t.id, 1).await.unwrap();
        assert_eq!((r1.elapsed, r1.completed), (1, false));
        assert!(!t.is_completed());

        let r2 = rt.grant(t.id, 2).await.unwrap();
        assert_eq!((r2.elapsed, r2.completed), (2, true));
        assert!(t.is_completed(), "flag visible as soon as the grant returns");

        rt.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_task_is_an_error() {
        let mut rt = TokioRuntime::new(1000);
        let err = rt.grant(TaskId::new(3).unwrap(), 1).await.unwrap_err();
        assert_eq!(err, GrantError::UnknownTask(TaskId::new(3).unwrap()));
    }

    #[tokio::test]
    async fn aborted_context_reports_gone() {
        let t = task(1, 2);
        let mut rt = TokioRuntime::new(1000);
        rt.spawn(&t);
        rt.contexts[0].handle.abort();
        let _ = (&mut rt.contexts[0].handle).await;

        let err = rt.grant(t.id, 1).await.unwrap_err();
        assert_eq!(err, GrantError::ContextGone(t.id));
    }

    #[tokio::test]
    async fn contexts_only_touch_their_own_task() {
        let (a, b) = (task(1, 3), task(2, 3));
        let mut rt = TokioRuntime::new(1000);
        rt.spawn(&a);
        rt.spawn(&b);
        assert_eq!(rt.len(), 2);

        rt.grant(b.id, 1).await.unwrap();
        assert_eq!(a.state().elapsed(), 0);
        assert_eq!(b.state().elapsed(), 1);
        rt.shutdown().await;
    }

    #[test]
    fn inline_runtime_matches_context_behaviour() {
        let t = task(1, 1);
        let mut rt = InlineRuntime::new(10);
        rt.spawn(&t);

        let report = rt.run_tick(t.id, 4).unwrap();
        assert_eq!(
            report,
            GrantReport {
                task: t.id,
                tick: 4,
                elapsed: 1,
                completed: true
            }
        );
        assert!(rt.run_tick(TaskId::new(2).unwrap(), 5).is_err());
    }
}
