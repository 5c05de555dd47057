/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Tick-driven Earliest-Deadline-First scheduler with button-triggered
//! task admission.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/       – YAML scheduler configuration
//! ├── task          – Task, TaskId, TaskTable, per-period ExecutionState
//! ├── random        – RandomSource seam + SplitMix64, task parameter draw
//! ├── indicator     – "admission open" output
//! ├── trigger       – debounced button edges → bounded channel
//! ├── admission     – Admission Gate
//! ├── scheduler/    – EdfScheduler: Deadline Monitor, EDF Selector, step()
//! ├── runtime       – one execution context per task (tokio / inline)
//! ├── driver        – real-time Tick Driver loop
//! └── simulation    – deterministic scripted runs
//! ```

pub mod admission;
pub mod config;
pub mod driver;
pub mod indicator;
pub mod random;
pub mod runtime;
pub mod scheduler;
pub mod simulation;
pub mod task;
pub mod trigger;
