/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! "Admission open" indicator output.
//!
//! On the reference board this is an LED that is lit while further tasks
//! can still be admitted.  Here it is a trait so the gate can drive a log
//! line, a GPIO wrapper, or a test recorder alike.

use tracing::info;

/// Binary output reflecting whether admission is still open.
pub trait CapacityIndicator {
    fn set_open(&mut self, open: bool);
}

/// Reports indicator changes through `tracing`.
#[derive(Debug, Default)]
pub struct LogIndicator;

impl CapacityIndicator for LogIndicator {
    fn set_open(&mut self, open: bool) {
        if open {
            info!(indicator = "open", "admission open");
        } else {
            info!(indicator = "closed", "admission closed – capacity reached");
        }
    }
}

/// Keeps every state written to it, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingIndicator {
    pub history: Vec<bool>,
}

impl RecordingIndicator {
    /// Current level, `None` before the first write.
    pub fn level(&self) -> Option<bool> {
        self.history.last().copied()
    }
}

impl CapacityIndicator for RecordingIndicator {
    fn set_open(&mut self, open: bool) {
        self.history.push(open);
    }
}
