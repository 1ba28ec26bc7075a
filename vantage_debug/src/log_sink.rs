// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace events forwarded to the `log` facade.
//!
//! Phase and ownership events go out at `trace` level, frame summaries at
//! `debug`. Failed phases, aborted frames and missed deadlines are raised to
//! `warn`.

use log::{Level, log};
use vantage_core::trace::{
    FrameBeginEvent, FrameSummary, OwnershipEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// Log target used when none is given.
pub const DEFAULT_TARGET: &str = "vantage::frame";

/// A [`TraceSink`] that writes events as log records.
#[derive(Clone, Copy, Debug)]
pub struct LogSink {
    target: &'static str,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    /// Logs under [`DEFAULT_TARGET`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: DEFAULT_TARGET,
        }
    }

    /// Logs under `target`.
    #[must_use]
    pub const fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    /// The log target.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }
}

/// Level a frame summary is logged at.
#[must_use]
pub fn summary_level(s: &FrameSummary) -> Level {
    if s.aborted || s.missed_deadline {
        Level::Warn
    } else {
        Level::Debug
    }
}

impl TraceSink for LogSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        log!(
            target: self.target,
            Level::Trace,
            "frame {} begin: {} eyes, deadline {}",
            e.frame_index,
            e.eyes,
            e.deadline.ticks()
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        log!(
            target: self.target,
            Level::Trace,
            "frame {} {}({}) begin",
            e.frame_index,
            e.phase.name(),
            e.target
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let level = if e.ok { Level::Trace } else { Level::Warn };
        log!(
            target: self.target,
            level,
            "frame {} {}({}) end{}",
            e.frame_index,
            e.phase.name(),
            e.target,
            if e.ok { "" } else { " (failed)" }
        );
    }

    fn on_ownership(&mut self, e: &OwnershipEvent) {
        log!(
            target: self.target,
            Level::Trace,
            "frame {} eye {} now owned by {:?}",
            e.frame_index,
            e.eye.0,
            e.owner
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        log!(
            target: self.target,
            summary_level(s),
            "frame {} {}: {} eyes presented, render {} ticks, present {} ticks{}",
            s.frame_index,
            if s.aborted { "aborted" } else { "done" },
            s.eyes_presented,
            s.render_ticks,
            s.present_ticks,
            if s.missed_deadline { ", missed deadline" } else { "" }
        );
    }
}
