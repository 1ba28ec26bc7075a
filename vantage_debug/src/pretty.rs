// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use vantage_core::backend::LockState;
use vantage_core::time::{HostTime, Timebase};
use vantage_core::trace::{
    FrameBeginEvent, FrameSummary, OwnershipEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] {} eyes={} at {:.1}µs deadline={:.1}µs",
            e.frame_index,
            e.eyes,
            self.host_us(e.timestamp),
            self.host_us(e.deadline),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}({}) at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            e.target,
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let status = if e.ok { "ok" } else { "FAILED" };
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}({}) at {:.1}µs {status}",
            e.frame_index,
            e.phase.name(),
            e.target,
            self.host_us(e.timestamp),
        );
    }

    fn on_ownership(&mut self, e: &OwnershipEvent) {
        let owner = match e.owner {
            LockState::Renderer => "renderer",
            LockState::Presenter => "presenter",
        };
        let _ = writeln!(
            self.writer,
            "[owner] frame={} eye={} -> {owner} at {:.1}µs",
            e.frame_index,
            e.eye.0,
            self.host_us(e.timestamp),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let outcome = if s.aborted { "ABORTED" } else { "done" };
        let deadline = if s.missed_deadline {
            "deadline=MISSED"
        } else {
            "deadline=ok"
        };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} {outcome} eyes={} render={:.1}µs present={:.1}µs {deadline}",
            s.frame_index,
            s.eyes_presented,
            self.ticks_to_us(s.render_ticks),
            self.ticks_to_us(s.present_ticks),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::output::EyeId;
    use vantage_core::trace::PhaseKind;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn failed_phase_is_flagged() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 3,
            phase: PhaseKind::EyePresent,
            target: 1,
            timestamp: HostTime(2_000),
            ok: false,
        });
        let out = output(sink);
        assert!(out.contains("EyePresent(1)"), "got: {out}");
        assert!(out.contains("FAILED"), "got: {out}");
        assert!(out.contains("2.0µs"), "got: {out}");
    }

    #[test]
    fn ownership_and_summary_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_ownership(&OwnershipEvent {
            frame_index: 1,
            eye: EyeId(0),
            owner: LockState::Presenter,
            timestamp: HostTime(0),
        });
        sink.on_frame_summary(&FrameSummary {
            frame_index: 1,
            start: HostTime(0),
            deadline: HostTime(10),
            render_ticks: 1_500,
            present_ticks: 500,
            eyes_presented: 1,
            aborted: true,
            missed_deadline: false,
        });
        let out = output(sink);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2, "got: {out}");
        assert!(lines[0].starts_with("[owner] frame=1 eye=0 -> presenter"), "got: {out}");
        assert!(lines[1].contains("ABORTED"), "got: {out}");
        assert!(lines[1].contains("render=1.5µs"), "got: {out}");
        assert!(lines[1].ends_with("deadline=ok"), "got: {out}");
    }
}
