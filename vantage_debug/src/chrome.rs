// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Frame-scoped phases land on thread 0; eye- and display-scoped phases on
//! thread `target + 1`, so each eye gets its own lane.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use vantage_core::time::Timebase;
use vantage_core::trace::PhaseKind;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "eyes": e.eyes,
                        "deadline_us": ticks_to_us(e.deadline.ticks(), timebase),
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": category(e.phase),
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": lane(e.phase, e.target),
                    "args": {
                        "frame_index": e.frame_index,
                        "target": e.target,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": category(e.phase),
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": lane(e.phase, e.target),
                    "args": {
                        "frame_index": e.frame_index,
                        "ok": e.ok,
                    }
                }));
            }
            RecordedEvent::Ownership(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.owner),
                    "cat": "Ownership",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": e.eye.0 + 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": ticks_to_us(s.start.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "render_us": ticks_to_us(s.render_ticks, timebase),
                        "present_us": ticks_to_us(s.present_ticks, timebase),
                        "eyes_presented": s.eyes_presented,
                        "aborted": s.aborted,
                        "missed_deadline": s.missed_deadline,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn category(phase: PhaseKind) -> &'static str {
    if phase.is_present() { "Present" } else { "Render" }
}

fn lane(phase: PhaseKind, target: u32) -> u32 {
    match phase {
        PhaseKind::FrameInit | PhaseKind::FramePresentFinalize => 0,
        _ => target + 1,
    }
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use vantage_core::backend::LockState;
    use vantage_core::output::EyeId;
    use vantage_core::time::HostTime;
    use vantage_core::trace::{
        FrameBeginEvent, OwnershipEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            timestamp: HostTime(1_000_000),
            deadline: HostTime(1_011_000),
            eyes: 2,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::EyePresent,
            target: 1,
            timestamp: HostTime(1_000_000),
        });
        rec.on_ownership(&OwnershipEvent {
            frame_index: 0,
            eye: EyeId(1),
            owner: LockState::Presenter,
            timestamp: HostTime(1_000_050),
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::EyePresent,
            target: 1,
            timestamp: HostTime(1_000_100),
            ok: true,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "FrameBegin");

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "EyePresent");
        assert_eq!(parsed[1]["cat"], "Present");
        assert_eq!(parsed[1]["tid"], 2);
        assert_eq!(parsed[1]["ts"], 1000.0);

        assert_eq!(parsed[2]["name"], "Presenter");
        assert_eq!(parsed[2]["tid"], 2);

        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[3]["args"]["ok"], true);
    }

    #[test]
    fn frame_phases_use_lane_zero() {
        assert_eq!(lane(PhaseKind::FrameInit, 0), 0);
        assert_eq!(lane(PhaseKind::FramePresentFinalize, 0), 0);
        assert_eq!(lane(PhaseKind::DisplayInit, 0), 1);
        assert_eq!(lane(PhaseKind::EyeRender, 1), 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
