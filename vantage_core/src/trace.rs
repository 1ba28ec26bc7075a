// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame pipeline.
//!
//! [`TraceSink`] has one method per event the pipeline emits. Every method
//! defaults to a no-op, so sinks override only what they record.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. With the `trace`
//! feature **off** every `Tracer` method compiles to nothing; with it **on**
//! each call costs one `Option` branch.
//!
//! [`FrameSummaryBuilder`] folds phase timestamps into a [`FrameSummary`].

use crate::backend::LockState;
use crate::output::EyeId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// A state of the frame pipeline.
///
/// Display-scoped phases carry the display index as their trace target,
/// eye-scoped phases the eye index, frame-scoped phases 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Frame-wide setup on both APIs.
    FrameInit,
    /// Per-display render setup.
    DisplayInit,
    /// Bind the eye's target, set viewport and projection, run the
    /// display-setup callback.
    EyeInit,
    /// Application draws the eye.
    EyeRender,
    /// Per-display presentation setup.
    DisplayPresentInit,
    /// Hand one eye to the presenter.
    EyePresent,
    /// Per-display presentation teardown.
    DisplayPresentFinalize,
    /// Frame-wide presentation teardown.
    FramePresentFinalize,
}

impl PhaseKind {
    /// Every phase, in pipeline order.
    pub const ALL: [Self; 8] = [
        Self::FrameInit,
        Self::DisplayInit,
        Self::EyeInit,
        Self::EyeRender,
        Self::DisplayPresentInit,
        Self::EyePresent,
        Self::DisplayPresentFinalize,
        Self::FramePresentFinalize,
    ];

    /// Short stable name, used by diagnostics output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FrameInit => "FrameInit",
            Self::DisplayInit => "DisplayInit",
            Self::EyeInit => "EyeInit",
            Self::EyeRender => "EyeRender",
            Self::DisplayPresentInit => "DisplayPresentInit",
            Self::EyePresent => "EyePresent",
            Self::DisplayPresentFinalize => "DisplayPresentFinalize",
            Self::FramePresentFinalize => "FramePresentFinalize",
        }
    }

    /// Does this phase belong to the presentation half of the frame?
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(
            self,
            Self::DisplayPresentInit
                | Self::EyePresent
                | Self::DisplayPresentFinalize
                | Self::FramePresentFinalize
        )
    }

    /// Position in [`PhaseKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::FrameInit => 0,
            Self::DisplayInit => 1,
            Self::EyeInit => 2,
            Self::EyeRender => 3,
            Self::DisplayPresentInit => 4,
            Self::EyePresent => 5,
            Self::DisplayPresentFinalize => 6,
            Self::FramePresentFinalize => 7,
        }
    }

    /// Inverse of [`index`](Self::index).
    #[must_use]
    pub const fn from_index(i: usize) -> Option<Self> {
        if i < Self::ALL.len() {
            Some(Self::ALL[i])
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the pipeline starts a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time at frame start.
    pub timestamp: HostTime,
    /// Presentation deadline handed to the display-setup callback.
    pub deadline: HostTime,
    /// Number of eyes in the frame.
    pub eyes: u32,
}

/// Marks the beginning of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Display or eye index, 0 for frame-wide phases.
    pub target: u32,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Display or eye index, 0 for frame-wide phases.
    pub target: u32,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
    /// Whether the phase succeeded.
    pub ok: bool,
}

/// Emitted when a shared surface changes owner.
#[derive(Clone, Copy, Debug)]
pub struct OwnershipEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Eye whose surface moved.
    pub eye: EyeId,
    /// New owner.
    pub owner: LockState,
    /// Host time of the transfer.
    pub timestamp: HostTime,
}

/// Per-frame timing summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time at frame start.
    pub start: HostTime,
    /// Presentation deadline.
    pub deadline: HostTime,
    /// Ticks spent in render-side phases.
    pub render_ticks: u64,
    /// Ticks spent in present-side phases.
    pub present_ticks: u64,
    /// Eyes handed to the presenter successfully.
    pub eyes_presented: u32,
    /// The frame was abandoned.
    pub aborted: bool,
    /// The frame finished after its deadline.
    pub missed_deadline: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame pipeline.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a shared surface changes owner.
    fn on_ownership(&mut self, e: &OwnershipEvent) {
        _ = e;
    }

    /// Called with the per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OwnershipEvent`].
    #[inline]
    pub fn ownership(&mut self, e: &OwnershipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_ownership(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Accumulates phase durations over a frame and produces a [`FrameSummary`].
///
/// Phases repeat (one `EyeRender` per eye), so durations are summed into a
/// render total and a present total rather than stored per phase.
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    begin: FrameBeginEvent,
    open: [Option<HostTime>; 8],
    render_ticks: u64,
    present_ticks: u64,
    eyes_presented: u32,
    aborted: bool,
}

impl FrameSummaryBuilder {
    /// Starts a summary for the frame described by `begin`.
    #[must_use]
    pub fn new(begin: &FrameBeginEvent) -> Self {
        Self {
            begin: *begin,
            open: [None; 8],
            render_ticks: 0,
            present_ticks: 0,
            eyes_presented: 0,
            aborted: false,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.open[phase.index()] = Some(t);
    }

    /// Records the end of a phase, adding its duration to the matching total.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        let Some(start) = self.open[phase.index()].take() else {
            return;
        };
        let ticks = t.saturating_duration_since(start).ticks();
        if phase.is_present() {
            self.present_ticks += ticks;
        } else {
            self.render_ticks += ticks;
        }
    }

    /// Counts one successfully presented eye.
    pub fn eye_presented(&mut self) {
        self.eyes_presented += 1;
    }

    /// Marks the frame as abandoned.
    pub fn set_aborted(&mut self) {
        self.aborted = true;
    }

    /// Consumes the builder. `end` is compared against the deadline.
    #[must_use]
    pub fn finish(self, end: HostTime) -> FrameSummary {
        FrameSummary {
            frame_index: self.begin.frame_index,
            start: self.begin.timestamp,
            deadline: self.begin.deadline,
            render_ticks: self.render_ticks,
            present_ticks: self.present_ticks,
            eyes_presented: self.eyes_presented,
            aborted: self.aborted,
            missed_deadline: end > self.begin.deadline,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
