// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame state machine.
//!
//! A frame walks the states below in exactly this order, once per display
//! and once per eye of that display:
//!
//! ```text
//! FrameInit
//!   DisplayInit(d)
//!     EyeInit(e) EyeRender(e)        for each eye of d
//!   DisplayPresentInit(d)
//!     EyePresent(e)                  for each eye of d
//!   DisplayPresentFinalize(d)
//! FramePresentFinalize
//! ```
//!
//! [`FrameState::next`] computes the single legal successor of a state, and
//! [`FrameSequencer`] refuses any transition other than that one.

use vantage_core::config::DisplayConfiguration;
use vantage_core::output::{DisplayId, EyeId};
use vantage_core::trace::PhaseKind;

use crate::error::ProtocolError;

/// Which eyes each display shows, in presentation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    displays: Vec<Vec<EyeId>>,
}

impl FrameLayout {
    /// Derives the layout from a display configuration.
    #[must_use]
    pub fn from_config(config: &DisplayConfiguration) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "display counts are 1 or 2"
        )]
        let displays = (0..config.num_displays())
            .map(|d| config.eyes_for_display(DisplayId(d as u32)))
            .collect();
        Self { displays }
    }

    /// Builds a layout from explicit per-display eye lists.
    #[must_use]
    pub fn from_displays(displays: Vec<Vec<EyeId>>) -> Self {
        Self { displays }
    }

    /// Number of displays.
    #[must_use]
    pub fn num_displays(&self) -> usize {
        self.displays.len()
    }

    /// Eyes shown on `display`.
    #[must_use]
    pub fn eyes(&self, display: DisplayId) -> &[EyeId] {
        self.displays
            .get(display.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Display showing `eye`.
    #[must_use]
    pub fn display_of(&self, eye: EyeId) -> Option<DisplayId> {
        let d = self.displays.iter().position(|eyes| eyes.contains(&eye))?;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "display counts are 1 or 2"
        )]
        let d = d as u32;
        Some(DisplayId(d))
    }

    fn eye_after(&self, eye: EyeId) -> Option<EyeId> {
        let eyes = self.eyes(self.display_of(eye)?);
        let at = eyes.iter().position(|e| *e == eye)?;
        eyes.get(at + 1).copied()
    }
}

/// A state of the frame pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// No frame in progress.
    Idle,
    /// Frame-wide setup.
    FrameInit,
    /// Render setup for a display.
    DisplayInit(DisplayId),
    /// Render-target setup for an eye.
    EyeInit(EyeId),
    /// Application rendering of an eye.
    EyeRender(EyeId),
    /// Presentation setup for a display.
    DisplayPresentInit(DisplayId),
    /// Presentation of an eye.
    EyePresent(EyeId),
    /// Presentation teardown for a display.
    DisplayPresentFinalize(DisplayId),
    /// Frame-wide presentation teardown.
    FramePresentFinalize,
}

impl FrameState {
    /// The unique legal successor of `self` under `layout`.
    ///
    /// Returns `None` after [`FramePresentFinalize`](Self::FramePresentFinalize)
    /// and for states that do not belong to `layout`.
    #[must_use]
    pub fn next(self, layout: &FrameLayout) -> Option<Self> {
        let first_eye = |d: DisplayId| layout.eyes(d).first().copied();
        match self {
            Self::Idle => Some(Self::FrameInit),
            Self::FrameInit => {
                (layout.num_displays() > 0).then_some(Self::DisplayInit(DisplayId(0)))
            }
            Self::DisplayInit(d) => {
                Some(first_eye(d).map_or(Self::DisplayPresentInit(d), Self::EyeInit))
            }
            Self::EyeInit(e) => {
                layout.display_of(e)?;
                Some(Self::EyeRender(e))
            }
            Self::EyeRender(e) => {
                let d = layout.display_of(e)?;
                Some(layout.eye_after(e).map_or(Self::DisplayPresentInit(d), Self::EyeInit))
            }
            Self::DisplayPresentInit(d) => {
                Some(first_eye(d).map_or(Self::DisplayPresentFinalize(d), Self::EyePresent))
            }
            Self::EyePresent(e) => {
                let d = layout.display_of(e)?;
                Some(layout.eye_after(e).map_or(Self::DisplayPresentFinalize(d), Self::EyePresent))
            }
            Self::DisplayPresentFinalize(d) => {
                let next = DisplayId(d.0 + 1);
                if next.index() < layout.num_displays() {
                    Some(Self::DisplayInit(next))
                } else {
                    Some(Self::FramePresentFinalize)
                }
            }
            Self::FramePresentFinalize => None,
        }
    }

    /// Trace phase and target index for this state; `None` for `Idle`.
    #[must_use]
    pub fn phase(self) -> Option<(PhaseKind, u32)> {
        Some(match self {
            Self::Idle => return None,
            Self::FrameInit => (PhaseKind::FrameInit, 0),
            Self::DisplayInit(d) => (PhaseKind::DisplayInit, d.0),
            Self::EyeInit(e) => (PhaseKind::EyeInit, e.0),
            Self::EyeRender(e) => (PhaseKind::EyeRender, e.0),
            Self::DisplayPresentInit(d) => (PhaseKind::DisplayPresentInit, d.0),
            Self::EyePresent(e) => (PhaseKind::EyePresent, e.0),
            Self::DisplayPresentFinalize(d) => (PhaseKind::DisplayPresentFinalize, d.0),
            Self::FramePresentFinalize => (PhaseKind::FramePresentFinalize, 0),
        })
    }
}

/// Tracks the current state of one frame and enforces ordering.
#[derive(Debug)]
pub struct FrameSequencer<'a> {
    layout: &'a FrameLayout,
    current: FrameState,
}

impl<'a> FrameSequencer<'a> {
    /// Starts in [`FrameState::Idle`].
    #[must_use]
    pub fn new(layout: &'a FrameLayout) -> Self {
        Self {
            layout,
            current: FrameState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> FrameState {
        self.current
    }

    /// The only state [`advance`](Self::advance) will accept.
    #[must_use]
    pub fn peek(&self) -> Option<FrameState> {
        self.current.next(self.layout)
    }

    /// Moves to `to`, if it is the legal successor.
    pub fn advance(&mut self, to: FrameState) -> Result<(), ProtocolError> {
        let expected = self.peek();
        if expected != Some(to) {
            return Err(ProtocolError::OutOfOrder { expected, got: to });
        }
        self.current = to;
        Ok(())
    }

    /// Has the frame reached its last state?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current == FrameState::FramePresentFinalize
    }
}
