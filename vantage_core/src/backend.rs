// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the frame pipeline and a display backend.
//!
//! A display backend owns the presentation graphics API (the device that
//! scans out to the headset). It implements [`Presenter`], whose methods the
//! pipeline calls in a fixed order every frame:
//!
//! ```text
//! render_frame_initialize
//! for each display d:
//!     render_display_initialize(d)
//!     (application renders eyes of d)
//!     present_display_initialize(d)      (after present_frame_initialize on d == 0)
//!     present_eye(params) per eye of d
//!     present_display_finalize(d)
//! present_frame_finalize
//! ```
//!
//! The pipeline never calls `present_eye` while the application's render API
//! still holds the eye's surface: it releases the surface first (see
//! [`LockState`]) and takes it back afterwards.

use alloc::string::String;

use crate::output::{DisplayId, EyeId};
use crate::transform::Transform3d;
use crate::viewport::Viewport;

/// Which graphics API currently owns a shared surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockState {
    /// The application's render API may draw into the surface.
    Renderer,
    /// The presentation API may sample the surface.
    Presenter,
}

/// Outcome of opening the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenStatus {
    /// Nothing usable was opened.
    Failure,
    /// The display opened but not in the requested mode.
    Partial,
    /// The display opened as requested.
    Complete,
}

/// Result of [`Presenter::open_display`].
#[derive(Debug)]
pub struct OpenResults<L> {
    /// How far opening got.
    pub status: OpenStatus,
    /// Native presentation-API handle, present unless opening failed.
    pub library: Option<L>,
}

impl<L> OpenResults<L> {
    /// A failed open with no library.
    #[must_use]
    pub fn failure() -> Self {
        Self {
            status: OpenStatus::Failure,
            library: None,
        }
    }

    /// A complete open carrying `library`.
    #[must_use]
    pub fn complete(library: L) -> Self {
        Self {
            status: OpenStatus::Complete,
            library: Some(library),
        }
    }
}

/// Errors reported by a [`Presenter`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PresentError {
    /// A frame method was called before the display was opened.
    #[error("display is not open")]
    DisplayNotOpen,
    /// The display index is out of range.
    #[error("no such display: {0:?}")]
    NoSuchDisplay(DisplayId),
    /// The presentation device reported a failure.
    #[error("presentation device error: {0}")]
    Device(String),
}

/// Presentation-side resources of one eye's shared surface.
#[derive(Debug)]
pub struct SurfaceRef<'a, T, V> {
    /// Texture the application's image lives in.
    pub texture: &'a T,
    /// View used to sample or target that texture.
    pub view: &'a V,
}

// Manual impls: `T` and `V` need not be `Copy`.
impl<T, V> Clone for SurfaceRef<'_, T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for SurfaceRef<'_, T, V> {}

/// Everything the backend needs to present one eye.
///
/// Values are already expressed in the presentation API's conventions.
#[derive(Debug)]
pub struct PresentEyeParams<'a, T, V> {
    /// Eye being presented.
    pub eye: EyeId,
    /// Display the eye is shown on.
    pub display: DisplayId,
    /// The eye's shared surface.
    pub surface: SurfaceRef<'a, T, V>,
    /// Placement on the display.
    pub viewport: Viewport,
    /// Flip the image vertically while presenting.
    pub flip_in_y: bool,
    /// The eye's panel is mounted upside down.
    pub rotate_180: bool,
    /// Roll about the viewing axis, in degrees.
    pub roll_degrees: f64,
    /// Optional time-warp texture matrix.
    pub time_warp: Option<Transform3d>,
}

/// Drives the presentation API for one headset.
///
/// All frame methods return `Err` to abandon the current frame; the pipeline
/// stays usable for the next one.
pub trait Presenter {
    /// Native handle of the presentation API (device plus context).
    type Library;
    /// Presentation-API texture type.
    type Texture;
    /// Presentation-API view type.
    type View;

    /// Opens the display. Called once before any frame.
    fn open_display(&mut self) -> OpenResults<Self::Library>;

    /// Start of a frame, before any eye is rendered.
    fn render_frame_initialize(&mut self) -> Result<(), PresentError>;

    /// Start of rendering for `display`.
    fn render_display_initialize(&mut self, display: DisplayId) -> Result<(), PresentError>;

    /// All eyes are rendered; presentation is about to start.
    fn present_frame_initialize(&mut self) -> Result<(), PresentError>;

    /// Start of presentation for `display`.
    fn present_display_initialize(&mut self, display: DisplayId) -> Result<(), PresentError>;

    /// Presents one eye.
    fn present_eye(
        &mut self,
        params: &PresentEyeParams<'_, Self::Texture, Self::View>,
    ) -> Result<(), PresentError>;

    /// End of presentation for `display`.
    fn present_display_finalize(&mut self, display: DisplayId) -> Result<(), PresentError>;

    /// End of the frame; typically swaps or flips.
    fn present_frame_finalize(&mut self) -> Result<(), PresentError>;
}
