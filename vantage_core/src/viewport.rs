// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-eye viewports and projections derived from a [`DisplayConfiguration`].
//!
//! Two placements exist for every eye:
//!
//! - the *render* viewport, inside the eye's own color buffer (always anchored
//!   at the origin, sized to the eye's share of the display), and
//! - the *present* rectangle, where the eye lands on the physical display,
//!   which depends on the display mode and on `swap_eyes`.
//!
//! Coordinates follow the OpenGL convention: origin at the lower-left.

use kurbo::Rect;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::config::{DisplayConfiguration, DisplayMode};
use crate::output::EyeId;
use crate::transform::Transform3d;

/// An axis-aligned viewport in pixels, origin at the lower-left.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Viewport {
    /// Left edge.
    pub left: f64,
    /// Bottom edge.
    pub lower: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Viewport {
    /// Viewport used while rendering `eye` into its own buffer.
    #[must_use]
    pub fn for_render(config: &DisplayConfiguration, _eye: EyeId) -> Self {
        let (width, height) = eye_buffer_size(config);
        Self {
            left: 0.0,
            lower: 0.0,
            width,
            height,
        }
    }

    /// Where `eye` lands on its display.
    #[must_use]
    pub fn for_present(config: &DisplayConfiguration, eye: EyeId) -> Self {
        let (width, height) = eye_buffer_size(config);
        let second = if config.swap_eyes() {
            eye.index() == 0
        } else {
            eye.index() != 0
        };
        let slot = if second { 1.0 } else { 0.0 };
        match config.display_mode() {
            DisplayMode::HorizontalSideBySide => Self {
                left: slot * width,
                lower: 0.0,
                width,
                height,
            },
            // First eye on the upper half.
            DisplayMode::VerticalSideBySide => Self {
                left: 0.0,
                lower: (1.0 - slot) * height,
                width,
                height,
            },
            DisplayMode::FullScreen => Self {
                left: 0.0,
                lower: 0.0,
                width,
                height,
            },
        }
    }

    /// Returns the viewport as a [`Rect`].
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.left,
            self.lower,
            self.left + self.width,
            self.lower + self.height,
        )
    }

    /// Is either dimension zero or negative?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Pixel size of one eye's share of a display at the active resolution.
#[must_use]
pub fn eye_buffer_size(config: &DisplayConfiguration) -> (f64, f64) {
    let width = f64::from(config.display_width());
    let height = f64::from(config.display_height());
    if config.num_eyes() < 2 {
        return (width, height);
    }
    match config.display_mode() {
        DisplayMode::HorizontalSideBySide => (width / 2.0, height),
        DisplayMode::VerticalSideBySide => (width, height / 2.0),
        DisplayMode::FullScreen => (width, height),
    }
}

/// Perspective projection for `eye`.
///
/// The frustum spans the monocular field of view. The center of projection
/// splits the near-plane extent (0.5 is symmetric). With partial overlap the
/// two frusta are pushed apart: the first eye outward to the left, the second
/// to the right, by the non-overlapping share of the half-width.
#[must_use]
pub fn eye_projection(
    config: &DisplayConfiguration,
    eye: EyeId,
    near: f64,
    far: f64,
) -> Transform3d {
    let info = config.eye(eye).copied().unwrap_or_default();
    let width = 2.0 * near * (config.horizontal_fov_radians() / 2.0).tan();
    let height = 2.0 * near * (config.vertical_fov_radians() / 2.0).tan();

    let mut left = -width * info.center_proj_x;
    let mut right = width * (1.0 - info.center_proj_x);
    let bottom = -height * info.center_proj_y;
    let top = height * (1.0 - info.center_proj_y);

    if config.num_eyes() == 2 {
        let shift = (1.0 - config.overlap()) * width / 2.0;
        let shift = if eye.index() == 0 { -shift } else { shift };
        left += shift;
        right += shift;
    }
    Transform3d::from_frustum(left, right, bottom, top, near, far)
}
