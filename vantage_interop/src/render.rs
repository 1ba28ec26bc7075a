// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The application's render API, as seen by the pipeline.

use std::fmt;
use std::hash::Hash;

use vantage_core::transform::Transform3d;
use vantage_core::viewport::Viewport;

use crate::device::DeviceError;

/// Render-side (application API) operations needed to set up an eye.
///
/// For OpenGL this is a framebuffer object: attach the eye's color texture
/// and depth renderbuffer, check completeness, then `glViewport` and the
/// projection matrix.
pub trait RenderDevice {
    /// Library/context handle passed to application callbacks.
    type Context;
    /// Application color buffer id.
    type ColorBuffer: Copy + Eq + Hash + fmt::Debug;
    /// Application depth buffer.
    type DepthBuffer;

    /// The current context, or `None` if it has been lost.
    fn context(&self) -> Option<&Self::Context>;

    /// Attaches `color` and `depth` as the current render target.
    fn bind_render_target(
        &mut self,
        color: Self::ColorBuffer,
        depth: &Self::DepthBuffer,
    ) -> Result<(), DeviceError>;

    /// Is the bound render target complete?
    fn framebuffer_complete(&mut self) -> bool;

    /// Sets the viewport for subsequent drawing.
    fn set_viewport(&mut self, viewport: &Viewport);

    /// Loads `projection` as the projection matrix.
    fn set_projection(&mut self, projection: &Transform3d);
}
