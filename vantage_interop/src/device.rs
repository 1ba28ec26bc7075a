// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native capabilities of the presentation API plus its interop extension.
//!
//! [`InteropDevice`] is the narrow surface the registry needs: make a texture
//! the application's buffer can alias, share it, bind the two together, and
//! move ownership back and forth. A D3D11 device with `WGL_NV_DX_interop2`
//! is the canonical implementation; tests use a recording fake.

use std::fmt;
use std::hash::Hash;

/// Pixel size of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Creates an extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Is either dimension zero?
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel format of presentation textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SurfaceFormat {
    /// 8-bit RGBA, normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB-encoded.
    Rgba8UnormSrgb,
    /// 16-bit float RGBA.
    Rgba16Float,
}

/// A native call failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{call} failed: {detail}")]
pub struct DeviceError {
    /// Name of the failing native call.
    pub call: &'static str,
    /// Driver-provided detail.
    pub detail: String,
}

impl DeviceError {
    /// Creates an error for `call`.
    pub fn new(call: &'static str, detail: impl Into<String>) -> Self {
        Self {
            call,
            detail: detail.into(),
        }
    }
}

/// Presentation-API device plus the interop extension that lets the
/// application's render API draw into its textures.
///
/// Every handle returned by a `create_*`/`share_*`/`register` call is owned by
/// the caller and handed back to the matching release method exactly once.
pub trait InteropDevice: Sized {
    /// Native presentation library handle the device is opened from.
    type Library;
    /// Identifier of an application (render-API) color buffer.
    type AppBuffer: Copy + Eq + Hash + fmt::Debug;
    /// Presentation texture.
    type Texture;
    /// Render-target view of a presentation texture.
    type View;
    /// Cross-device share handle of a texture.
    type ShareHandle;
    /// Interop registration binding an application buffer to a texture.
    type Registration;

    /// Opens the interop device on `library`.
    fn open(library: &Self::Library) -> Result<Self, DeviceError>;

    /// Queries the size of an application buffer.
    fn buffer_extent(&mut self, buffer: Self::AppBuffer) -> Result<Extent, DeviceError>;

    /// Creates a shareable texture usable as render target and shader input.
    fn create_texture(
        &mut self,
        extent: Extent,
        format: SurfaceFormat,
    ) -> Result<Self::Texture, DeviceError>;

    /// Creates a render-target view of `texture`.
    fn create_view(
        &mut self,
        texture: &Self::Texture,
        format: SurfaceFormat,
    ) -> Result<Self::View, DeviceError>;

    /// Creates a share handle for `texture` and announces it to the interop
    /// extension.
    fn share_texture(&mut self, texture: &Self::Texture) -> Result<Self::ShareHandle, DeviceError>;

    /// Binds `buffer` to `texture` for write-discard access.
    fn register(
        &mut self,
        texture: &Self::Texture,
        share: &Self::ShareHandle,
        buffer: Self::AppBuffer,
    ) -> Result<Self::Registration, DeviceError>;

    /// Gives the render API access to the registered surface.
    fn lock(&mut self, registration: &Self::Registration) -> Result<(), DeviceError>;

    /// Returns the registered surface to the presentation API.
    fn unlock(&mut self, registration: &Self::Registration) -> Result<(), DeviceError>;

    /// Drops a registration.
    fn unregister(&mut self, registration: Self::Registration);

    /// Releases a share handle.
    fn release_share(&mut self, share: Self::ShareHandle);

    /// Releases a view.
    fn destroy_view(&mut self, view: Self::View);

    /// Releases a texture.
    fn destroy_texture(&mut self, texture: Self::Texture);

    /// Closes the interop device. No other method is called afterwards.
    fn close(&mut self);
}
