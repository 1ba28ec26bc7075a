// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording doubles for the device traits.
//!
//! All three fakes share one [`Handle`]: a call log plus knobs that make
//! individual calls fail.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use vantage_core::backend::{OpenResults, OpenStatus, PresentError, PresentEyeParams, Presenter};
use vantage_core::output::DisplayId;
use vantage_core::transform::Transform3d;
use vantage_core::viewport::Viewport;

use crate::device::{DeviceError, Extent, InteropDevice, SurfaceFormat};
use crate::render::RenderDevice;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Open,
    QueryExtent(u32),
    CreateTexture(u32, Extent),
    CreateView(u32),
    Share(u32),
    Register { buffer: u32, texture: u32 },
    Lock(u32),
    Unlock(u32),
    Unregister(u32),
    ReleaseShare(u32),
    DestroyView(u32),
    DestroyTexture(u32),
    Close,

    OpenDisplay,
    RenderFrameInit,
    RenderDisplayInit(u32),
    PresentFrameInit,
    PresentDisplayInit(u32),
    PresentEye {
        eye: u32,
        texture: u32,
        buffer_locked: bool,
        flip_in_y: bool,
        rotate_180: bool,
        roll: f64,
        time_warp: Option<Transform3d>,
        viewport: Viewport,
    },
    PresentDisplayFinalize(u32),
    PresentFrameFinalize,

    Bind(u32),
    SetViewport(Viewport),
    SetProjection,
    DisplaySetup(u32),
    RenderEye(u32),

    PresenterDropped,
    RenderDropped,
}

#[derive(Debug, Default)]
pub(crate) struct Knobs {
    /// Buffers reporting zero size.
    pub(crate) zero_extent: Vec<u32>,
    /// Device calls that always fail, by name (`"create_view"`, ...).
    pub(crate) failing: Vec<&'static str>,
    /// The next N `lock` calls fail.
    pub(crate) lock_failures: usize,
    /// `present_eye` fails.
    pub(crate) present_fails: bool,
    /// Render targets are reported incomplete.
    pub(crate) incomplete: bool,
    /// The render API has lost its context.
    pub(crate) no_render_context: bool,
    /// Status `open_display` reports.
    pub(crate) open_status: Option<OpenStatus>,
}

#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) log: Vec<Call>,
    pub(crate) knobs: Knobs,
    next_id: u32,
    locked: HashSet<u32>,
    texture_buffer: HashMap<u32, u32>,
}

impl Shared {
    fn fail(&self, call: &'static str) -> Result<(), DeviceError> {
        if self.knobs.failing.contains(&call) {
            Err(DeviceError::new(call, "injected"))
        } else {
            Ok(())
        }
    }

    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

pub(crate) type Handle = Arc<Mutex<Shared>>;

pub(crate) fn handle() -> Handle {
    Arc::new(Mutex::new(Shared::default()))
}

/// Calls recorded so far.
pub(crate) fn calls(handle: &Handle) -> Vec<Call> {
    handle.lock().log.clone()
}

/// Recorded calls that belong to the interop device.
pub(crate) fn device_calls(handle: &Handle) -> Vec<Call> {
    calls(handle)
        .into_iter()
        .filter(|c| {
            matches!(
                c,
                Call::Open
                    | Call::QueryExtent(_)
                    | Call::CreateTexture(..)
                    | Call::CreateView(_)
                    | Call::Share(_)
                    | Call::Register { .. }
                    | Call::Lock(_)
                    | Call::Unlock(_)
                    | Call::Unregister(_)
                    | Call::ReleaseShare(_)
                    | Call::DestroyView(_)
                    | Call::DestroyTexture(_)
                    | Call::Close
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Interop device
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FakeTexture(pub(crate) u32);
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FakeView(pub(crate) u32);
#[derive(Debug)]
pub(crate) struct FakeShare(u32);
#[derive(Debug)]
pub(crate) struct FakeRegistration {
    buffer: u32,
}

#[derive(Debug)]
pub(crate) struct FakeDevice {
    shared: Handle,
}

impl InteropDevice for FakeDevice {
    type Library = Handle;
    type AppBuffer = u32;
    type Texture = FakeTexture;
    type View = FakeView;
    type ShareHandle = FakeShare;
    type Registration = FakeRegistration;

    fn open(library: &Handle) -> Result<Self, DeviceError> {
        let mut s = library.lock();
        s.fail("open")?;
        s.log.push(Call::Open);
        Ok(Self {
            shared: library.clone(),
        })
    }

    fn buffer_extent(&mut self, buffer: u32) -> Result<Extent, DeviceError> {
        let mut s = self.shared.lock();
        s.log.push(Call::QueryExtent(buffer));
        s.fail("buffer_extent")?;
        if s.knobs.zero_extent.contains(&buffer) {
            Ok(Extent::new(0, 1024))
        } else {
            Ok(Extent::new(1024, 1024))
        }
    }

    fn create_texture(
        &mut self,
        extent: Extent,
        _format: SurfaceFormat,
    ) -> Result<FakeTexture, DeviceError> {
        let mut s = self.shared.lock();
        s.fail("create_texture")?;
        let id = s.id();
        s.log.push(Call::CreateTexture(id, extent));
        Ok(FakeTexture(id))
    }

    fn create_view(
        &mut self,
        texture: &FakeTexture,
        _format: SurfaceFormat,
    ) -> Result<FakeView, DeviceError> {
        let mut s = self.shared.lock();
        s.fail("create_view")?;
        s.log.push(Call::CreateView(texture.0));
        Ok(FakeView(texture.0))
    }

    fn share_texture(&mut self, texture: &FakeTexture) -> Result<FakeShare, DeviceError> {
        let mut s = self.shared.lock();
        s.fail("share_texture")?;
        s.log.push(Call::Share(texture.0));
        Ok(FakeShare(texture.0))
    }

    fn register(
        &mut self,
        texture: &FakeTexture,
        _share: &FakeShare,
        buffer: u32,
    ) -> Result<FakeRegistration, DeviceError> {
        let mut s = self.shared.lock();
        s.fail("register")?;
        s.log.push(Call::Register {
            buffer,
            texture: texture.0,
        });
        s.texture_buffer.insert(texture.0, buffer);
        Ok(FakeRegistration { buffer })
    }

    fn lock(&mut self, registration: &FakeRegistration) -> Result<(), DeviceError> {
        let mut s = self.shared.lock();
        s.log.push(Call::Lock(registration.buffer));
        if s.knobs.lock_failures > 0 {
            s.knobs.lock_failures -= 1;
            return Err(DeviceError::new("lock", "injected"));
        }
        s.locked.insert(registration.buffer);
        Ok(())
    }

    fn unlock(&mut self, registration: &FakeRegistration) -> Result<(), DeviceError> {
        let mut s = self.shared.lock();
        s.log.push(Call::Unlock(registration.buffer));
        s.fail("unlock")?;
        s.locked.remove(&registration.buffer);
        Ok(())
    }

    fn unregister(&mut self, registration: FakeRegistration) {
        let mut s = self.shared.lock();
        s.log.push(Call::Unregister(registration.buffer));
        s.locked.remove(&registration.buffer);
    }

    fn release_share(&mut self, share: FakeShare) {
        self.shared.lock().log.push(Call::ReleaseShare(share.0));
    }

    fn destroy_view(&mut self, view: FakeView) {
        self.shared.lock().log.push(Call::DestroyView(view.0));
    }

    fn destroy_texture(&mut self, texture: FakeTexture) {
        let mut s = self.shared.lock();
        s.log.push(Call::DestroyTexture(texture.0));
        s.texture_buffer.remove(&texture.0);
    }

    fn close(&mut self) {
        self.shared.lock().log.push(Call::Close);
    }
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct FakePresenter {
    shared: Handle,
}

impl FakePresenter {
    pub(crate) fn new(shared: &Handle) -> Self {
        Self {
            shared: shared.clone(),
        }
    }

    fn record(&self, call: Call) -> Result<(), PresentError> {
        self.shared.lock().log.push(call);
        Ok(())
    }
}

impl Drop for FakePresenter {
    fn drop(&mut self) {
        self.shared.lock().log.push(Call::PresenterDropped);
    }
}

impl Presenter for FakePresenter {
    type Library = Handle;
    type Texture = FakeTexture;
    type View = FakeView;

    fn open_display(&mut self) -> OpenResults<Handle> {
        let status = {
            let mut s = self.shared.lock();
            s.log.push(Call::OpenDisplay);
            s.knobs.open_status.unwrap_or(OpenStatus::Complete)
        };
        match status {
            OpenStatus::Failure => OpenResults::failure(),
            status => OpenResults {
                status,
                library: Some(self.shared.clone()),
            },
        }
    }

    fn render_frame_initialize(&mut self) -> Result<(), PresentError> {
        self.record(Call::RenderFrameInit)
    }

    fn render_display_initialize(&mut self, display: DisplayId) -> Result<(), PresentError> {
        self.record(Call::RenderDisplayInit(display.0))
    }

    fn present_frame_initialize(&mut self) -> Result<(), PresentError> {
        self.record(Call::PresentFrameInit)
    }

    fn present_display_initialize(&mut self, display: DisplayId) -> Result<(), PresentError> {
        self.record(Call::PresentDisplayInit(display.0))
    }

    fn present_eye(
        &mut self,
        params: &PresentEyeParams<'_, FakeTexture, FakeView>,
    ) -> Result<(), PresentError> {
        let mut s = self.shared.lock();
        let texture = params.surface.texture.0;
        let buffer_locked = s
            .texture_buffer
            .get(&texture)
            .is_some_and(|b| s.locked.contains(b));
        s.log.push(Call::PresentEye {
            eye: params.eye.0,
            texture,
            buffer_locked,
            flip_in_y: params.flip_in_y,
            rotate_180: params.rotate_180,
            roll: params.roll_degrees,
            time_warp: params.time_warp,
            viewport: params.viewport,
        });
        if s.knobs.present_fails {
            return Err(PresentError::Device("injected".into()));
        }
        Ok(())
    }

    fn present_display_finalize(&mut self, display: DisplayId) -> Result<(), PresentError> {
        self.record(Call::PresentDisplayFinalize(display.0))
    }

    fn present_frame_finalize(&mut self) -> Result<(), PresentError> {
        self.record(Call::PresentFrameFinalize)
    }
}

// ---------------------------------------------------------------------------
// Render device
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct FakeRender {
    shared: Handle,
    bound: Option<u32>,
}

impl FakeRender {
    pub(crate) fn new(shared: &Handle) -> Self {
        Self {
            shared: shared.clone(),
            bound: None,
        }
    }
}

impl Drop for FakeRender {
    fn drop(&mut self) {
        self.shared.lock().log.push(Call::RenderDropped);
    }
}

impl RenderDevice for FakeRender {
    type Context = ();
    type ColorBuffer = u32;
    type DepthBuffer = u32;

    fn context(&self) -> Option<&()> {
        if self.shared.lock().knobs.no_render_context {
            None
        } else {
            Some(&())
        }
    }

    fn bind_render_target(&mut self, color: u32, _depth: &u32) -> Result<(), DeviceError> {
        let mut s = self.shared.lock();
        s.fail("bind")?;
        s.log.push(Call::Bind(color));
        self.bound = Some(color);
        Ok(())
    }

    fn framebuffer_complete(&mut self) -> bool {
        self.bound.is_some() && !self.shared.lock().knobs.incomplete
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.shared.lock().log.push(Call::SetViewport(*viewport));
    }

    fn set_projection(&mut self, _projection: &Transform3d) {
        self.shared.lock().log.push(Call::SetProjection);
    }
}
