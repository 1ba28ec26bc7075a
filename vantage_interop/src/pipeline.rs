// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame presentation pipeline.
//!
//! [`FramePipeline`] walks the frame states in [`FrameSequencer`] order:
//!
//! ```text
//! FrameInit
//!   └─ per display: DisplayInit
//!        ├─ per eye: EyeInit ─► EyeRender
//!        ├─ DisplayPresentInit
//!        ├─ per eye: EyePresent  (unlock ─► present_eye ─► relock)
//!        └─ DisplayPresentFinalize
//! FramePresentFinalize
//! ```
//!
//! Any failure ends the frame: every presenter-owned surface is reclaimed for
//! the render API, the summary is marked aborted, and the error is returned.
//! The pipeline stays usable for the next frame.
//!
//! The pipeline is `Sync` when its devices are `Send`; one frame runs at a
//! time behind an internal mutex.

use std::fmt;

use log::{debug, error, warn};
use parking_lot::Mutex;
use vantage_core::backend::{LockState, OpenStatus, PresentEyeParams, Presenter, SurfaceRef};
use vantage_core::config::DisplayConfiguration;
use vantage_core::output::{DisplayId, EyeId};
use vantage_core::pose::Pose;
use vantage_core::time::{Clock, HostTime};
use vantage_core::trace::{
    FrameBeginEvent, FrameSummary, FrameSummaryBuilder, OwnershipEvent, PhaseBeginEvent,
    PhaseEndEvent, Tracer,
};
use vantage_core::transform::Transform3d;
use vantage_core::viewport::{Viewport, eye_projection};

use crate::clock::MonotonicClock;
use crate::device::{InteropDevice, SurfaceFormat};
use crate::error::{GraphicsApi, PipelineError, ProtocolError, ResourceError};
use crate::registry::{OverwritePolicy, RegisterReport, SharedSurfaceRegistry};
use crate::render::RenderDevice;
use crate::state::{FrameLayout, FrameSequencer, FrameState};

/// Tunables fixed for the lifetime of a pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineOptions {
    /// Near clipping plane distance for eye projections.
    pub near_clip: f64,
    /// Far clipping plane distance for eye projections.
    pub far_clip: f64,
    /// Whether the application renders with Y pointing down. The presenter
    /// receives the opposite, since the two APIs disagree on texture origin.
    pub flip_in_y: bool,
    /// Buffer-count rule for [`FramePipeline::register_buffers`].
    pub overwrite: OverwritePolicy,
    /// Format of presentation textures.
    pub format: SurfaceFormat,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            near_clip: 0.1,
            far_clip: 100.0,
            flip_in_y: false,
            overwrite: OverwritePolicy::MayOverwrite,
            format: SurfaceFormat::Rgba8Unorm,
        }
    }
}

/// Application buffers and pose data for one eye of a frame.
#[derive(Clone, Copy, Debug)]
pub struct EyeFrame<B, Z> {
    /// Registered color buffer.
    pub color: B,
    /// Depth buffer to pair with it.
    pub depth: Z,
    /// Pose the eye is rendered from.
    pub pose: Pose,
    /// Asynchronous time-warp matrix in the render API's convention.
    pub time_warp: Option<Transform3d>,
}

/// Everything [`FramePipeline::render_frame`] needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a, B, Z> {
    /// One entry per eye, in eye order.
    pub eyes: &'a [EyeFrame<B, Z>],
    /// Time by which the frame should be on screen.
    pub deadline: HostTime,
}

/// Passed to application callbacks while an eye is being rendered.
#[derive(Debug)]
pub struct EyeContext<'a, C, B> {
    /// Render API context.
    pub context: &'a C,
    /// Eye being rendered.
    pub eye: EyeId,
    /// Display the eye belongs to.
    pub display: DisplayId,
    /// Color buffer bound as render target.
    pub buffer: B,
    /// Viewport already applied to the render target.
    pub viewport: Viewport,
    /// Projection already loaded.
    pub projection: Transform3d,
    /// Eye pose.
    pub pose: Pose,
    /// Frame deadline.
    pub deadline: HostTime,
}

/// Application callback run for each eye.
pub type EyeCallback<C, B> = Box<dyn FnMut(&EyeContext<'_, C, B>) + Send>;

/// Outcome of a completed frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameReport {
    /// Sequence number of the frame.
    pub frame_index: u64,
    /// Eyes handed to the presenter.
    pub eyes_presented: u32,
    /// Timing summary, also delivered to the trace sink.
    pub summary: FrameSummary,
}

// Fields drop in declaration order: mappings are released while the
// library and both devices are still alive.
struct Inner<P: Presenter, R: RenderDevice, D: InteropDevice> {
    registry: Option<SharedSurfaceRegistry<D>>,
    library: Option<P::Library>,
    presenter: P,
    render: R,
    open_status: Option<OpenStatus>,
    display_setup: Option<EyeCallback<R::Context, R::ColorBuffer>>,
    render_eye: Option<EyeCallback<R::Context, R::ColorBuffer>>,
    frame_index: u64,
}

/// Drives one application render API and one display presenter through
/// shared surfaces.
///
/// `D` is the presenter's interop device: it must agree with the presenter on
/// the library, texture and view types, and with the render device on the
/// buffer id type.
pub struct FramePipeline<P: Presenter, R: RenderDevice, D: InteropDevice> {
    config: DisplayConfiguration,
    layout: FrameLayout,
    options: PipelineOptions,
    clock: Box<dyn Clock + Send + Sync>,
    inner: Mutex<Inner<P, R, D>>,
}

impl<P: Presenter, R: RenderDevice, D: InteropDevice> fmt::Debug for FramePipeline<P, R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePipeline")
            .field("displays", &self.layout.num_displays())
            .field("eyes", &self.config.num_eyes())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<P, R, D> FramePipeline<P, R, D>
where
    P: Presenter,
    R: RenderDevice,
    D: InteropDevice<
            Library = P::Library,
            AppBuffer = R::ColorBuffer,
            Texture = P::Texture,
            View = P::View,
        >,
{
    /// Creates a pipeline. Nothing native is touched until
    /// [`open_display`](Self::open_display).
    pub fn new(
        config: DisplayConfiguration,
        presenter: P,
        render: R,
        options: PipelineOptions,
    ) -> Self {
        let layout = FrameLayout::from_config(&config);
        Self {
            config,
            layout,
            options,
            clock: Box::new(MonotonicClock::new()),
            inner: Mutex::new(Inner {
                presenter,
                render,
                registry: None,
                library: None,
                open_status: None,
                display_setup: None,
                render_eye: None,
                frame_index: 0,
            }),
        }
    }

    /// Replaces the clock used for trace timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Display configuration.
    #[must_use]
    pub fn config(&self) -> &DisplayConfiguration {
        &self.config
    }

    /// Options the pipeline was built with.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Eye grouping per display.
    #[must_use]
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Sets the callback run once per eye after its render target is bound.
    pub fn set_display_setup(
        &self,
        f: impl FnMut(&EyeContext<'_, R::Context, R::ColorBuffer>) + Send + 'static,
    ) {
        self.inner.lock().display_setup = Some(Box::new(f));
    }

    /// Sets the callback that draws an eye.
    pub fn set_render_callback(
        &self,
        f: impl FnMut(&EyeContext<'_, R::Context, R::ColorBuffer>) + Send + 'static,
    ) {
        self.inner.lock().render_eye = Some(Box::new(f));
    }

    /// Has the display been opened?
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.lock().registry.is_some()
    }

    /// Opens the display and the interop device on its library.
    ///
    /// Calling this again on an open pipeline returns the earlier status.
    ///
    /// If the interop device fails to open after the presenter has opened the
    /// display, the error is returned and the pipeline stays closed. The
    /// presenter has no close call, so its display stays open until the
    /// pipeline is dropped; [`close`](Self::close) does not reach it.
    pub fn open_display(&self) -> Result<OpenStatus, PipelineError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if let Some(status) = inner.open_status {
            debug!("display already open");
            return Ok(status);
        }

        let results = inner.presenter.open_display();
        let status = results.status;
        if status == OpenStatus::Failure {
            error!("presenter could not open the display");
            return Err(PipelineError::OpenFailed);
        }
        let Some(library) = results.library else {
            error!("presenter opened the display but returned no library");
            return Err(ProtocolError::MissingLibrary(GraphicsApi::Present).into());
        };
        if inner.render.context().is_none() {
            error!("no render context to share surfaces with");
            return Err(ProtocolError::MissingLibrary(GraphicsApi::Render).into());
        }

        let registry =
            SharedSurfaceRegistry::open(&library, self.config.num_eyes(), self.options.format)?;
        if status == OpenStatus::Partial {
            warn!("display only partially opened");
        }
        inner.registry = Some(registry);
        inner.library = Some(library);
        inner.open_status = Some(status);
        debug!("display open: {}", self.config);
        Ok(status)
    }

    /// Registers the application's color buffers under the configured
    /// [`OverwritePolicy`].
    pub fn register_buffers(
        &self,
        buffers: &[R::ColorBuffer],
    ) -> Result<RegisterReport, PipelineError> {
        let mut inner = self.inner.lock();
        let registry = inner.registry.as_mut().ok_or_else(|| {
            error!("buffers registered before the display was opened");
            ProtocolError::DisplayNotOpen
        })?;
        Ok(registry.register(buffers, self.options.overwrite)?)
    }

    /// Runs one frame without tracing.
    pub fn render_frame(
        &self,
        input: &FrameInput<'_, R::ColorBuffer, R::DepthBuffer>,
    ) -> Result<FrameReport, PipelineError> {
        self.render_frame_traced(input, &mut Tracer::none())
    }

    /// Runs one frame, reporting phases and ownership changes to `tracer`.
    ///
    /// A frame summary is emitted even when the frame fails.
    pub fn render_frame_traced(
        &self,
        input: &FrameInput<'_, R::ColorBuffer, R::DepthBuffer>,
        tracer: &mut Tracer<'_>,
    ) -> Result<FrameReport, PipelineError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.registry.is_none() {
            error!("frame rendered before the display was opened");
            return Err(ProtocolError::DisplayNotOpen.into());
        }
        let expected = self.config.num_eyes();
        if input.eyes.len() != expected {
            error!("frame has {} eyes, need {expected}", input.eyes.len());
            return Err(ProtocolError::EyeCountMismatch {
                given: input.eyes.len(),
                expected,
            }
            .into());
        }

        let frame_index = inner.frame_index;
        inner.frame_index += 1;
        let begin = FrameBeginEvent {
            frame_index,
            timestamp: self.clock.now(),
            deadline: input.deadline,
            eyes: u32::try_from(expected).unwrap_or(u32::MAX),
        };
        tracer.frame_begin(&begin);
        let mut summary = FrameSummaryBuilder::new(&begin);

        let result = self.run_states(inner, input, frame_index, tracer, &mut summary);
        if let Err(e) = &result {
            error!("frame {frame_index} abandoned: {e}");
            summary.set_aborted();
            if let Some(registry) = inner.registry.as_mut() {
                let reclaimed = registry.reclaim_all();
                if reclaimed > 0 {
                    warn!("reclaimed {reclaimed} surfaces from the presenter");
                }
            }
        }

        let summary = summary.finish(self.clock.now());
        tracer.frame_summary(&summary);
        result?;
        Ok(FrameReport {
            frame_index,
            eyes_presented: summary.eyes_presented,
            summary,
        })
    }

    /// Releases every shared surface and closes the interop device.
    ///
    /// The pipeline can be opened again afterwards.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if let Some(mut registry) = inner.registry.take() {
            registry.teardown();
        }
        inner.library = None;
        inner.open_status = None;
    }

    /// Runs `f` with the registry, if the display is open.
    pub fn with_registry<T>(&self, f: impl FnOnce(Option<&SharedSurfaceRegistry<D>>) -> T) -> T {
        f(self.inner.lock().registry.as_ref())
    }

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    fn run_states(
        &self,
        inner: &mut Inner<P, R, D>,
        input: &FrameInput<'_, R::ColorBuffer, R::DepthBuffer>,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
    ) -> Result<(), PipelineError> {
        let mut sequencer = FrameSequencer::new(&self.layout);
        while let Some(state) = sequencer.peek() {
            sequencer.advance(state)?;
            let Some((phase, target)) = state.phase() else {
                continue;
            };

            let start = self.clock.now();
            tracer.phase_begin(&PhaseBeginEvent {
                frame_index,
                phase,
                target,
                timestamp: start,
            });
            summary.phase_begin(phase, start);

            let result = self.execute(inner, state, input, frame_index, tracer);
            if result.is_ok() && matches!(state, FrameState::EyePresent(_)) {
                summary.eye_presented();
            }

            let end = self.clock.now();
            summary.phase_end(phase, end);
            tracer.phase_end(&PhaseEndEvent {
                frame_index,
                phase,
                target,
                timestamp: end,
                ok: result.is_ok(),
            });
            result?;
        }
        Ok(())
    }

    fn execute(
        &self,
        inner: &mut Inner<P, R, D>,
        state: FrameState,
        input: &FrameInput<'_, R::ColorBuffer, R::DepthBuffer>,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), PipelineError> {
        check_libraries(inner)?;
        let present = |source| PipelineError::Present { state, source };
        match state {
            FrameState::Idle => Ok(()),
            FrameState::FrameInit => inner.presenter.render_frame_initialize().map_err(present),
            FrameState::DisplayInit(display) => inner
                .presenter
                .render_display_initialize(display)
                .map_err(present),
            FrameState::EyeInit(eye) => self.eye_init(inner, eye, input),
            FrameState::EyeRender(eye) => self.eye_render(inner, eye, input),
            FrameState::DisplayPresentInit(display) => {
                if display == DisplayId(0) {
                    inner.presenter.present_frame_initialize().map_err(present)?;
                }
                inner
                    .presenter
                    .present_display_initialize(display)
                    .map_err(present)
            }
            FrameState::EyePresent(eye) => self.eye_present(inner, eye, input, frame_index, tracer),
            FrameState::DisplayPresentFinalize(display) => inner
                .presenter
                .present_display_finalize(display)
                .map_err(present),
            FrameState::FramePresentFinalize => {
                inner.presenter.present_frame_finalize().map_err(present)
            }
        }
    }

    fn eye_init(
        &self,
        inner: &mut Inner<P, R, D>,
        eye: EyeId,
        input: &FrameInput<'_, R::ColorBuffer, R::DepthBuffer>,
    ) -> Result<(), PipelineError> {
        let frame = eye_frame(input, eye)?;
        let registry = inner
            .registry
            .as_ref()
            .ok_or(ProtocolError::DisplayNotOpen)?;
        let owner = registry.resolve(frame.color)?.state();
        if owner != LockState::Renderer {
            return Err(ProtocolError::OwnershipViolation {
                buffer: format!("{:?}", frame.color),
                owner,
                action: "render",
            }
            .into());
        }

        inner
            .render
            .bind_render_target(frame.color, &frame.depth)
            .map_err(|source| ResourceError::Bind { eye, source })?;
        if !inner.render.framebuffer_complete() {
            error!("render target for {eye:?} is incomplete");
            return Err(ResourceError::IncompleteFramebuffer(eye).into());
        }

        inner
            .render
            .set_viewport(&Viewport::for_render(&self.config, eye));
        inner.render.set_projection(&self.projection(eye));

        let ctx = self.eye_context(&inner.render, eye, frame, input.deadline)?;
        if let Some(setup) = inner.display_setup.as_mut() {
            setup(&ctx);
        }
        Ok(())
    }

    fn eye_render(
        &self,
        inner: &mut Inner<P, R, D>,
        eye: EyeId,
        input: &FrameInput<'_, R::ColorBuffer, R::DepthBuffer>,
    ) -> Result<(), PipelineError> {
        let frame = eye_frame(input, eye)?;
        let ctx = self.eye_context(&inner.render, eye, frame, input.deadline)?;
        if let Some(render) = inner.render_eye.as_mut() {
            render(&ctx);
        }
        Ok(())
    }

    fn projection(&self, eye: EyeId) -> Transform3d {
        eye_projection(
            &self.config,
            eye,
            self.options.near_clip,
            self.options.far_clip,
        )
    }

    fn eye_context<'r>(
        &self,
        render: &'r R,
        eye: EyeId,
        frame: &EyeFrame<R::ColorBuffer, R::DepthBuffer>,
        deadline: HostTime,
    ) -> Result<EyeContext<'r, R::Context, R::ColorBuffer>, ProtocolError> {
        let context = render
            .context()
            .ok_or(ProtocolError::MissingLibrary(GraphicsApi::Render))?;
        Ok(EyeContext {
            context,
            eye,
            display: self.layout.display_of(eye).unwrap_or_default(),
            buffer: frame.color,
            viewport: Viewport::for_render(&self.config, eye),
            projection: self.projection(eye),
            pose: frame.pose,
            deadline,
        })
    }

    fn eye_present(
        &self,
        inner: &mut Inner<P, R, D>,
        eye: EyeId,
        input: &FrameInput<'_, R::ColorBuffer, R::DepthBuffer>,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), PipelineError> {
        let frame = eye_frame(input, eye)?;
        let Inner {
            presenter,
            registry,
            ..
        } = inner;
        let registry = registry.as_mut().ok_or(ProtocolError::DisplayNotOpen)?;

        let display = self.layout.display_of(eye).unwrap_or_default();
        let rotate_180 = self.config.eye(eye).is_some_and(|info| info.rotate_180);
        let viewport = Viewport::for_present(&self.config, eye);
        // The presentation API's texture origin and handedness are the
        // opposite of the render API's.
        let flip_in_y = !self.options.flip_in_y;
        let roll_degrees = -self.config.roll_for(eye);
        let time_warp = frame.time_warp.map(Transform3d::transpose);
        let clock = &self.clock;

        let presented = registry.with_presenter_access(frame.color, |mapping| {
            tracer.ownership(&OwnershipEvent {
                frame_index,
                eye,
                owner: LockState::Presenter,
                timestamp: clock.now(),
            });
            presenter.present_eye(&PresentEyeParams {
                eye,
                display,
                surface: SurfaceRef {
                    texture: mapping.texture(),
                    view: mapping.view(),
                },
                viewport,
                flip_in_y,
                rotate_180,
                roll_degrees,
                time_warp,
            })
        })?;
        tracer.ownership(&OwnershipEvent {
            frame_index,
            eye,
            owner: LockState::Renderer,
            timestamp: self.clock.now(),
        });
        presented.map_err(|source| PipelineError::Present {
            state: FrameState::EyePresent(eye),
            source,
        })
    }
}

impl<P: Presenter, R: RenderDevice, D: InteropDevice> Drop for FramePipeline<P, R, D> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Some(mut registry) = inner.registry.take() {
            registry.teardown();
        }
        inner.library = None;
    }
}

fn check_libraries<P: Presenter, R: RenderDevice, D: InteropDevice>(
    inner: &Inner<P, R, D>,
) -> Result<(), ProtocolError> {
    if inner.render.context().is_none() {
        error!("render library context is gone");
        return Err(ProtocolError::MissingLibrary(GraphicsApi::Render));
    }
    if inner.library.is_none() {
        error!("presentation library is gone");
        return Err(ProtocolError::MissingLibrary(GraphicsApi::Present));
    }
    Ok(())
}

fn eye_frame<'a, B, Z>(
    input: &'a FrameInput<'_, B, Z>,
    eye: EyeId,
) -> Result<&'a EyeFrame<B, Z>, ProtocolError> {
    input
        .eyes
        .get(eye.index())
        .ok_or(ProtocolError::EyeCountMismatch {
            given: input.eyes.len(),
            expected: eye.index() + 1,
        })
}
