// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-API shared surfaces and the frame presentation pipeline.
//!
//! An application renders with one graphics API (its *render API*, e.g.
//! OpenGL) while the display is driven through another (the *presentation
//! API*, e.g. Direct3D 11). This crate bridges the two:
//!
//! - [`registry`]: one presentation texture per application color buffer,
//!   bound through the driver's interop extension, with explicit ownership
//!   transfers between the two APIs.
//! - [`pipeline`]: the per-frame state machine that sets up each eye, calls
//!   the application back to draw, and hands each eye to a
//!   [`Presenter`](vantage_core::backend::Presenter) with parameters
//!   converted to the presentation API's conventions.
//! - [`state`]: frame states and their legal order.
//! - [`device`] and [`render`]: the native capabilities the registry and the
//!   pipeline need from each API.
//!
//! ```text
//!   render API buffer ──register──► SharedSurfaceMapping (texture, view)
//!          ▲                                  │
//!          └──── lock ◄── present_eye ◄── unlock
//! ```
//!
//! All errors are typed (see [`error`]) and logged through the `log` facade
//! at the point of failure.

pub mod clock;
pub mod device;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod state;

#[cfg(test)]
mod fake;

pub use clock::MonotonicClock;
pub use device::{DeviceError, Extent, InteropDevice, SurfaceFormat};
pub use error::{
    GraphicsApi, LockError, PipelineError, ProtocolError, RegistryError, ResourceError,
};
pub use pipeline::{
    EyeCallback, EyeContext, EyeFrame, FrameInput, FramePipeline, FrameReport, PipelineOptions,
};
pub use registry::{OverwritePolicy, RegisterReport, SharedSurfaceMapping, SharedSurfaceRegistry};
pub use render::RenderDevice;
pub use state::{FrameLayout, FrameSequencer, FrameState};
