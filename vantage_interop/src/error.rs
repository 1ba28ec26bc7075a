// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the registry and the frame pipeline.
//!
//! Failures fall into three families:
//!
//! - [`ResourceError`]: a native object could not be created or used.
//! - [`ProtocolError`]: the caller broke a usage rule (unregistered buffer,
//!   frame before open, wrong buffer count, ...).
//! - [`LockError`]: the interop extension refused an ownership transfer.
//!
//! [`RegistryError`] and [`PipelineError`] gather them for their modules.

use vantage_core::backend::{LockState, PresentError};
use vantage_core::output::EyeId;

use crate::device::{DeviceError, Extent};
use crate::state::FrameState;

/// Which of the two graphics APIs a handle belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphicsApi {
    /// The application's render API.
    Render,
    /// The display's presentation API.
    Present,
}

/// A native object could not be created or used.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The interop device could not be opened on the presentation library.
    #[error("could not open interop device: {0}")]
    OpenDevice(#[source] DeviceError),
    /// The size of an application buffer could not be queried.
    #[error("could not query size of buffer {buffer}: {source}")]
    QueryExtent {
        /// Application buffer, formatted.
        buffer: String,
        /// Device failure.
        #[source]
        source: DeviceError,
    },
    /// An application buffer has zero width or height.
    #[error("zero-sized buffer {buffer} ({extent})")]
    ZeroExtent {
        /// Application buffer, formatted.
        buffer: String,
        /// Reported size.
        extent: Extent,
    },
    /// The presentation texture could not be created.
    #[error("can't create texture: {0}")]
    CreateTexture(#[source] DeviceError),
    /// The render-target view could not be created.
    #[error("could not create render target view: {0}")]
    CreateView(#[source] DeviceError),
    /// The texture could not be shared across devices.
    #[error("could not share texture: {0}")]
    Share(#[source] DeviceError),
    /// The application buffer could not be bound to the texture.
    #[error("can't register buffer {buffer} with interop: {source}")]
    Register {
        /// Application buffer, formatted.
        buffer: String,
        /// Device failure.
        #[source]
        source: DeviceError,
    },
    /// The eye's buffers could not be bound as render target.
    #[error("could not bind render target for {eye:?}: {source}")]
    Bind {
        /// Eye being set up.
        eye: EyeId,
        /// Device failure.
        #[source]
        source: DeviceError,
    },
    /// The render target is not framebuffer-complete.
    #[error("incomplete framebuffer for {0:?}")]
    IncompleteFramebuffer(EyeId),
}

/// The caller broke a usage rule.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// More buffers than eyes (or twice the eyes, without overwrite).
    #[error("wrong number of buffers: {given}, at most {max}")]
    TooManyBuffers {
        /// Buffers supplied.
        given: usize,
        /// Upper bound.
        max: usize,
    },
    /// The no-overwrite policy needs exactly two buffers per eye.
    #[error("no-overwrite registration needs {required} buffers, got {given}")]
    BufferCountForPolicy {
        /// Buffers supplied.
        given: usize,
        /// Buffers required.
        required: usize,
    },
    /// The buffer was never registered.
    #[error("unregistered buffer {0} (register buffers before presenting)")]
    UnregisteredBuffer(String),
    /// The mapping found for a buffer belongs to a different buffer.
    #[error("mismatched buffer {requested}, mapping holds {stored} (re-register the buffer)")]
    MismatchedBuffer {
        /// Buffer asked for.
        requested: String,
        /// Buffer the mapping records.
        stored: String,
    },
    /// A surface was asked to move to the owner that already holds it, or
    /// used by the wrong side.
    #[error("buffer {buffer} is owned by {owner:?}; cannot {action}")]
    OwnershipViolation {
        /// Application buffer, formatted.
        buffer: String,
        /// Current owner.
        owner: LockState,
        /// What was attempted.
        action: &'static str,
    },
    /// A frame or registration was attempted before the display was opened.
    #[error("display not opened")]
    DisplayNotOpen,
    /// The registry has been torn down.
    #[error("interop device already closed")]
    DeviceClosed,
    /// A pipeline state was entered out of order.
    #[error("out-of-order frame state: expected {expected:?}, got {got:?}")]
    OutOfOrder {
        /// The only legal successor, `None` when the frame is complete.
        expected: Option<FrameState>,
        /// The state requested.
        got: FrameState,
    },
    /// A native library handle is missing.
    #[error("{0:?} graphics library handle is missing")]
    MissingLibrary(GraphicsApi),
    /// A frame supplied the wrong number of eyes.
    #[error("frame has {given} eyes, display has {expected}")]
    EyeCountMismatch {
        /// Eyes supplied.
        given: usize,
        /// Eyes in the display configuration.
        expected: usize,
    },
}

/// The interop extension refused an ownership transfer.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Taking the surface for the render API failed.
    #[error("can't lock buffer {buffer}: {source}")]
    Lock {
        /// Application buffer, formatted.
        buffer: String,
        /// Device failure.
        #[source]
        source: DeviceError,
    },
    /// Releasing the surface to the presentation API failed.
    #[error("can't unlock buffer {buffer}: {source}")]
    Unlock {
        /// Application buffer, formatted.
        buffer: String,
        /// Device failure.
        #[source]
        source: DeviceError,
    },
}

/// Errors from [`SharedSurfaceRegistry`](crate::registry::SharedSurfaceRegistry).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Native resource failure.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// Usage rule broken.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Ownership transfer refused.
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Errors from [`FramePipeline`](crate::pipeline::FramePipeline).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Native resource failure.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// Usage rule broken.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Ownership transfer refused.
    #[error(transparent)]
    Lock(#[from] LockError),
    /// The presenter could not open the display.
    #[error("presenter failed to open the display")]
    OpenFailed,
    /// The presenter failed during a frame state.
    #[error("presenter failed in {state:?}: {source}")]
    Present {
        /// State being executed.
        state: FrameState,
        /// Presenter failure.
        #[source]
        source: PresentError,
    },
}

impl From<RegistryError> for PipelineError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Resource(e) => Self::Resource(e),
            RegistryError::Protocol(e) => Self::Protocol(e),
            RegistryError::Lock(e) => Self::Lock(e),
        }
    }
}
