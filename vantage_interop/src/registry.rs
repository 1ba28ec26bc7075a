// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-surface registry.
//!
//! Every application color buffer the pipeline presents gets one
//! [`SharedSurfaceMapping`]: a presentation texture the buffer aliases, a
//! view of it, the share handle and the interop registration tying the two
//! together. The registry owns all presentation-side objects; application
//! buffers are only referred to by id.
//!
//! A mapping is renderer-owned ([`LockState::Renderer`]) except for the
//! duration of a present, which [`SharedSurfaceRegistry::with_presenter_access`]
//! brackets with unlock/lock.
//!
//! All mappings are released before the interop device is closed, whether by
//! [`teardown`](SharedSurfaceRegistry::teardown) or on drop.

use std::fmt;

use hashbrown::{HashMap, HashSet};
use log::{debug, error, warn};
use vantage_core::backend::LockState;

use crate::device::{Extent, InteropDevice, SurfaceFormat};
use crate::error::{LockError, ProtocolError, RegistryError, ResourceError};

/// Whether the application may re-render a buffer before its present
/// completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OverwritePolicy {
    /// One buffer per eye (or fewer, when eyes share a buffer).
    #[default]
    MayOverwrite,
    /// The application alternates between two buffer sets and promises not
    /// to touch a buffer until its next present; exactly two buffers per eye.
    WillNotOverwrite,
}

/// Presentation-side resources for one application buffer.
pub struct SharedSurfaceMapping<D: InteropDevice> {
    buffer: D::AppBuffer,
    extent: Extent,
    texture: D::Texture,
    view: D::View,
    share: D::ShareHandle,
    registration: D::Registration,
    state: LockState,
}

impl<D: InteropDevice> SharedSurfaceMapping<D> {
    /// Application buffer this mapping serves.
    #[must_use]
    pub fn buffer(&self) -> D::AppBuffer {
        self.buffer
    }

    /// Size of the buffer and texture.
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Presentation texture.
    #[must_use]
    pub fn texture(&self) -> &D::Texture {
        &self.texture
    }

    /// Render-target view of the texture.
    #[must_use]
    pub fn view(&self) -> &D::View {
        &self.view
    }

    /// Current owner.
    #[must_use]
    pub fn state(&self) -> LockState {
        self.state
    }
}

impl<D: InteropDevice> fmt::Debug for SharedSurfaceMapping<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSurfaceMapping")
            .field("buffer", &self.buffer)
            .field("extent", &self.extent)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// What a [`register`](SharedSurfaceRegistry::register) call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RegisterReport {
    /// Mappings built.
    pub created: usize,
    /// Earlier mappings destroyed and rebuilt.
    pub replaced: usize,
    /// Repeated ids within the call that were skipped.
    pub coalesced: usize,
}

/// Owns the interop device and every shared-surface mapping.
pub struct SharedSurfaceRegistry<D: InteropDevice> {
    device: Option<D>,
    mappings: HashMap<D::AppBuffer, SharedSurfaceMapping<D>>,
    num_eyes: usize,
    format: SurfaceFormat,
}

impl<D: InteropDevice> fmt::Debug for SharedSurfaceRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSurfaceRegistry")
            .field("open", &self.device.is_some())
            .field("mappings", &self.mappings.len())
            .field("num_eyes", &self.num_eyes)
            .field("format", &self.format)
            .finish()
    }
}

impl<D: InteropDevice> SharedSurfaceRegistry<D> {
    /// Opens the interop device on the presentation library.
    pub fn open(
        library: &D::Library,
        num_eyes: usize,
        format: SurfaceFormat,
    ) -> Result<Self, RegistryError> {
        let device = D::open(library).map_err(|e| {
            error!("could not open interop device: {e}");
            ResourceError::OpenDevice(e)
        })?;
        Ok(Self::from_device(device, num_eyes, format))
    }

    /// Wraps an already-open device.
    pub fn from_device(device: D, num_eyes: usize, format: SurfaceFormat) -> Self {
        Self {
            device: Some(device),
            mappings: HashMap::new(),
            num_eyes,
            format,
        }
    }

    /// Is the interop device still open?
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Number of live mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Are there no mappings?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Registers application color buffers.
    ///
    /// Buffer-count rules are checked before anything changes. Ids repeated
    /// within `buffers` are handled once. An id mapped by an earlier call is
    /// destroyed and rebuilt (its buffer may have been resized). Ids not in
    /// `buffers` keep their mappings.
    ///
    /// On failure the offending buffer gets no mapping; buffers handled
    /// earlier in the same call stay registered.
    pub fn register(
        &mut self,
        buffers: &[D::AppBuffer],
        policy: OverwritePolicy,
    ) -> Result<RegisterReport, RegistryError> {
        let Some(device) = self.device.as_mut() else {
            return Err(ProtocolError::DeviceClosed.into());
        };

        let max = match policy {
            OverwritePolicy::MayOverwrite => self.num_eyes,
            OverwritePolicy::WillNotOverwrite => 2 * self.num_eyes,
        };
        if policy == OverwritePolicy::WillNotOverwrite && buffers.len() != max {
            error!(
                "no-overwrite registration needs {max} buffers, got {}",
                buffers.len()
            );
            return Err(ProtocolError::BufferCountForPolicy {
                given: buffers.len(),
                required: max,
            }
            .into());
        }
        if buffers.len() > max {
            error!("wrong number of buffers: {}, need {max}", buffers.len());
            return Err(ProtocolError::TooManyBuffers {
                given: buffers.len(),
                max,
            }
            .into());
        }

        let mut report = RegisterReport::default();
        let mut seen = HashSet::with_capacity(buffers.len());
        for &buffer in buffers {
            if !seen.insert(buffer) {
                report.coalesced += 1;
                continue;
            }
            if let Some(old) = self.mappings.remove(&buffer) {
                debug!("re-registering {buffer:?}");
                release(device, old);
                report.replaced += 1;
            }
            let mapping = build(device, buffer, self.format).inspect_err(|e| {
                error!("registering {buffer:?} failed: {e}");
            })?;
            self.mappings.insert(buffer, mapping);
            report.created += 1;
        }
        Ok(report)
    }

    /// Looks up the mapping for `buffer`.
    ///
    /// The table is keyed by buffer id, so [`ProtocolError::MismatchedBuffer`]
    /// is only returned when `AppBuffer`'s `Eq` and `Hash` disagree.
    pub fn resolve(
        &self,
        buffer: D::AppBuffer,
    ) -> Result<&SharedSurfaceMapping<D>, RegistryError> {
        let mapping = self
            .mappings
            .get(&buffer)
            .ok_or_else(|| ProtocolError::UnregisteredBuffer(format!("{buffer:?}")))?;
        if mapping.buffer != buffer {
            return Err(ProtocolError::MismatchedBuffer {
                requested: format!("{buffer:?}"),
                stored: format!("{:?}", mapping.buffer),
            }
            .into());
        }
        Ok(mapping)
    }

    /// Gives `buffer`'s surface back to the render API.
    pub fn lock(&mut self, buffer: D::AppBuffer) -> Result<(), RegistryError> {
        self.transfer(buffer, LockState::Renderer)
    }

    /// Hands `buffer`'s surface to the presentation API.
    pub fn unlock(&mut self, buffer: D::AppBuffer) -> Result<(), RegistryError> {
        self.transfer(buffer, LockState::Presenter)
    }

    fn transfer(&mut self, buffer: D::AppBuffer, to: LockState) -> Result<(), RegistryError> {
        let device = self.device.as_mut().ok_or(ProtocolError::DeviceClosed)?;
        let mapping = self
            .mappings
            .get_mut(&buffer)
            .ok_or_else(|| ProtocolError::UnregisteredBuffer(format!("{buffer:?}")))?;
        if mapping.state == to {
            return Err(ProtocolError::OwnershipViolation {
                buffer: format!("{buffer:?}"),
                owner: mapping.state,
                action: match to {
                    LockState::Renderer => "lock",
                    LockState::Presenter => "unlock",
                },
            }
            .into());
        }
        let result = match to {
            LockState::Renderer => device.lock(&mapping.registration).map_err(|source| {
                LockError::Lock {
                    buffer: format!("{buffer:?}"),
                    source,
                }
            }),
            LockState::Presenter => device.unlock(&mapping.registration).map_err(|source| {
                LockError::Unlock {
                    buffer: format!("{buffer:?}"),
                    source,
                }
            }),
        };
        result?;
        mapping.state = to;
        Ok(())
    }

    /// Runs `f` while the presentation API owns `buffer`'s surface.
    ///
    /// The surface must be renderer-owned on entry. It is unlocked, `f` runs,
    /// and the lock is taken again whatever `f` returned. A failed relock is
    /// retried once; if that fails too the error is returned and the mapping
    /// stays presenter-owned (see [`reclaim_all`](Self::reclaim_all)).
    pub fn with_presenter_access<T>(
        &mut self,
        buffer: D::AppBuffer,
        f: impl FnOnce(&SharedSurfaceMapping<D>) -> T,
    ) -> Result<T, RegistryError> {
        let owner = self.resolve(buffer)?.state;
        if owner != LockState::Renderer {
            return Err(ProtocolError::OwnershipViolation {
                buffer: format!("{buffer:?}"),
                owner,
                action: "present",
            }
            .into());
        }
        self.unlock(buffer)?;
        let out = f(self.resolve(buffer)?);
        if let Err(first) = self.lock(buffer) {
            warn!("relock of {buffer:?} failed ({first}), retrying");
            self.lock(buffer).inspect_err(|e| {
                error!("relock of {buffer:?} failed again: {e}");
            })?;
        }
        Ok(out)
    }

    /// Returns every presenter-owned surface to the render API.
    ///
    /// Best effort: surfaces that refuse the lock are logged and left as they
    /// are. Returns how many were reclaimed.
    pub fn reclaim_all(&mut self) -> usize {
        let Some(device) = self.device.as_mut() else {
            return 0;
        };
        let mut reclaimed = 0;
        for mapping in self.mappings.values_mut() {
            if mapping.state != LockState::Presenter {
                continue;
            }
            match device.lock(&mapping.registration) {
                Ok(()) => {
                    mapping.state = LockState::Renderer;
                    reclaimed += 1;
                }
                Err(e) => error!("could not reclaim {:?}: {e}", mapping.buffer),
            }
        }
        reclaimed
    }

    /// Releases every mapping, then closes the device.
    ///
    /// Safe to call repeatedly and with no mappings.
    pub fn teardown(&mut self) {
        let Some(mut device) = self.device.take() else {
            return;
        };
        for (_, mapping) in self.mappings.drain() {
            release(&mut device, mapping);
        }
        device.close();
        debug!("interop device closed");
    }
}

impl<D: InteropDevice> Drop for SharedSurfaceRegistry<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ---------------------------------------------------------------------------
// Mapping construction and release
// ---------------------------------------------------------------------------

fn build<D: InteropDevice>(
    device: &mut D,
    buffer: D::AppBuffer,
    format: SurfaceFormat,
) -> Result<SharedSurfaceMapping<D>, RegistryError> {
    let name = || format!("{buffer:?}");
    let extent = device
        .buffer_extent(buffer)
        .map_err(|source| ResourceError::QueryExtent {
            buffer: name(),
            source,
        })?;
    if extent.is_empty() {
        return Err(ResourceError::ZeroExtent {
            buffer: name(),
            extent,
        }
        .into());
    }

    let texture = device
        .create_texture(extent, format)
        .map_err(ResourceError::CreateTexture)?;
    let view = match device.create_view(&texture, format) {
        Ok(view) => view,
        Err(e) => {
            device.destroy_texture(texture);
            return Err(ResourceError::CreateView(e).into());
        }
    };
    let share = match device.share_texture(&texture) {
        Ok(share) => share,
        Err(e) => {
            device.destroy_view(view);
            device.destroy_texture(texture);
            return Err(ResourceError::Share(e).into());
        }
    };
    let registration = match device.register(&texture, &share, buffer) {
        Ok(registration) => registration,
        Err(source) => {
            device.release_share(share);
            device.destroy_view(view);
            device.destroy_texture(texture);
            return Err(ResourceError::Register {
                buffer: name(),
                source,
            }
            .into());
        }
    };

    // Registered objects start out owned by the presentation API.
    let mut mapping = SharedSurfaceMapping {
        buffer,
        extent,
        texture,
        view,
        share,
        registration,
        state: LockState::Presenter,
    };
    if let Err(source) = device.lock(&mapping.registration) {
        release(device, mapping);
        return Err(LockError::Lock {
            buffer: name(),
            source,
        }
        .into());
    }
    mapping.state = LockState::Renderer;
    Ok(mapping)
}

fn release<D: InteropDevice>(device: &mut D, mapping: SharedSurfaceMapping<D>) {
    if mapping.state == LockState::Renderer {
        if let Err(e) = device.unlock(&mapping.registration) {
            warn!("unlock before release of {:?} failed: {e}", mapping.buffer);
        }
    }
    device.unregister(mapping.registration);
    device.release_share(mapping.share);
    device.destroy_view(mapping.view);
    device.destroy_texture(mapping.texture);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{self, Call, FakeDevice, Handle};

    type Registry = SharedSurfaceRegistry<FakeDevice>;

    fn open(num_eyes: usize) -> (Registry, Handle) {
        let h = fake::handle();
        let registry = Registry::open(&h, num_eyes, SurfaceFormat::default()).unwrap();
        (registry, h)
    }

    /// Device calls after `open`.
    fn calls_since_open(h: &Handle) -> Vec<Call> {
        fake::device_calls(h).into_iter().skip(1).collect()
    }

    #[test]
    fn open_failure_is_a_resource_error() {
        let h = fake::handle();
        h.lock().knobs.failing.push("open");
        let err = Registry::open(&h, 2, SurfaceFormat::default()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Resource(ResourceError::OpenDevice(_))
        ));
    }

    #[test]
    fn registration_builds_then_locks() {
        let (mut r, h) = open(2);
        let report = r.register(&[7], OverwritePolicy::MayOverwrite).unwrap();
        assert_eq!(
            report,
            RegisterReport {
                created: 1,
                replaced: 0,
                coalesced: 0
            }
        );
        assert_eq!(
            calls_since_open(&h),
            vec![
                Call::QueryExtent(7),
                Call::CreateTexture(1, Extent::new(1024, 1024)),
                Call::CreateView(1),
                Call::Share(1),
                Call::Register {
                    buffer: 7,
                    texture: 1
                },
                Call::Lock(7),
            ]
        );
        let mapping = r.resolve(7).unwrap();
        assert_eq!(mapping.state(), LockState::Renderer);
        assert_eq!(mapping.buffer(), 7);
        assert_eq!(mapping.extent(), Extent::new(1024, 1024));
    }

    #[test]
    fn reregistering_replaces_mappings() {
        let (mut r, h) = open(2);
        r.register(&[1, 2], OverwritePolicy::MayOverwrite).unwrap();
        let report = r.register(&[1, 2], OverwritePolicy::MayOverwrite).unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.replaced, 2);
        assert_eq!(r.len(), 2);

        let destroyed: Vec<_> = fake::device_calls(&h)
            .into_iter()
            .filter_map(|c| match c {
                Call::DestroyTexture(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(destroyed, vec![1, 2]);
        assert_eq!(r.resolve(1).unwrap().texture().0, 3);
        assert_eq!(r.resolve(2).unwrap().state(), LockState::Renderer);
    }

    #[test]
    fn repeated_ids_in_one_call_are_coalesced() {
        let (mut r, _h) = open(2);
        let report = r.register(&[4, 4], OverwritePolicy::MayOverwrite).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.coalesced, 1);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn unlisted_buffers_keep_their_mappings() {
        let (mut r, _h) = open(2);
        r.register(&[1, 2], OverwritePolicy::MayOverwrite).unwrap();
        r.register(&[2], OverwritePolicy::MayOverwrite).unwrap();
        assert_eq!(r.len(), 2);
        assert!(r.resolve(1).is_ok());
    }

    #[test]
    fn too_many_buffers_changes_nothing() {
        let (mut r, h) = open(2);
        r.register(&[1], OverwritePolicy::MayOverwrite).unwrap();
        let before = fake::device_calls(&h).len();
        let err = r
            .register(&[1, 2, 3], OverwritePolicy::MayOverwrite)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Protocol(ProtocolError::TooManyBuffers { given: 3, max: 2 })
        ));
        assert_eq!(fake::device_calls(&h).len(), before);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn no_overwrite_needs_two_buffers_per_eye() {
        let (mut r, _h) = open(2);
        let err = r
            .register(&[1, 2], OverwritePolicy::WillNotOverwrite)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Protocol(ProtocolError::BufferCountForPolicy {
                given: 2,
                required: 4
            })
        ));
        assert!(r.is_empty());

        let report = r
            .register(&[1, 2, 3, 4], OverwritePolicy::WillNotOverwrite)
            .unwrap();
        assert_eq!(report.created, 4);
    }

    #[test]
    fn zero_sized_buffer_is_rejected() {
        let (mut r, h) = open(2);
        h.lock().knobs.zero_extent.push(2);
        let err = r
            .register(&[1, 2], OverwritePolicy::MayOverwrite)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Resource(ResourceError::ZeroExtent { .. })
        ));
        // The first buffer was handled before the failure.
        assert!(r.resolve(1).is_ok());
        assert!(matches!(
            r.resolve(2),
            Err(RegistryError::Protocol(ProtocolError::UnregisteredBuffer(_)))
        ));
        assert_eq!(
            fake::device_calls(&h)
                .iter()
                .filter(|c| matches!(c, Call::CreateTexture(..)))
                .count(),
            1
        );
    }

    #[test]
    fn view_failure_destroys_the_texture() {
        let (mut r, h) = open(1);
        h.lock().knobs.failing.push("create_view");
        let err = r.register(&[1], OverwritePolicy::MayOverwrite).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Resource(ResourceError::CreateView(_))
        ));
        assert_eq!(
            calls_since_open(&h),
            vec![
                Call::QueryExtent(1),
                Call::CreateTexture(1, Extent::new(1024, 1024)),
                Call::DestroyTexture(1),
            ]
        );
        assert!(r.is_empty());
    }

    #[test]
    fn register_failure_unwinds_in_reverse() {
        let (mut r, h) = open(1);
        h.lock().knobs.failing.push("register");
        let err = r.register(&[1], OverwritePolicy::MayOverwrite).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Resource(ResourceError::Register { .. })
        ));
        let tail: Vec<_> = calls_since_open(&h).into_iter().skip(4).collect();
        assert_eq!(
            tail,
            vec![
                Call::ReleaseShare(1),
                Call::DestroyView(1),
                Call::DestroyTexture(1)
            ]
        );
    }

    #[test]
    fn initial_lock_failure_releases_without_unlocking() {
        let (mut r, h) = open(1);
        h.lock().knobs.lock_failures = 1;
        let err = r.register(&[1], OverwritePolicy::MayOverwrite).unwrap_err();
        assert!(matches!(err, RegistryError::Lock(LockError::Lock { .. })));
        let tail: Vec<_> = calls_since_open(&h).into_iter().skip(5).collect();
        assert_eq!(
            tail,
            vec![
                Call::Lock(1),
                Call::Unregister(1),
                Call::ReleaseShare(1),
                Call::DestroyView(1),
                Call::DestroyTexture(1),
            ]
        );
        assert!(r.is_empty());
    }

    #[test]
    fn transfers_must_alternate() {
        let (mut r, _h) = open(1);
        r.register(&[1], OverwritePolicy::MayOverwrite).unwrap();
        assert!(matches!(
            r.lock(1),
            Err(RegistryError::Protocol(ProtocolError::OwnershipViolation {
                owner: LockState::Renderer,
                ..
            }))
        ));
        for _ in 0..3 {
            r.unlock(1).unwrap();
            assert_eq!(r.resolve(1).unwrap().state(), LockState::Presenter);
            r.lock(1).unwrap();
            assert_eq!(r.resolve(1).unwrap().state(), LockState::Renderer);
        }
        r.unlock(1).unwrap();
        assert!(matches!(
            r.unlock(1),
            Err(RegistryError::Protocol(ProtocolError::OwnershipViolation {
                owner: LockState::Presenter,
                ..
            }))
        ));
    }

    #[test]
    fn failed_unlock_keeps_renderer_ownership() {
        let (mut r, h) = open(1);
        r.register(&[1], OverwritePolicy::MayOverwrite).unwrap();
        h.lock().knobs.failing.push("unlock");
        assert!(matches!(
            r.unlock(1),
            Err(RegistryError::Lock(LockError::Unlock { .. }))
        ));
        assert_eq!(r.resolve(1).unwrap().state(), LockState::Renderer);
    }

    #[test]
    fn presenter_access_brackets_the_closure() {
        let (mut r, h) = open(1);
        r.register(&[1], OverwritePolicy::MayOverwrite).unwrap();
        let seen = r
            .with_presenter_access(1, |m| {
                h.lock().log.push(Call::PresentFrameInit);
                m.state()
            })
            .unwrap();
        assert_eq!(seen, LockState::Presenter);
        let tail: Vec<_> = fake::calls(&h).into_iter().rev().take(3).collect();
        assert_eq!(
            tail,
            vec![Call::Lock(1), Call::PresentFrameInit, Call::Unlock(1)]
        );
    }

    #[test]
    fn presenter_access_needs_renderer_ownership() {
        let (mut r, _h) = open(1);
        r.register(&[1], OverwritePolicy::MayOverwrite).unwrap();
        r.unlock(1).unwrap();
        let err = r.with_presenter_access(1, |_| ()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Protocol(ProtocolError::OwnershipViolation {
                action: "present",
                ..
            })
        ));
    }

    #[test]
    fn relock_is_retried_once() {
        let (mut r, h) = open(1);
        r.register(&[1], OverwritePolicy::MayOverwrite).unwrap();
        h.lock().knobs.lock_failures = 1;
        r.with_presenter_access(1, |_| ()).unwrap();
        assert_eq!(r.resolve(1).unwrap().state(), LockState::Renderer);

        h.lock().knobs.lock_failures = 2;
        let err = r.with_presenter_access(1, |_| ()).unwrap_err();
        assert!(matches!(err, RegistryError::Lock(LockError::Lock { .. })));
        assert_eq!(r.resolve(1).unwrap().state(), LockState::Presenter);
        assert_eq!(r.reclaim_all(), 1);
        assert_eq!(r.resolve(1).unwrap().state(), LockState::Renderer);
        assert_eq!(r.reclaim_all(), 0);
    }

    #[test]
    fn teardown_releases_everything_then_closes() {
        let (mut r, h) = open(2);
        r.register(&[1, 2], OverwritePolicy::MayOverwrite).unwrap();
        r.unlock(2).unwrap();
        let before = fake::device_calls(&h).len();
        r.teardown();

        let tail: Vec<_> = fake::device_calls(&h).into_iter().skip(before).collect();
        assert_eq!(tail.last(), Some(&Call::Close));
        // Only the renderer-owned mapping needs unlocking.
        assert_eq!(
            tail.iter().filter(|c| matches!(c, Call::Unlock(_))).count(),
            1
        );
        assert!(tail.contains(&Call::Unlock(1)));
        for buffer in [1, 2] {
            let at = tail
                .iter()
                .position(|c| *c == Call::Unregister(buffer))
                .unwrap();
            assert!(matches!(tail[at + 1], Call::ReleaseShare(_)));
            assert!(matches!(tail[at + 2], Call::DestroyView(_)));
            assert!(matches!(tail[at + 3], Call::DestroyTexture(_)));
        }
        assert!(!r.is_open());
        assert!(r.is_empty());

        r.teardown();
        drop(r);
        assert_eq!(
            fake::device_calls(&h)
                .iter()
                .filter(|c| **c == Call::Close)
                .count(),
            1
        );
    }

    #[test]
    fn closed_registry_rejects_work() {
        let (mut r, _h) = open(1);
        r.teardown();
        assert!(matches!(
            r.register(&[1], OverwritePolicy::MayOverwrite),
            Err(RegistryError::Protocol(ProtocolError::DeviceClosed))
        ));
        assert_eq!(r.reclaim_all(), 0);
    }
}
