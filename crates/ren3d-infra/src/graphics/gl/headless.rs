// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Window-less context provider backed by [`RecordingGl`].

use super::api::GlSurface;
use super::factory::{GlContextProvider, NativeContext};
use super::recording::{GlCall, GlProfile, RecordingGl};
use ren3d_core::math::Extent2D;
use ren3d_core::renderer::api::core::{DeviceCreateParams, DeviceKind};
use ren3d_core::renderer::error::DeviceError;
use std::collections::HashMap;
use std::rc::Rc;

/// A fixed-size drawable whose swaps are recorded into the driver's call log.
#[derive(Debug)]
pub struct HeadlessSurface {
    gl: Rc<RecordingGl>,
    size: Extent2D,
}

impl HeadlessSurface {
    pub fn new(gl: Rc<RecordingGl>, size: Extent2D) -> Self {
        Self { gl, size }
    }
}

impl GlSurface for HeadlessSurface {
    fn drawable_size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    fn supports_swap_control(&self) -> bool {
        self.gl.profile().swap_control
    }

    fn set_swap_interval(&mut self, interval: i32) -> Result<(), String> {
        if !self.supports_swap_control() {
            return Err(String::from("headless surface has no swap control"));
        }
        self.gl.record(GlCall::SwapInterval(interval));
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), String> {
        self.gl.record(GlCall::SwapBuffers);
        Ok(())
    }
}

/// Hands out one [`RecordingGl`] per requested kind.
///
/// Every kind starts with [`GlProfile::for_kind`]. Profiles can be replaced to
/// simulate drivers that fall short of a kind, or removed to simulate hosts
/// that cannot create it at all.
#[derive(Debug)]
pub struct HeadlessContextProvider {
    profiles: HashMap<DeviceKind, GlProfile>,
    last: Option<Rc<RecordingGl>>,
}

impl HeadlessContextProvider {
    pub fn new() -> Self {
        let profiles = DeviceKind::ALL
            .into_iter()
            .map(|kind| (kind, GlProfile::for_kind(kind)))
            .collect();
        Self {
            profiles,
            last: None,
        }
    }

    /// Serves `kind` requests with `profile`.
    pub fn with_profile(mut self, kind: DeviceKind, profile: GlProfile) -> Self {
        self.profiles.insert(kind, profile);
        self
    }

    /// Makes `kind` requests fail at context creation.
    pub fn without_kind(mut self, kind: DeviceKind) -> Self {
        self.profiles.remove(&kind);
        self
    }

    /// The driver of the most recently created context.
    pub fn last_gl(&self) -> Option<Rc<RecordingGl>> {
        self.last.clone()
    }
}

impl Default for HeadlessContextProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GlContextProvider for HeadlessContextProvider {
    fn create_context(
        &mut self,
        kind: DeviceKind,
        params: &DeviceCreateParams,
    ) -> Result<NativeContext, DeviceError> {
        let profile = self
            .profiles
            .get(&kind)
            .cloned()
            .ok_or_else(|| DeviceError::ContextCreation {
                requested: kind,
                details: format!("no headless profile for {kind}"),
            })?;

        let gl = Rc::new(RecordingGl::new(profile));
        let surface = HeadlessSurface::new(Rc::clone(&gl), params.window.size);
        self.last = Some(Rc::clone(&gl));
        log::debug!(
            "HeadlessContextProvider: Created {} context ({}x{})",
            kind,
            params.window.size.width,
            params.window.size.height
        );
        Ok(NativeContext {
            gl,
            surface: Box::new(surface),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_uses_the_window_size() {
        let mut provider = HeadlessContextProvider::new();
        let mut params = DeviceCreateParams::default();
        params.window.size = Extent2D::new(320, 200);

        let native = provider.create_context(DeviceKind::Gl2_0, &params).unwrap();

        assert_eq!(native.surface.drawable_size(), (320, 200));
        assert!(provider.last_gl().is_some());
    }

    #[test]
    fn removed_kinds_fail_at_creation() {
        let mut provider = HeadlessContextProvider::new().without_kind(DeviceKind::Gles2_0);

        let err = provider
            .create_context(DeviceKind::Gles2_0, &DeviceCreateParams::default())
            .unwrap_err();

        assert!(matches!(
            err,
            DeviceError::ContextCreation { requested: DeviceKind::Gles2_0, .. }
        ));
    }

    #[test]
    fn swap_interval_requires_swap_control() {
        let mut profile = GlProfile::for_kind(DeviceKind::Gl2_0);
        profile.swap_control = false;
        let gl = Rc::new(RecordingGl::new(profile));
        let mut surface = HeadlessSurface::new(Rc::clone(&gl), Extent2D::new(8, 8));

        assert!(surface.set_swap_interval(1).is_err());
        surface.swap_buffers().unwrap();

        assert_eq!(gl.calls(), vec![GlCall::SwapBuffers]);
    }
}
