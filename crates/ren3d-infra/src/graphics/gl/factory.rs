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

//! Device construction on top of host-provided native contexts.

use super::api::{GlApi, GlSurface};
use super::device::GlDevice;
use ren3d_core::renderer::api::core::{DeviceCreateParams, DeviceKind};
use ren3d_core::renderer::error::{DeviceError, RenderError};
use ren3d_core::renderer::traits::RenderDevice;
use std::rc::Rc;
use std::time::Instant;

/// A current native context and the surface it presents to.
#[derive(Debug)]
pub struct NativeContext {
    pub gl: Rc<dyn GlApi>,
    pub surface: Box<dyn GlSurface>,
}

/// Host windowing glue able to create native contexts of a given kind.
pub trait GlContextProvider {
    /// Creates and makes current a context for `kind`.
    ///
    /// The context only has to be of the right family. Whether it meets the
    /// kind's baseline is checked by the device's capability probe.
    fn create_context(
        &mut self,
        kind: DeviceKind,
        params: &DeviceCreateParams,
    ) -> Result<NativeContext, DeviceError>;
}

/// Outcome of [`GlDeviceFactory::create_with_fallback`].
#[derive(Debug)]
pub struct DeviceSelection {
    /// The device that was created.
    pub device: GlDevice,
    /// The kind it was created as.
    pub kind: DeviceKind,
    /// Every kind tried, in order, the selected one last.
    pub attempted: Vec<DeviceKind>,
    /// Time spent selecting, in milliseconds.
    pub selection_time_ms: u64,
}

/// Creates devices through a [`GlContextProvider`].
#[derive(Debug)]
pub struct GlDeviceFactory<P> {
    provider: P,
}

impl<P: GlContextProvider> GlDeviceFactory<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Creates a device of exactly `params.kind`.
    pub fn create(&mut self, params: &DeviceCreateParams) -> Result<GlDevice, RenderError> {
        let native = self.provider.create_context(params.kind, params)?;
        GlDevice::new(native.gl, native.surface, params)
    }

    /// Tries every kind of `kinds` in order and returns the first device that
    /// comes up. `params.kind` is ignored.
    ///
    /// ## Errors
    /// * `DeviceError::NoSuitableDevice` - If every kind failed. It lists the kinds tried.
    pub fn create_with_fallback(
        &mut self,
        params: &DeviceCreateParams,
        kinds: &[DeviceKind],
    ) -> Result<DeviceSelection, RenderError> {
        let start_time = Instant::now();
        let mut attempted = Vec::new();

        log::info!("Starting OpenGL device selection process...");

        for &kind in kinds {
            attempted.push(kind);
            log::info!("Attempting to create a {kind} device...");

            let params = DeviceCreateParams {
                kind,
                ..params.clone()
            };
            match self.create(&params) {
                Ok(device) => {
                    let selection_time_ms = start_time.elapsed().as_millis() as u64;
                    log::info!(
                        "Successfully selected {} device on \"{}\" after {} attempt(s)",
                        kind,
                        device.info().renderer,
                        attempted.len()
                    );
                    return Ok(DeviceSelection {
                        device,
                        kind,
                        attempted,
                        selection_time_ms,
                    });
                }
                Err(err) => {
                    log::warn!("Failed to create a {kind} device: {err}");
                }
            }
        }

        log::error!("All device attempts failed. Attempted: {attempted:?}");
        Err(DeviceError::NoSuitableDevice { attempted }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::headless::HeadlessContextProvider;
    use crate::graphics::gl::recording::GlProfile;

    #[test]
    fn create_uses_the_requested_kind() {
        // --- 1. ARRANGE ---
        let mut factory = GlDeviceFactory::new(HeadlessContextProvider::new());
        let params = DeviceCreateParams {
            kind: DeviceKind::Gles2_0,
            ..DeviceCreateParams::default()
        };

        // --- 2. ACT ---
        let device = factory.create(&params).unwrap();

        // --- 3. ASSERT ---
        assert_eq!(device.info().kind, DeviceKind::Gles2_0);
        assert!(device.capabilities().is_es());
    }

    #[test]
    fn fallback_skips_kinds_the_driver_cannot_meet() {
        // A "3.2 core" request answered by a 3.1 driver fails the probe.
        let provider = HeadlessContextProvider::new()
            .with_profile(DeviceKind::Gl3_2Core, GlProfile::new(3, 1, false));
        let mut factory = GlDeviceFactory::new(provider);

        let selection = factory
            .create_with_fallback(&DeviceCreateParams::default(), &DeviceKind::ALL)
            .unwrap();

        assert_eq!(selection.kind, DeviceKind::Gl2_0);
        assert_eq!(selection.attempted, vec![DeviceKind::Gl3_2Core, DeviceKind::Gl2_0]);
    }

    #[test]
    fn exhausted_fallback_lists_every_attempt() {
        let provider = HeadlessContextProvider::new()
            .without_kind(DeviceKind::Gl3_2Core)
            .without_kind(DeviceKind::Gles2_0);
        let mut factory = GlDeviceFactory::new(provider);
        let kinds = [DeviceKind::Gl3_2Core, DeviceKind::Gles2_0];

        let err = factory
            .create_with_fallback(&DeviceCreateParams::default(), &kinds)
            .unwrap_err();

        assert_eq!(
            err,
            RenderError::Device(DeviceError::NoSuitableDevice {
                attempted: kinds.to_vec()
            })
        );
    }
}
